//! # Desktop Bridge Implementations
//!
//! Default host services for desktop builds (macOS, Windows, Linux).
//!
//! Desktop shells have no lock screen policy to fight with, no live tiles and
//! usually no dedicated history store, so these implementations keep state in
//! process and report through `tracing`:
//!
//! - `DesktopDisplayRequest`: reference-counted stay-awake request
//! - `DesktopPointer`: pointer visibility flag
//! - `LoggingNavigator`: records navigation requests with a back-stack depth
//! - `LoggingNotifier`: logs tile and toast updates
//! - `InMemoryHistory`: most-recent-first watched-time store
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopDisplayRequest, InMemoryHistory};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_provider(Arc::new(MyEngines::new()))
//!     .history(Arc::new(InMemoryHistory::new()))
//!     .display_request(Arc::new(DesktopDisplayRequest::new()))
//!     .build()?;
//! ```

mod history;
mod navigation;
mod notification;
mod power;

pub use history::InMemoryHistory;
pub use navigation::LoggingNavigator;
pub use notification::LoggingNotifier;
pub use power::{DesktopDisplayRequest, DesktopPointer};
