//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the playback crates:
//! - Host service configuration ([`config::CoreConfig`])
//! - Logging and tracing setup ([`logging`])
//! - Typed broadcast event bus ([`events::EventBus`])

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
