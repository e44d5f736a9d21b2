//! # Host Bridge Traits
//!
//! Contracts between the playback core and the host application.
//!
//! The core drives media engines and calls into a handful of host services,
//! but implements none of them. Each host (desktop shell, mobile app, test
//! harness) provides concrete types for the traits below and hands them to
//! `core_runtime::config::CoreConfig`.
//!
//! ## Traits
//!
//! ### Engines
//! - [`NativeBackend`](engine::NativeBackend) - Full-featured decoding engine
//! - [`PlatformBackend`](engine::PlatformBackend) - Platform media element
//! - [`BackgroundBackend`](engine::BackgroundBackend) - Background audio player
//! - [`EngineProvider`](engine::EngineProvider) - Factory for the above
//!
//! ### Collaborators
//! - [`HistoryService`](history::HistoryService) - Watched-time persistence
//! - [`NavigationService`](navigation::NavigationService) - Page navigation requests
//! - [`NotificationService`](notification::NotificationService) - Tiles and toasts
//! - [`DisplayRequest`](power::DisplayRequest) - Keep the screen awake
//! - [`PointerService`](power::PointerService) - Pointer visibility
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Threading
//!
//! Engine callbacks fire on engine-owned threads. Every trait therefore
//! requires `Send + Sync` (see [`platform::PlatformSendSync`]).
//!
//! ## Errors
//!
//! All fallible calls return [`BridgeError`](error::BridgeError). Hosts
//! should map their native failures onto it with an actionable message.

pub mod engine;
pub mod error;
pub mod history;
pub mod log;
pub mod navigation;
pub mod notification;
pub mod platform;
pub mod power;

pub use error::BridgeError;

pub use engine::{
    BackgroundBackend, BackgroundEvent, ElementEvent, ElementState, EngineKind, EngineProvider,
    EventSink, NativeBackend, NativeEvent, NativeTrackType, PlatformBackend, TrackDescription,
};
pub use history::HistoryService;
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use navigation::NavigationService;
pub use notification::NotificationService;
pub use power::{DisplayRequest, PointerService};
