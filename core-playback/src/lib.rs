//! # Playback Controller
//!
//! One playback surface over the host's three engines: a full native engine,
//! the platform's built-in element, and a background-capable native engine
//! for audio.
//!
//! ## Overview
//!
//! This crate handles:
//! - Engine selection per media item and engine lifecycle
//! - A uniform adapter over each engine's callbacks and queries
//! - Observable playback state (clock, volume, rate, tracks) as events
//! - Serialized mutation of all state on one dispatch queue
//! - Playlist advancement, watched-time persistence and the stay-awake lock
//!
//! ## Architecture
//!
//! ```text
//!  caller ──async──> PlaybackController ──call──> DispatchQueue ──> ControllerCore
//!                                                      ^                │
//!  engine threads ── EngineEvent ── sink ──────────────┘                ├── EngineAdapter
//!  timers ── tick ─────────────────────────────────────┘                ├── EventBus<PlaybackEvent>
//!                                                                       └── HistoryWriter ──> HistoryService
//! ```

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
mod event_router;
pub mod events;
mod history_writer;
pub mod resource_guard;
mod state;
mod timers;
pub mod track_collection;
pub mod types;

pub use config::PlaybackConfig;
pub use controller::PlaybackController;
pub use engine::{
    create_adapter, BackgroundAdapter, Capability, EngineAdapter, EngineEvent, EngineSink,
    NativeAdapter, PlatformAdapter,
};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use resource_guard::ResourceGuard;
pub use state::{ControllerCore, PlaybackSnapshot};
pub use track_collection::{CollectionSnapshot, TrackCollection};
pub use types::{
    normalize_rate_percent, EngineKind, MediaDescriptor, MediaKind, MediaState, PlaybackClock,
    PlaybackState, PlayingType, TrackDescriptor, TrackType, Volume,
};
