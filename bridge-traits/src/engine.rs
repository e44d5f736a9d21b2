//! Raw media engine contracts.
//!
//! The host ships up to three playback engines with very different APIs:
//!
//! - a full-featured **native** engine (decoding pipeline with track
//!   enumeration, millisecond clock, normalized position),
//! - a **platform** media element that must be bound to a UI surface before
//!   use and reports time as [`Duration`]s,
//! - a **background** audio player that runs in a constrained execution
//!   context and whose state queries may fail transiently.
//!
//! The traits below describe those engines as they are, without
//! normalization. `core-playback` wraps each one in an adapter that exposes
//! a single operation set.
//!
//! Event delivery is push-based: the core hands an [`EventSink`] to
//! `attach`, and the engine invokes it from whatever thread it likes.
//! `detach` must guarantee that the sink is not invoked again once it
//! returns.

use crate::{error::Result, platform::PlatformSendSync};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Callback used by engines to push events into the core.
pub type EventSink<E> = Arc<dyn Fn(E) + Send + Sync>;

/// Which backend drives a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineKind {
    Native,
    Platform,
    BackgroundNative,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::Native => "native",
            EngineKind::Platform => "platform",
            EngineKind::BackgroundNative => "background",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Native engine
// ============================================================================

/// Elementary stream category reported by the native engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeTrackType {
    Audio,
    Video,
    Subtitle,
    Unknown,
}

/// Track entry as enumerated by the native engine.
///
/// Id `-1` conventionally denotes the "disabled" entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescription {
    pub id: i32,
    pub name: String,
}

impl TrackDescription {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Events raised by the native engine.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    Opening,
    Buffering(f32),
    Playing,
    Paused,
    Stopped,
    EndReached,
    EncounteredError,
    /// Current time in milliseconds.
    TimeChanged(i64),
    /// Media length in milliseconds.
    LengthChanged(i64),
    TrackAdded { kind: NativeTrackType, id: i32 },
    TrackDeleted { kind: NativeTrackType, id: i32 },
}

/// Full-featured native engine.
///
/// Times are milliseconds, position is a `0.0..=1.0` fraction and volume is
/// a percentage. Setters take effect asynchronously inside the engine.
pub trait NativeBackend: PlatformSendSync {
    /// Load a media location (path, URI or access token).
    fn open(&self, location: &str) -> Result<()>;
    fn play(&self) -> Result<()>;
    /// Toggle between playing and paused.
    fn pause(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;

    fn time(&self) -> i64;
    fn set_time(&self, ms: i64);
    fn position(&self) -> f32;
    fn set_position(&self, position: f32);
    fn length(&self) -> i64;

    fn volume(&self) -> i32;
    fn set_volume(&self, volume: i32);
    /// Playback speed multiplier.
    fn set_rate(&self, rate: f32);

    fn audio_tracks(&self) -> Vec<TrackDescription>;
    fn subtitles(&self) -> Vec<TrackDescription>;
    fn set_audio_track(&self, id: i32);
    fn set_subtitle(&self, id: i32);
    fn add_subtitle_file(&self, uri: &str) -> Result<()>;

    fn attach(&self, sink: EventSink<NativeEvent>);
    fn detach(&self);
    /// Release the decoding pipeline. The instance is unusable afterwards.
    fn release(&self);
}

// ============================================================================
// Platform media element and background player
// ============================================================================

/// State reported by the platform element and the background player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    Closed,
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
}

/// Events raised by the platform media element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    StateChanged(ElementState),
    MediaOpened,
    MediaEnded,
    MediaFailed(String),
}

/// Platform-provided media element.
///
/// Must be bound to a UI surface (`is_bound`) before any operation is valid.
pub trait PlatformBackend: PlatformSendSync {
    fn is_bound(&self) -> bool;
    fn set_source(&self, location: &str) -> Result<()>;
    fn play(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;

    fn current_state(&self) -> ElementState;
    fn position(&self) -> Duration;
    fn set_position(&self, position: Duration);
    /// `None` until the media has been opened.
    fn natural_duration(&self) -> Option<Duration>;

    /// Volume in `0.0..=1.0`.
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn set_playback_rate(&self, rate: f64);

    fn attach(&self, sink: EventSink<ElementEvent>);
    fn detach(&self);
}

/// Events raised by the background audio player.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundEvent {
    StateChanged(ElementState),
    TrackEnded,
    Failed(String),
}

/// Audio player hosted in a constrained background context.
///
/// Every query crosses a process boundary and may fail while the host
/// suspends or resumes the background task.
pub trait BackgroundBackend: PlatformSendSync {
    fn play_track(&self, location: &str) -> Result<()>;
    fn play(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;

    fn current_state(&self) -> Result<ElementState>;
    fn position(&self) -> Result<Duration>;
    fn set_position(&self, position: Duration) -> Result<()>;
    fn natural_duration(&self) -> Result<Duration>;

    /// Volume in `0.0..=1.0`.
    fn volume(&self) -> Result<f64>;
    fn set_volume(&self, volume: f64) -> Result<()>;

    fn attach(&self, sink: EventSink<BackgroundEvent>);
    fn detach(&self);
}

// ============================================================================
// Provider
// ============================================================================

/// Factory for engine instances, implemented by the host.
///
/// Each `create_*` call returns a fresh instance; the core guarantees at most
/// one instance is live at a time. A failure here is an engine construction
/// failure.
pub trait EngineProvider: PlatformSendSync {
    /// Whether the host ships the given engine at all.
    fn is_available(&self, kind: EngineKind) -> bool;

    fn create_native(&self) -> Result<Box<dyn NativeBackend>>;

    fn create_platform(&self) -> Result<Box<dyn PlatformBackend>> {
        Err(crate::BridgeError::NotAvailable(
            "platform media element".to_string(),
        ))
    }

    fn create_background(&self) -> Result<Box<dyn BackgroundBackend>> {
        Err(crate::BridgeError::NotAvailable(
            "background audio player".to_string(),
        ))
    }
}
