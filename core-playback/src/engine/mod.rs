//! # Engine Adapters
//!
//! One adapter per backend variant. Each wraps the raw bridge contract,
//! converts units (milliseconds, fractions, percentages) into the shared
//! vocabulary and translates backend events into [`EngineEvent`]s.
//!
//! Adapters declare what they can do through [`EngineAdapter::capabilities`].
//! The controller consults that table instead of matching on
//! [`EngineKind`], so the only place an engine kind is chosen is media
//! selection.
//!
//! ```text
//!  NativeBackend     ──> NativeAdapter     ─┐
//!  PlatformBackend   ──> PlatformAdapter   ─┼─> dyn EngineAdapter ──> controller
//!  BackgroundBackend ──> BackgroundAdapter ─┘          │
//!                                                      └─ EngineSink(EngineEvent) ──> EventRouter
//! ```

mod background;
mod native;
mod platform;

pub use background::BackgroundAdapter;
pub use native::NativeAdapter;
pub use platform::PlatformAdapter;

use crate::error::{PlaybackError, Result};
use crate::types::{
    EngineKind, MediaDescriptor, MediaState, TrackDescriptor, TrackType, Volume,
};
use bridge_traits::{ElementState, EngineProvider};
use std::sync::Arc;
use std::time::Duration;

/// Operations an adapter may or may not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Play,
    Pause,
    Stop,
    GetPosition,
    SetPosition,
    GetTime,
    SetTime,
    GetVolume,
    SetVolume,
    SetRate,
    SelectTrack,
    OpenSubtitle,
}

/// Normalized engine event.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StatusChanged(MediaState),
    TimeChanged(Duration),
    LengthChanged(Duration),
    EndReached,
    MediaFailed(String),
    TrackAdded { track_type: TrackType, id: i32 },
    TrackDeleted { track_type: TrackType, id: i32 },
}

/// Callback receiving normalized events, invoked from engine threads.
pub type EngineSink = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Common operation set over every backend.
///
/// Queries return `Ok(None)` when the engine has no answer (nothing loaded,
/// length unknown, or a swallowed transient failure).
pub trait EngineAdapter: Send {
    fn kind(&self) -> EngineKind;

    fn capabilities(&self) -> &'static [Capability];

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Route events to `sink` until [`unsubscribe`](Self::unsubscribe).
    fn subscribe(&mut self, sink: EngineSink);

    /// Stop event delivery. Idempotent.
    fn unsubscribe(&mut self);

    /// Hand the media to the engine without starting it.
    fn load(&mut self, media: &MediaDescriptor) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    /// Toggle between playing and paused.
    fn pause(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn time(&self) -> Result<Option<Duration>>;

    fn set_time(&mut self, time: Duration) -> Result<()>;

    fn position(&self) -> Result<Option<f32>>;

    /// `position` is a `0.0..=1.0` fraction.
    fn set_position(&mut self, position: f32) -> Result<()>;

    fn length(&self) -> Result<Option<Duration>>;

    fn volume(&self) -> Result<Option<Volume>>;

    fn set_volume(&mut self, volume: Volume) -> Result<()>;

    /// `rate` is a multiplier, `1.0` being normal speed.
    fn set_rate(&mut self, _rate: f32) -> Result<()> {
        Err(PlaybackError::not_supported("set_rate", self.kind()))
    }

    fn tracks(&self, _track_type: TrackType) -> Vec<TrackDescriptor> {
        Vec::new()
    }

    fn select_track(&mut self, _track_type: TrackType, _id: i32) -> Result<()> {
        Err(PlaybackError::not_supported("select_track", self.kind()))
    }

    fn open_subtitle(&mut self, _uri: &str) -> Result<()> {
        Err(PlaybackError::not_supported("open_subtitle", self.kind()))
    }

    /// Unsubscribe and release the backend. The adapter is unusable
    /// afterwards. Idempotent.
    fn teardown(&mut self);
}

/// Create the adapter for `kind` from the host's engine provider.
///
/// Provider failures become [`PlaybackError::EngineFailure`].
pub fn create_adapter(
    provider: &dyn EngineProvider,
    kind: EngineKind,
) -> Result<Box<dyn EngineAdapter>> {
    let failure = |e: bridge_traits::BridgeError| {
        PlaybackError::EngineFailure(format!("cannot create {kind} engine: {e}"))
    };
    let adapter: Box<dyn EngineAdapter> = match kind {
        EngineKind::Native => Box::new(NativeAdapter::new(
            provider.create_native().map_err(failure)?,
        )),
        EngineKind::Platform => Box::new(PlatformAdapter::new(
            provider.create_platform().map_err(failure)?,
        )),
        EngineKind::BackgroundNative => Box::new(BackgroundAdapter::new(
            provider.create_background().map_err(failure)?,
        )),
    };
    Ok(adapter)
}

pub(crate) fn element_state(state: ElementState) -> MediaState {
    match state {
        ElementState::Closed => MediaState::NothingSpecial,
        ElementState::Opening => MediaState::Opening,
        ElementState::Buffering => MediaState::Buffering,
        ElementState::Playing => MediaState::Playing,
        ElementState::Paused => MediaState::Paused,
        ElementState::Stopped => MediaState::Stopped,
    }
}

/// Map a `0.0..=1.0` fraction onto `length`.
pub(crate) fn fraction_of(length: Duration, position: f32) -> Duration {
    length.mul_f64(f64::from(position.clamp(0.0, 1.0)))
}
