//! # Playback Domain Types
//!
//! Media descriptors, controller state, the playback clock and the volume
//! and rate normalization rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub use bridge_traits::EngineKind;

// ============================================================================
// Media
// ============================================================================

/// What kind of media a descriptor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Track,
    Stream,
}

/// Caller-supplied identification of the media to play.
///
/// Immutable once handed to the controller; the controller keeps its own
/// copy and only updates the watched time on that copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub kind: MediaKind,
    /// Path, URI or access token understood by the engines.
    pub location: String,
    /// History key. Watched time is only persisted for media carrying one.
    pub token: Option<String>,
    pub title: Option<String>,
    pub duration: Option<Duration>,
    /// Resume point for videos.
    pub time_watched: Duration,
}

impl MediaDescriptor {
    pub fn new(kind: MediaKind, location: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            token: None,
            title: None,
            duration: None,
            time_watched: Duration::ZERO,
        }
    }

    pub fn video(location: impl Into<String>) -> Self {
        Self::new(MediaKind::Video, location)
    }

    pub fn track(location: impl Into<String>) -> Self {
        Self::new(MediaKind::Track, location)
    }

    pub fn stream(url: impl Into<String>) -> Self {
        Self::new(MediaKind::Stream, url)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_time_watched(mut self, watched: Duration) -> Self {
        self.time_watched = watched;
        self
    }

    /// Lowercase file extension of the location, if any.
    pub fn format(&self) -> Option<String> {
        Path::new(&self.location)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// Title shown on the now-playing surface.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title.to_string();
        }
        match self.kind {
            MediaKind::Video => "Video".to_string(),
            MediaKind::Track | MediaKind::Stream => file_name(&self.location).to_string(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.location.trim().is_empty() {
            return Err("media location is empty".to_string());
        }
        Ok(())
    }
}

fn file_name(location: &str) -> &str {
    location
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or(location)
}

// ============================================================================
// State
// ============================================================================

/// Controller-level playback state.
///
/// `EndReached` only exists inside the end-of-media transition; it is
/// resolved to `Playing` or `Stopped` before the transition returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
    EndReached,
}

impl PlaybackState {
    /// Whether a media session is open (loaded and not finished).
    pub fn is_active(self) -> bool {
        matches!(
            self,
            PlaybackState::Loading | PlaybackState::Playing | PlaybackState::Paused
        )
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
            PlaybackState::EndReached => "end-reached",
        };
        f.write_str(name)
    }
}

/// Raw engine status, republished as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MediaState {
    #[default]
    NothingSpecial,
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Ended,
    Error,
}

/// What the current session is playing, as far as the UI cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayingType {
    #[default]
    NotPlaying,
    Music,
    Video,
}

// ============================================================================
// Tracks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackType {
    Audio,
    Subtitle,
}

/// Audio or subtitle track exposed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub id: i32,
    pub name: String,
    pub track_type: TrackType,
}

impl TrackDescriptor {
    pub fn new(id: i32, name: impl Into<String>, track_type: TrackType) -> Self {
        Self {
            id,
            name: name.into(),
            track_type,
        }
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Elapsed/total time of the current media plus the rate multiplier.
///
/// A zero `total` means the length is not known yet; `elapsed` is clamped to
/// `total` once it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackClock {
    elapsed: Duration,
    total: Duration,
    rate: f32,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            elapsed: Duration::ZERO,
            total: Duration::ZERO,
            rate: 1.0,
        }
    }
}

impl PlaybackClock {
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn is_total_known(&self) -> bool {
        !self.total.is_zero()
    }

    /// Fraction of the media played, `0.0` while the length is unknown.
    pub fn position(&self) -> f32 {
        if self.total.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = self.clamp(elapsed);
    }

    pub fn set_total(&mut self, total: Duration) {
        self.total = total;
        self.elapsed = self.clamp(self.elapsed);
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    /// Clamp `time` into `[0, total]`, or leave it alone while the total is
    /// unknown.
    pub fn clamp(&self, time: Duration) -> Duration {
        if self.total.is_zero() {
            time
        } else {
            time.min(self.total)
        }
    }

    /// Zero elapsed and total. The rate survives between sessions.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.total = Duration::ZERO;
    }
}

// ============================================================================
// Volume and rate
// ============================================================================

/// Output volume in percent, `1..=100`.
///
/// Zero is not a valid volume: a request for `0` is rejected rather than
/// treated as mute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Volume(u8);

impl Volume {
    pub const MAX: Volume = Volume(100);

    /// `None` for zero or negative requests; larger values saturate at 100.
    pub fn new(percent: i32) -> Option<Volume> {
        if percent <= 0 {
            return None;
        }
        Some(Volume(percent.min(100) as u8))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Volume as a `0.0..=1.0` fraction.
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Convert an engine fraction back to a volume.
    pub fn from_fraction(fraction: f64) -> Option<Volume> {
        if !fraction.is_finite() {
            return None;
        }
        Volume::new((fraction * 100.0).round() as i32)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Volume::MAX
    }
}

/// Normalize a requested rate in percent.
///
/// Anything strictly between 95 and 105 snaps to exactly 100; the result is
/// then clamped to `[min_rate, max_rate]` (multipliers).
pub fn normalize_rate_percent(percent: i32, min_rate: f32, max_rate: f32) -> i32 {
    let snapped = if percent > 95 && percent < 105 {
        100
    } else {
        percent
    };
    let min = (min_rate * 100.0).round() as i32;
    let max = (max_rate * 100.0).round() as i32;
    snapped.clamp(min, max.max(min))
}
