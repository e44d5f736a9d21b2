//! # Playback Configuration
//!
//! Timer cadences, rate limits and engine-selection inputs for the
//! playback controller.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// How often the position timer republishes the clock while playing.
    ///
    /// Default: 50 ms.
    #[serde(default = "default_position_interval")]
    pub position_interval: Duration,

    /// How often elapsed time is written to the history service.
    ///
    /// Default: 5 seconds.
    #[serde(default = "default_persistence_interval")]
    pub persistence_interval: Duration,

    /// Slowest playback multiplier accepted by `set_rate`.
    ///
    /// Default: 0.25.
    #[serde(default = "default_min_rate")]
    pub min_rate: f32,

    /// Fastest playback multiplier accepted by `set_rate`.
    ///
    /// Default: 4.0.
    #[serde(default = "default_max_rate")]
    pub max_rate: f32,

    /// Jump applied by `skip_ahead` / `skip_back`.
    ///
    /// Default: 10 seconds.
    #[serde(default = "default_skip_step")]
    pub skip_step: Duration,

    /// File extensions the background engine can play (lowercase, no dot).
    #[serde(default = "default_background_formats")]
    pub background_formats: Vec<String>,

    /// Per-subscriber buffer of the property-change bus.
    ///
    /// Default: 100 events.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            position_interval: default_position_interval(),
            persistence_interval: default_persistence_interval(),
            min_rate: default_min_rate(),
            max_rate: default_max_rate(),
            skip_step: default_skip_step(),
            background_formats: default_background_formats(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl PlaybackConfig {
    /// Whether `extension` (case-insensitive, without the dot) can be handed
    /// to the background engine.
    pub fn supports_background_format(&self, extension: &str) -> bool {
        self.background_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(extension))
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.position_interval.is_zero() {
            return Err("position_interval must be > 0".to_string());
        }

        if self.persistence_interval.is_zero() {
            return Err("persistence_interval must be > 0".to_string());
        }

        if self.min_rate.is_nan() || self.min_rate <= 0.0 {
            return Err("min_rate must be > 0".to_string());
        }

        // 1.0 has to be reachable because near-normal rates snap to it.
        if self.min_rate > 1.0 || self.max_rate < 1.0 {
            return Err("rate range must contain 1.0".to_string());
        }

        if self.event_buffer == 0 {
            return Err("event_buffer must be > 0".to_string());
        }

        Ok(())
    }
}

fn default_position_interval() -> Duration {
    Duration::from_millis(50)
}

fn default_persistence_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_min_rate() -> f32 {
    0.25
}

fn default_max_rate() -> f32 {
    4.0
}

fn default_skip_step() -> Duration {
    Duration::from_secs(10)
}

fn default_background_formats() -> Vec<String> {
    ["mp3", "m4a", "aac", "wma", "wav"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_event_buffer() -> usize {
    core_runtime::events::DEFAULT_EVENT_BUFFER_SIZE
}
