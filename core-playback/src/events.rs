//! Property-change notices published by the controller.

use crate::types::{
    EngineKind, MediaState, PlaybackClock, PlaybackState, PlayingType, TrackDescriptor,
};
use core_runtime::events::{BusEvent, EventSeverity};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    StateChanged(PlaybackState),
    MediaStateChanged(MediaState),
    ClockChanged(PlaybackClock),
    LengthChanged(Duration),
    VolumeChanged(u8),
    /// Rate in percent.
    RateChanged(i32),
    EngineChanged(Option<EngineKind>),
    PlayingTypeChanged { playing_type: PlayingType, is_stream: bool },
    AudioTracksChanged(Vec<TrackDescriptor>),
    SubtitlesChanged(Vec<TrackDescriptor>),
    CurrentAudioTrackChanged(Option<TrackDescriptor>),
    CurrentSubtitleChanged(Option<TrackDescriptor>),
    /// Reported once per `set_media` attempt.
    MediaFailed(String),
    /// A music playlist ran out of tracks.
    PlaylistFinished,
}

impl BusEvent for PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::StateChanged(_) => "playback state changed",
            PlaybackEvent::MediaStateChanged(_) => "media state changed",
            PlaybackEvent::ClockChanged(_) => "clock changed",
            PlaybackEvent::LengthChanged(_) => "length changed",
            PlaybackEvent::VolumeChanged(_) => "volume changed",
            PlaybackEvent::RateChanged(_) => "rate changed",
            PlaybackEvent::EngineChanged(_) => "engine changed",
            PlaybackEvent::PlayingTypeChanged { .. } => "playing type changed",
            PlaybackEvent::AudioTracksChanged(_) => "audio tracks changed",
            PlaybackEvent::SubtitlesChanged(_) => "subtitles changed",
            PlaybackEvent::CurrentAudioTrackChanged(_) => "current audio track changed",
            PlaybackEvent::CurrentSubtitleChanged(_) => "current subtitle changed",
            PlaybackEvent::MediaFailed(_) => "media failed",
            PlaybackEvent::PlaylistFinished => "playlist finished",
        }
    }

    fn severity(&self) -> EventSeverity {
        match self {
            PlaybackEvent::MediaFailed(_) => EventSeverity::Error,
            PlaybackEvent::ClockChanged(_) => EventSeverity::Debug,
            _ => EventSeverity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities() {
        assert_eq!(
            PlaybackEvent::MediaFailed("boom".into()).severity(),
            EventSeverity::Error
        );
        assert_eq!(
            PlaybackEvent::ClockChanged(PlaybackClock::default()).severity(),
            EventSeverity::Debug
        );
        assert_eq!(PlaybackEvent::PlaylistFinished.description(), "playlist finished");
    }
}
