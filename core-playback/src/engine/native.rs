use super::{Capability, EngineAdapter, EngineEvent, EngineSink};
use crate::error::{PlaybackError, Result};
use crate::types::{EngineKind, MediaDescriptor, MediaState, TrackDescriptor, TrackType, Volume};
use bridge_traits::{NativeBackend, NativeEvent, NativeTrackType};
use core_async::time::duration_from_millis;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const CAPABILITIES: &[Capability] = &[
    Capability::Play,
    Capability::Pause,
    Capability::Stop,
    Capability::GetPosition,
    Capability::SetPosition,
    Capability::GetTime,
    Capability::SetTime,
    Capability::GetVolume,
    Capability::SetVolume,
    Capability::SetRate,
    Capability::SelectTrack,
    Capability::OpenSubtitle,
];

/// Adapter over the full-featured native engine.
pub struct NativeAdapter {
    backend: Box<dyn NativeBackend>,
    subscribed: bool,
    released: bool,
}

impl NativeAdapter {
    pub fn new(backend: Box<dyn NativeBackend>) -> Self {
        Self {
            backend,
            subscribed: false,
            released: false,
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.released {
            return Err(PlaybackError::NotInitialized(
                "native engine already released".to_string(),
            ));
        }
        Ok(())
    }
}

/// Native events worth forwarding. Video and unknown elementary streams
/// are not surfaced as selectable tracks.
fn translate(event: NativeEvent) -> Option<EngineEvent> {
    let event = match event {
        NativeEvent::Opening => EngineEvent::StatusChanged(MediaState::Opening),
        NativeEvent::Buffering(_) => EngineEvent::StatusChanged(MediaState::Buffering),
        NativeEvent::Playing => EngineEvent::StatusChanged(MediaState::Playing),
        NativeEvent::Paused => EngineEvent::StatusChanged(MediaState::Paused),
        NativeEvent::Stopped => EngineEvent::StatusChanged(MediaState::Stopped),
        NativeEvent::EndReached => EngineEvent::EndReached,
        NativeEvent::EncounteredError => {
            EngineEvent::MediaFailed("native engine reported an error".to_string())
        }
        NativeEvent::TimeChanged(ms) => EngineEvent::TimeChanged(duration_from_millis(ms)),
        NativeEvent::LengthChanged(ms) => EngineEvent::LengthChanged(duration_from_millis(ms)),
        NativeEvent::TrackAdded { kind, id } => EngineEvent::TrackAdded {
            track_type: track_type(kind)?,
            id,
        },
        NativeEvent::TrackDeleted { kind, id } => EngineEvent::TrackDeleted {
            track_type: track_type(kind)?,
            id,
        },
    };
    Some(event)
}

fn track_type(kind: NativeTrackType) -> Option<TrackType> {
    match kind {
        NativeTrackType::Audio => Some(TrackType::Audio),
        NativeTrackType::Subtitle => Some(TrackType::Subtitle),
        NativeTrackType::Video | NativeTrackType::Unknown => None,
    }
}

impl EngineAdapter for NativeAdapter {
    fn kind(&self) -> EngineKind {
        EngineKind::Native
    }

    fn capabilities(&self) -> &'static [Capability] {
        CAPABILITIES
    }

    fn subscribe(&mut self, sink: EngineSink) {
        self.unsubscribe();
        self.backend.attach(Arc::new(move |event| {
            if let Some(event) = translate(event) {
                sink(event);
            }
        }));
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        if std::mem::take(&mut self.subscribed) {
            self.backend.detach();
        }
    }

    fn load(&mut self, media: &MediaDescriptor) -> Result<()> {
        self.ensure_live()?;
        self.backend
            .open(&media.location)
            .map_err(|e| PlaybackError::EngineFailure(format!("native open failed: {e}")))
    }

    fn play(&mut self) -> Result<()> {
        self.ensure_live()?;
        Ok(self.backend.play()?)
    }

    fn pause(&mut self) -> Result<()> {
        self.ensure_live()?;
        Ok(self.backend.pause()?)
    }

    fn stop(&mut self) -> Result<()> {
        self.ensure_live()?;
        Ok(self.backend.stop()?)
    }

    fn time(&self) -> Result<Option<Duration>> {
        self.ensure_live()?;
        let ms = self.backend.time();
        Ok((ms >= 0).then(|| duration_from_millis(ms)))
    }

    fn set_time(&mut self, time: Duration) -> Result<()> {
        self.ensure_live()?;
        let ms = i64::try_from(time.as_millis()).unwrap_or(i64::MAX);
        self.backend.set_time(ms);
        Ok(())
    }

    fn position(&self) -> Result<Option<f32>> {
        self.ensure_live()?;
        let position = self.backend.position();
        Ok((position >= 0.0).then_some(position))
    }

    fn set_position(&mut self, position: f32) -> Result<()> {
        self.ensure_live()?;
        self.backend.set_position(position.clamp(0.0, 1.0));
        Ok(())
    }

    fn length(&self) -> Result<Option<Duration>> {
        self.ensure_live()?;
        let ms = self.backend.length();
        Ok((ms > 0).then(|| duration_from_millis(ms)))
    }

    fn volume(&self) -> Result<Option<Volume>> {
        self.ensure_live()?;
        Ok(Volume::new(self.backend.volume()))
    }

    fn set_volume(&mut self, volume: Volume) -> Result<()> {
        self.ensure_live()?;
        self.backend.set_volume(i32::from(volume.percent()));
        Ok(())
    }

    fn set_rate(&mut self, rate: f32) -> Result<()> {
        self.ensure_live()?;
        self.backend.set_rate(rate);
        Ok(())
    }

    fn tracks(&self, track_type: TrackType) -> Vec<TrackDescriptor> {
        if self.released {
            return Vec::new();
        }
        let raw = match track_type {
            TrackType::Audio => self.backend.audio_tracks(),
            TrackType::Subtitle => self.backend.subtitles(),
        };
        raw.into_iter()
            .map(|t| TrackDescriptor::new(t.id, t.name, track_type))
            .collect()
    }

    fn select_track(&mut self, track_type: TrackType, id: i32) -> Result<()> {
        self.ensure_live()?;
        match track_type {
            TrackType::Audio => self.backend.set_audio_track(id),
            TrackType::Subtitle => self.backend.set_subtitle(id),
        }
        Ok(())
    }

    fn open_subtitle(&mut self, uri: &str) -> Result<()> {
        self.ensure_live()?;
        Ok(self.backend.add_subtitle_file(uri)?)
    }

    fn teardown(&mut self) {
        self.unsubscribe();
        if !std::mem::replace(&mut self.released, true) {
            debug!("Releasing native engine");
            self.backend.release();
        }
    }
}

impl Drop for NativeAdapter {
    fn drop(&mut self) {
        self.teardown();
    }
}
