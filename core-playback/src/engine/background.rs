use super::{element_state, fraction_of, Capability, EngineAdapter, EngineEvent, EngineSink};
use crate::error::{PlaybackError, Result};
use crate::types::{EngineKind, MediaDescriptor, Volume};
use bridge_traits::{BackgroundBackend, BackgroundEvent, ElementState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

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
];

/// Adapter over the background audio player.
///
/// State queries cross into the background task and can fail while the host
/// suspends it. Such failures are logged and reported as "unknown"
/// (`Ok(None)`); they never reach the caller. Time and position are only
/// meaningful while the player reports `Playing`.
pub struct BackgroundAdapter {
    backend: Box<dyn BackgroundBackend>,
    subscribed: bool,
    released: bool,
}

impl BackgroundAdapter {
    pub fn new(backend: Box<dyn BackgroundBackend>) -> Self {
        Self {
            backend,
            subscribed: false,
            released: false,
        }
    }

    fn live(&self) -> Result<&dyn BackgroundBackend> {
        if self.released {
            return Err(PlaybackError::NotInitialized(
                "background player already released".to_string(),
            ));
        }
        Ok(self.backend.as_ref())
    }

    /// `None` when the state itself could not be read.
    fn is_playing(&self) -> Option<bool> {
        self.query("state", |b| b.current_state())
            .map(|state| state == ElementState::Playing)
    }

    /// Run a query, turning a failure into "unknown".
    fn query<T>(
        &self,
        what: &'static str,
        f: impl FnOnce(&dyn BackgroundBackend) -> bridge_traits::error::Result<T>,
    ) -> Option<T> {
        match f(self.backend.as_ref()) {
            Ok(value) => Some(value),
            Err(e) => {
                let err = PlaybackError::TransientQueryFailure(format!("{what}: {e}"));
                warn!(error = %err, "Background player query failed");
                None
            }
        }
    }

    fn length_if_known(&self) -> Option<Duration> {
        self.query("duration", |b| b.natural_duration())
            .filter(|d| !d.is_zero())
    }
}

fn translate(event: BackgroundEvent) -> EngineEvent {
    match event {
        BackgroundEvent::StateChanged(state) => EngineEvent::StatusChanged(element_state(state)),
        BackgroundEvent::TrackEnded => EngineEvent::EndReached,
        BackgroundEvent::Failed(reason) => EngineEvent::MediaFailed(reason),
    }
}

impl EngineAdapter for BackgroundAdapter {
    fn kind(&self) -> EngineKind {
        EngineKind::BackgroundNative
    }

    fn capabilities(&self) -> &'static [Capability] {
        CAPABILITIES
    }

    fn subscribe(&mut self, sink: EngineSink) {
        self.unsubscribe();
        self.backend
            .attach(Arc::new(move |event| sink(translate(event))));
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        if std::mem::take(&mut self.subscribed) {
            self.backend.detach();
        }
    }

    fn load(&mut self, media: &MediaDescriptor) -> Result<()> {
        self.live()?
            .play_track(&media.location)
            .map_err(|e| PlaybackError::EngineFailure(format!("background open failed: {e}")))
    }

    fn play(&mut self) -> Result<()> {
        Ok(self.live()?.play()?)
    }

    fn pause(&mut self) -> Result<()> {
        let playing = self.is_playing().unwrap_or(false);
        let player = self.live()?;
        if playing {
            Ok(player.pause()?)
        } else {
            Ok(player.play()?)
        }
    }

    fn stop(&mut self) -> Result<()> {
        Ok(self.live()?.stop()?)
    }

    fn time(&self) -> Result<Option<Duration>> {
        self.live()?;
        match self.is_playing() {
            None => Ok(None),
            Some(false) => Ok(Some(Duration::ZERO)),
            Some(true) => Ok(self.query("position", |b| b.position())),
        }
    }

    fn set_time(&mut self, time: Duration) -> Result<()> {
        self.live()?;
        self.query("seek", |b| b.set_position(time));
        Ok(())
    }

    fn position(&self) -> Result<Option<f32>> {
        self.live()?;
        match self.is_playing() {
            None => return Ok(None),
            Some(false) => return Ok(Some(0.0)),
            Some(true) => {}
        }
        let Some(length) = self.length_if_known() else {
            return Ok(None);
        };
        Ok(self.query("position", |b| b.position()).map(|pos| {
            (pos.as_secs_f64() / length.as_secs_f64()).clamp(0.0, 1.0) as f32
        }))
    }

    fn set_position(&mut self, position: f32) -> Result<()> {
        self.live()?;
        if let Some(length) = self.length_if_known() {
            let target = fraction_of(length, position);
            self.query("seek", |b| b.set_position(target));
        }
        Ok(())
    }

    fn length(&self) -> Result<Option<Duration>> {
        self.live()?;
        Ok(self.length_if_known())
    }

    fn volume(&self) -> Result<Option<Volume>> {
        self.live()?;
        Ok(self
            .query("volume", |b| b.volume())
            .and_then(Volume::from_fraction))
    }

    fn set_volume(&mut self, volume: Volume) -> Result<()> {
        self.live()?;
        self.query("volume", |b| b.set_volume(volume.fraction()));
        Ok(())
    }

    fn teardown(&mut self) {
        self.unsubscribe();
        if !std::mem::replace(&mut self.released, true) {
            debug!("Leaving background audio player");
        }
    }
}

impl Drop for BackgroundAdapter {
    fn drop(&mut self) {
        self.teardown();
    }
}
