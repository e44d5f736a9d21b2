use super::{element_state, fraction_of, Capability, EngineAdapter, EngineEvent, EngineSink};
use crate::error::{PlaybackError, Result};
use crate::types::{EngineKind, MediaDescriptor, Volume};
use bridge_traits::{ElementEvent, ElementState, PlatformBackend};
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
];

/// Adapter over the platform media element.
///
/// Every operation requires the element to be bound to a surface and fails
/// with [`PlaybackError::NotInitialized`] otherwise. Track selection is not
/// offered.
pub struct PlatformAdapter {
    backend: Box<dyn PlatformBackend>,
    subscribed: bool,
    released: bool,
}

impl PlatformAdapter {
    pub fn new(backend: Box<dyn PlatformBackend>) -> Self {
        Self {
            backend,
            subscribed: false,
            released: false,
        }
    }

    fn bound(&self) -> Result<&dyn PlatformBackend> {
        if self.released || !self.backend.is_bound() {
            return Err(PlaybackError::NotInitialized(
                "platform media element is not bound".to_string(),
            ));
        }
        Ok(self.backend.as_ref())
    }
}

fn translate(event: ElementEvent) -> Option<EngineEvent> {
    match event {
        ElementEvent::StateChanged(state) => Some(EngineEvent::StatusChanged(element_state(state))),
        // Length is picked up by the next position tick.
        ElementEvent::MediaOpened => None,
        ElementEvent::MediaEnded => Some(EngineEvent::EndReached),
        ElementEvent::MediaFailed(reason) => Some(EngineEvent::MediaFailed(reason)),
    }
}

impl EngineAdapter for PlatformAdapter {
    fn kind(&self) -> EngineKind {
        EngineKind::Platform
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
        self.bound()?
            .set_source(&media.location)
            .map_err(|e| PlaybackError::EngineFailure(format!("platform open failed: {e}")))
    }

    fn play(&mut self) -> Result<()> {
        Ok(self.bound()?.play()?)
    }

    fn pause(&mut self) -> Result<()> {
        let element = self.bound()?;
        if element.current_state() == ElementState::Playing {
            Ok(element.pause()?)
        } else {
            Ok(element.play()?)
        }
    }

    fn stop(&mut self) -> Result<()> {
        Ok(self.bound()?.stop()?)
    }

    fn time(&self) -> Result<Option<Duration>> {
        Ok(Some(self.bound()?.position()))
    }

    fn set_time(&mut self, time: Duration) -> Result<()> {
        self.bound()?.set_position(time);
        Ok(())
    }

    fn position(&self) -> Result<Option<f32>> {
        let element = self.bound()?;
        let Some(length) = element.natural_duration().filter(|d| !d.is_zero()) else {
            return Ok(None);
        };
        let fraction = element.position().as_secs_f64() / length.as_secs_f64();
        Ok(Some(fraction.clamp(0.0, 1.0) as f32))
    }

    fn set_position(&mut self, position: f32) -> Result<()> {
        let element = self.bound()?;
        if let Some(length) = element.natural_duration().filter(|d| !d.is_zero()) {
            element.set_position(fraction_of(length, position));
        }
        Ok(())
    }

    fn length(&self) -> Result<Option<Duration>> {
        Ok(self.bound()?.natural_duration().filter(|d| !d.is_zero()))
    }

    fn volume(&self) -> Result<Option<Volume>> {
        Ok(Volume::from_fraction(self.bound()?.volume()))
    }

    fn set_volume(&mut self, volume: Volume) -> Result<()> {
        self.bound()?.set_volume(volume.fraction());
        Ok(())
    }

    fn set_rate(&mut self, rate: f32) -> Result<()> {
        self.bound()?.set_playback_rate(f64::from(rate));
        Ok(())
    }

    fn teardown(&mut self) {
        self.unsubscribe();
        // The element belongs to the host surface; only our hold on it ends.
        if !std::mem::replace(&mut self.released, true) {
            debug!("Detached from platform media element");
        }
    }
}

impl Drop for PlatformAdapter {
    fn drop(&mut self) {
        self.teardown();
    }
}
