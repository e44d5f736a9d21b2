//! # Controller State
//!
//! [`ControllerCore`] is everything the playback controller owns: the active
//! adapter, the media session, observable properties, the playlist, the
//! resource guard and both timers. It lives on the dispatch queue and is only
//! ever touched through `&mut self` from a dispatched job, so none of it is
//! locked.
//!
//! Engine events (see `event_router`) and timer ticks (see `timers`) are
//! further `impl ControllerCore` blocks in their own modules.
//!
//! ## Sessions
//!
//! Every `load_media` starts a new session number. Engine sinks and the
//! position timer capture the number they were created for; work arriving
//! for an older session is dropped on the floor.

use crate::config::PlaybackConfig;
use crate::engine::{create_adapter, Capability, EngineAdapter};
use crate::error::{PlaybackError, Result};
use crate::event_router::EventRouter;
use crate::events::PlaybackEvent;
use crate::history_writer::HistoryWriter;
use crate::resource_guard::ResourceGuard;
use crate::track_collection::{CollectionSnapshot, TrackCollection};
use crate::types::{
    normalize_rate_percent, EngineKind, MediaDescriptor, MediaKind, MediaState, PlaybackClock,
    PlaybackState, PlayingType, TrackDescriptor, TrackType, Volume,
};
use bridge_traits::{EngineProvider, NavigationService, NotificationService};
use core_async::dispatch::WeakDispatcher;
use core_async::sync::oneshot;
use core_async::runtime::Handle;
use core_async::task::WorkerHandle;
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use core_runtime::logging::strip_path;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub(crate) const BACKGROUND_AUDIO_REFUSED: &str = "Can't enable background audio";
pub(crate) const PLAYBACK_FAILED: &str = "Can't play this media";

/// Host collaborators used by the controller.
pub(crate) struct Services {
    pub(crate) engines: Arc<dyn EngineProvider>,
    pub(crate) navigation: Arc<dyn NavigationService>,
    pub(crate) notifications: Arc<dyn NotificationService>,
    pub(crate) background_audio: bool,
}

/// Audio or subtitle tracks of the current media plus the selected one.
///
/// The selection is kept by id so removals never leave it dangling.
#[derive(Debug, Clone, Default)]
pub(crate) struct TrackList {
    items: Vec<TrackDescriptor>,
    current: Option<i32>,
}

impl TrackList {
    pub(crate) fn items(&self) -> &[TrackDescriptor] {
        &self.items
    }

    pub(crate) fn current(&self) -> Option<&TrackDescriptor> {
        let id = self.current?;
        self.items.iter().find(|t| t.id == id)
    }

    pub(crate) fn has_selection(&self) -> bool {
        self.current().is_some()
    }

    pub(crate) fn replace(&mut self, items: Vec<TrackDescriptor>) {
        self.items = items;
    }

    pub(crate) fn remove(&mut self, id: i32) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        if self.items.is_empty() {
            self.current = None;
        }
        self.items.len() != before
    }

    pub(crate) fn select(&mut self, id: Option<i32>) {
        self.current = id;
    }

    pub(crate) fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty() || self.current.is_some();
        self.items.clear();
        self.current = None;
        changed
    }
}

/// Consistent read of every observable controller property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub media_state: MediaState,
    pub engine: Option<EngineKind>,
    pub playing_type: PlayingType,
    pub is_stream: bool,
    pub clock: PlaybackClock,
    pub volume: u8,
    /// Rate in percent.
    pub rate: i32,
    pub media: Option<MediaDescriptor>,
    pub audio_tracks: Vec<TrackDescriptor>,
    pub subtitles: Vec<TrackDescriptor>,
    pub current_audio_track: Option<TrackDescriptor>,
    pub current_subtitle: Option<TrackDescriptor>,
    pub collection: CollectionSnapshot,
}

/// Queue-owned controller state. Opaque outside this crate; reach it through
/// [`PlaybackController`](crate::PlaybackController).
pub struct ControllerCore {
    pub(crate) config: PlaybackConfig,
    pub(crate) services: Services,
    pub(crate) runtime: Handle,
    pub(crate) dispatcher: Option<WeakDispatcher<ControllerCore>>,
    pub(crate) events: EventBus<PlaybackEvent>,

    pub(crate) adapter: Option<Box<dyn EngineAdapter>>,
    pub(crate) session: u64,
    pub(crate) media: Option<MediaDescriptor>,
    pub(crate) history_token: Option<String>,
    pub(crate) history_writer: HistoryWriter,

    pub(crate) state: PlaybackState,
    pub(crate) media_state: MediaState,
    pub(crate) playing_type: PlayingType,
    pub(crate) is_stream: bool,
    pub(crate) clock: PlaybackClock,
    pub(crate) volume: Volume,
    pub(crate) rate_percent: i32,

    pub(crate) tracks: TrackCollection,
    pub(crate) audio_tracks: TrackList,
    pub(crate) subtitles: TrackList,

    pub(crate) guard: ResourceGuard,
    pub(crate) position_timer: Option<WorkerHandle>,
    pub(crate) persistence_timer: Option<WorkerHandle>,

    pub(crate) failure_reported: bool,
    pub(crate) disposed: bool,
}

impl ControllerCore {
    pub(crate) fn new(
        core: &CoreConfig,
        config: PlaybackConfig,
        events: EventBus<PlaybackEvent>,
        runtime: Handle,
    ) -> Self {
        let pointer = if core.features.hide_pointer_during_playback {
            core.pointer.clone()
        } else {
            None
        };
        let history_writer = HistoryWriter::spawn(&runtime, Arc::clone(&core.history));
        Self {
            services: Services {
                engines: Arc::clone(&core.engine_provider),
                navigation: Arc::clone(&core.navigation),
                notifications: Arc::clone(&core.notifications),
                background_audio: core.features.background_audio,
            },
            guard: ResourceGuard::new(Arc::clone(&core.display_request), pointer),
            config,
            runtime,
            dispatcher: None,
            events,
            adapter: None,
            session: 0,
            media: None,
            history_token: None,
            history_writer,
            state: PlaybackState::Idle,
            media_state: MediaState::NothingSpecial,
            playing_type: PlayingType::NotPlaying,
            is_stream: false,
            clock: PlaybackClock::default(),
            volume: Volume::default(),
            rate_percent: 100,
            tracks: TrackCollection::new(),
            audio_tracks: TrackList::default(),
            subtitles: TrackList::default(),
            position_timer: None,
            persistence_timer: None,
            failure_reported: false,
            disposed: false,
        }
    }

    /// Second construction phase, run as the first job on the queue once the
    /// executor exists.
    pub(crate) fn bind(&mut self, dispatcher: WeakDispatcher<ControllerCore>) {
        self.dispatcher = Some(dispatcher);
        self.start_persistence_timer();
    }

    // ========================================================================
    // Publication
    // ========================================================================

    pub(crate) fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine.
        let _ = self.events.emit(event);
    }

    pub(crate) fn emit_clock(&self) {
        self.emit(PlaybackEvent::ClockChanged(self.clock));
    }

    pub(crate) fn set_state(&mut self, next: PlaybackState) {
        let prev = self.state;
        if prev == next {
            return;
        }
        self.state = next;
        debug!(from = %prev, to = %next, "Playback state changed");

        if next == PlaybackState::Playing {
            self.guard.acquire();
            self.start_position_timer();
        } else if prev == PlaybackState::Playing {
            self.guard.release();
            self.stop_position_timer();
        }

        if matches!(next, PlaybackState::Idle | PlaybackState::Stopped) {
            self.clear_track_lists();
        }

        // EndReached is resolved within the same job; nobody sees it.
        if next != PlaybackState::EndReached {
            self.emit(PlaybackEvent::StateChanged(next));
        }
    }

    pub(crate) fn set_media_state(&mut self, state: MediaState) {
        if self.media_state != state {
            self.media_state = state;
            self.emit(PlaybackEvent::MediaStateChanged(state));
        }
    }

    pub(crate) fn set_playing_type(&mut self, playing_type: PlayingType, is_stream: bool) {
        if self.playing_type == playing_type && self.is_stream == is_stream {
            return;
        }
        self.playing_type = playing_type;
        self.is_stream = is_stream;
        self.emit(PlaybackEvent::PlayingTypeChanged {
            playing_type,
            is_stream,
        });
    }

    fn clear_track_lists(&mut self) {
        if self.audio_tracks.clear() {
            self.emit(PlaybackEvent::AudioTracksChanged(Vec::new()));
            self.emit(PlaybackEvent::CurrentAudioTrackChanged(None));
        }
        if self.subtitles.clear() {
            self.emit(PlaybackEvent::SubtitlesChanged(Vec::new()));
            self.emit(PlaybackEvent::CurrentSubtitleChanged(None));
        }
    }

    pub(crate) fn track_list_mut(&mut self, track_type: TrackType) -> &mut TrackList {
        match track_type {
            TrackType::Audio => &mut self.audio_tracks,
            TrackType::Subtitle => &mut self.subtitles,
        }
    }

    pub(crate) fn publish_tracks(&self, track_type: TrackType) {
        match track_type {
            TrackType::Audio => {
                self.emit(PlaybackEvent::AudioTracksChanged(
                    self.audio_tracks.items().to_vec(),
                ));
                self.emit(PlaybackEvent::CurrentAudioTrackChanged(
                    self.audio_tracks.current().cloned(),
                ));
            }
            TrackType::Subtitle => {
                self.emit(PlaybackEvent::SubtitlesChanged(self.subtitles.items().to_vec()));
                self.emit(PlaybackEvent::CurrentSubtitleChanged(
                    self.subtitles.current().cloned(),
                ));
            }
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            media_state: self.media_state,
            engine: self.adapter.as_ref().map(|a| a.kind()),
            playing_type: self.playing_type,
            is_stream: self.is_stream,
            clock: self.clock,
            volume: self.volume.percent(),
            rate: self.rate_percent,
            media: self.media.clone(),
            audio_tracks: self.audio_tracks.items().to_vec(),
            subtitles: self.subtitles.items().to_vec(),
            current_audio_track: self.audio_tracks.current().cloned(),
            current_subtitle: self.subtitles.current().cloned(),
            collection: self.tracks.snapshot(),
        }
    }

    // ========================================================================
    // Guards
    // ========================================================================

    fn ensure_open(&self) -> Result<()> {
        if self.disposed {
            return Err(PlaybackError::NotInitialized(
                "playback controller disposed".to_string(),
            ));
        }
        Ok(())
    }

    fn adapter_mut(&mut self) -> Result<&mut Box<dyn EngineAdapter>> {
        self.ensure_open()?;
        self.adapter
            .as_mut()
            .ok_or_else(|| PlaybackError::NotInitialized("no media loaded".to_string()))
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// The one place an engine kind is chosen.
    fn select_engine(&self, media: &MediaDescriptor, force_full_engine: bool) -> Result<EngineKind> {
        let engines = &self.services.engines;

        if media.kind == MediaKind::Track
            && self.services.background_audio
            && engines.is_available(EngineKind::BackgroundNative)
        {
            let supported = media
                .format()
                .is_some_and(|f| self.config.supports_background_format(&f));
            if supported && !force_full_engine {
                return Ok(EngineKind::BackgroundNative);
            }
            self.services
                .notifications
                .show_toast(BACKGROUND_AUDIO_REFUSED);
        }

        if engines.is_available(EngineKind::Native) {
            Ok(EngineKind::Native)
        } else if engines.is_available(EngineKind::Platform) {
            Ok(EngineKind::Platform)
        } else {
            Err(PlaybackError::EngineFailure(
                "no full playback engine available".to_string(),
            ))
        }
    }

    /// Stop and discard the active adapter. Afterwards no engine events are
    /// live and no resources are held.
    pub(crate) fn end_session(&mut self) {
        if let Some(mut adapter) = self.adapter.take() {
            adapter.unsubscribe();
            if let Err(e) = adapter.stop() {
                debug!(error = %e, "Stopping outgoing engine failed");
            }
            adapter.teardown();
            self.emit(PlaybackEvent::EngineChanged(None));
        }
        if self.state.is_active() {
            self.set_state(PlaybackState::Stopped);
        }
        self.stop_position_timer();
        self.guard.release();
    }

    /// Reset to `Idle` after an engine failure and report it once per load.
    pub(crate) fn fail_session(&mut self, err: PlaybackError) -> PlaybackError {
        self.abort_session(&err);
        err
    }

    /// Drop the session after an engine failure nobody is waiting on.
    pub(crate) fn abort_session(&mut self, err: &PlaybackError) {
        error!(error = %err, "Playback session failed");
        self.end_session();
        self.set_media_state(MediaState::Error);
        self.set_state(PlaybackState::Idle);
        self.set_playing_type(PlayingType::NotPlaying, false);
        self.history_token = None;
        if !std::mem::replace(&mut self.failure_reported, true) {
            self.services.notifications.show_toast(PLAYBACK_FAILED);
            self.emit(PlaybackEvent::MediaFailed(err.to_string()));
        }
    }

    pub(crate) fn load_media(&mut self, media: MediaDescriptor, force_full_engine: bool) -> Result<()> {
        self.ensure_open()?;
        media.validate().map_err(PlaybackError::InvalidArgument)?;

        self.end_session();
        self.session += 1;
        self.failure_reported = false;

        let kind = match self.select_engine(&media, force_full_engine) {
            Ok(kind) => kind,
            Err(e) => return Err(self.fail_session(e)),
        };
        info!(
            engine = %kind,
            kind = ?media.kind,
            media = strip_path(&media.location),
            "Opening media"
        );

        self.clock.reset();
        self.emit_clock();
        match media.kind {
            MediaKind::Video => self.set_playing_type(PlayingType::Video, false),
            MediaKind::Track => self.set_playing_type(PlayingType::Music, false),
            MediaKind::Stream => self.set_playing_type(PlayingType::Video, true),
        }
        let resume_at = Some(media.time_watched)
            .filter(|t| media.kind == MediaKind::Video && !t.is_zero());
        let title = media.display_title();
        self.history_token = media.token.clone();
        self.media = Some(media);
        self.set_media_state(MediaState::Opening);
        self.set_state(PlaybackState::Loading);

        let mut adapter = match create_adapter(self.services.engines.as_ref(), kind) {
            Ok(adapter) => adapter,
            Err(e) => return Err(self.fail_session(e)),
        };
        if let Some(dispatcher) = &self.dispatcher {
            adapter.subscribe(EventRouter::sink(dispatcher.clone(), self.session));
        }

        let started = match &self.media {
            Some(media) => adapter.load(media).and_then(|()| adapter.play()),
            None => Err(PlaybackError::InvalidArgument("media vanished".to_string())),
        };
        if let Err(e) = started {
            adapter.teardown();
            return Err(self.fail_session(e));
        }

        if let Err(e) = adapter.set_volume(self.volume) {
            warn!(error = %e, "Could not apply volume to new engine");
        }
        if self.rate_percent != 100 && adapter.supports(Capability::SetRate) {
            if let Err(e) = adapter.set_rate(self.rate_percent as f32 / 100.0) {
                warn!(error = %e, "Could not apply rate to new engine");
            }
        }
        if let Some(at) = resume_at {
            match adapter.set_time(at) {
                Ok(()) => self.clock.set_elapsed(at),
                Err(e) => warn!(error = %e, "Could not resume at watched time"),
            }
        }

        self.adapter = Some(adapter);
        self.emit(PlaybackEvent::EngineChanged(Some(kind)));
        self.set_state(PlaybackState::Playing);
        self.services.notifications.update_now_playing(&title);
        Ok(())
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub(crate) fn play(&mut self) -> Result<()> {
        self.adapter_mut()?.play()?;
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    /// Toggles between `Playing` and `Paused`. Any other state leaves the
    /// engine alone, since the adapters' pause would restart it.
    pub(crate) fn pause(&mut self) -> Result<()> {
        let state = self.state;
        let adapter = self.adapter_mut()?;
        if !matches!(state, PlaybackState::Playing | PlaybackState::Paused) {
            debug!(%state, "Ignoring pause outside playback");
            return Ok(());
        }
        adapter.pause()?;
        match self.state {
            PlaybackState::Playing => self.set_state(PlaybackState::Paused),
            PlaybackState::Paused => self.set_state(PlaybackState::Playing),
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn stop(&mut self) -> Result<()> {
        self.adapter_mut()?.stop()?;
        self.clock.reset();
        self.emit_clock();
        self.set_state(PlaybackState::Stopped);
        self.guard.release();
        Ok(())
    }

    pub(crate) fn seek(&mut self, position: f32) -> Result<()> {
        let position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };
        self.adapter_mut()?.set_position(position)?;
        if self.clock.is_total_known() {
            let elapsed = self.clock.total().mul_f64(f64::from(position));
            self.clock.set_elapsed(elapsed);
            self.emit_clock();
        }
        Ok(())
    }

    pub(crate) fn set_time(&mut self, time: Duration) -> Result<()> {
        let time = self.clock.clamp(time);
        self.adapter_mut()?.set_time(time)?;
        self.clock.set_elapsed(time);
        self.emit_clock();
        Ok(())
    }

    pub(crate) fn skip_ahead(&mut self) -> Result<()> {
        let target = self.clock.elapsed().saturating_add(self.config.skip_step);
        self.set_time(target)
    }

    pub(crate) fn skip_back(&mut self) -> Result<()> {
        let target = self.clock.elapsed().saturating_sub(self.config.skip_step);
        self.set_time(target)
    }

    /// Zero and negative values are ignored, not treated as mute.
    pub(crate) fn set_volume(&mut self, percent: i32) -> Result<()> {
        self.ensure_open()?;
        let Some(volume) = Volume::new(percent) else {
            debug!(requested = percent, "Ignoring non-positive volume");
            return Ok(());
        };
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.set_volume(volume)?;
        }
        if self.volume != volume {
            self.volume = volume;
            self.emit(PlaybackEvent::VolumeChanged(volume.percent()));
        }
        Ok(())
    }

    pub(crate) fn set_rate(&mut self, percent: i32) -> Result<()> {
        self.ensure_open()?;
        let normalized = normalize_rate_percent(percent, self.config.min_rate, self.config.max_rate);
        let multiplier = normalized as f32 / 100.0;
        if let Some(adapter) = self.adapter.as_mut() {
            if adapter.supports(Capability::SetRate) {
                adapter.set_rate(multiplier)?;
            } else {
                warn!(engine = %adapter.kind(), "Engine cannot change rate; ignoring");
            }
        }
        self.rate_percent = normalized;
        self.clock.set_rate(multiplier);
        self.emit(PlaybackEvent::RateChanged(normalized));
        Ok(())
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    pub(crate) fn select_track(&mut self, track_type: TrackType, id: i32) -> Result<()> {
        let adapter = self.adapter_mut()?;
        if !adapter.supports(Capability::SelectTrack) {
            warn!(engine = %adapter.kind(), ?track_type, id, "Engine cannot select tracks; ignoring");
            return Ok(());
        }
        adapter.select_track(track_type, id)?;
        self.track_list_mut(track_type).select(Some(id));
        self.publish_tracks(track_type);
        Ok(())
    }

    pub(crate) fn open_subtitle(&mut self, uri: &str) -> Result<()> {
        if uri.trim().is_empty() {
            return Err(PlaybackError::InvalidArgument(
                "subtitle location is empty".to_string(),
            ));
        }
        let adapter = self.adapter_mut()?;
        if !adapter.supports(Capability::OpenSubtitle) {
            warn!(engine = %adapter.kind(), "Engine cannot open subtitle files; ignoring");
            return Ok(());
        }
        adapter.open_subtitle(uri)
    }

    // ========================================================================
    // Playlist
    // ========================================================================

    pub(crate) fn set_playlist(&mut self, items: Vec<MediaDescriptor>, start: usize) -> Result<()> {
        self.ensure_open()?;
        if let Some(bad) = items.iter().find(|m| m.validate().is_err()) {
            return Err(PlaybackError::InvalidArgument(format!(
                "playlist entry has an empty location ({:?})",
                bad.kind
            )));
        }
        self.tracks.set_items(items, start)?;
        let Some(current) = self.tracks.current().cloned() else {
            return Ok(());
        };
        self.tracks.set_running(true);
        self.load_media(current, false)
    }

    pub(crate) fn play_next(&mut self) -> Result<()> {
        self.ensure_open()?;
        if !self.tracks.next() {
            self.services.notifications.clear_tiles();
            return Ok(());
        }
        match self.tracks.current().cloned() {
            Some(next) => self.load_media(next, false),
            None => Ok(()),
        }
    }

    pub(crate) fn play_previous(&mut self) -> Result<()> {
        self.ensure_open()?;
        if !self.tracks.previous() {
            self.services.notifications.clear_tiles();
            return Ok(());
        }
        match self.tracks.current().cloned() {
            Some(previous) => self.load_media(previous, false),
            None => Ok(()),
        }
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Token and elapsed time to persist, if a token is active.
    pub(crate) fn history_snapshot(&self) -> Option<(String, Duration)> {
        if self.disposed {
            return None;
        }
        self.history_token
            .clone()
            .map(|token| (token, self.clock.elapsed()))
    }

    /// Copy the elapsed time into the current descriptor and hand back what
    /// should be written to history.
    pub(crate) fn record_position(&mut self) -> Option<(String, Duration)> {
        let elapsed = self.clock.elapsed();
        if let Some(media) = self.media.as_mut() {
            media.time_watched = elapsed;
        }
        self.history_snapshot()
    }

    /// Queue a history write behind any earlier ones.
    pub(crate) fn persist(&self, token: String, elapsed: Duration) {
        self.history_writer.write(token, elapsed);
    }

    /// Persistence timer tick: write the active token's elapsed time.
    pub(crate) fn persist_position(&self) {
        if let Some((token, elapsed)) = self.history_snapshot() {
            self.persist(token, elapsed);
        }
    }

    /// Record the elapsed time and queue a write whose outcome the caller
    /// can await. `None` when no token is active.
    pub(crate) fn persist_position_confirmed(
        &mut self,
    ) -> Option<oneshot::Receiver<bridge_traits::error::Result<()>>> {
        self.record_position()
            .map(|(token, elapsed)| self.history_writer.write_confirmed(token, elapsed))
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    pub(crate) fn clean(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.end_session();
        self.set_state(PlaybackState::Stopped);
        self.set_playing_type(PlayingType::NotPlaying, false);
        self.clock.reset();
        self.emit_clock();
        self.tracks.reset();
        self.history_token = None;
        self.media = None;
        Ok(())
    }

    /// Idempotent. Forces `Stopped` before anything is torn down so queued
    /// work sees a finished controller.
    pub(crate) fn dispose(&mut self) {
        if std::mem::replace(&mut self.disposed, true) {
            return;
        }
        info!("Disposing playback controller");
        self.set_state(PlaybackState::Stopped);
        self.session += 1;
        self.stop_position_timer();
        if let Some(timer) = self.persistence_timer.take() {
            timer.cancel();
        }
        if let Some(mut adapter) = self.adapter.take() {
            adapter.unsubscribe();
            if let Err(e) = adapter.stop() {
                debug!(error = %e, "Stopping engine during dispose failed");
            }
            adapter.teardown();
            self.emit(PlaybackEvent::EngineChanged(None));
        }
        self.guard.release();
        self.history_token = None;
    }
}

impl Drop for ControllerCore {
    fn drop(&mut self) {
        self.dispose();
    }
}
