//! # Event Router
//!
//! Engine callbacks arrive on engine-owned threads. The sink handed to an
//! adapter does nothing but post the event onto the controller's queue;
//! every state change happens later, inside a job, in the handlers below.
//!
//! ```text
//!  engine thread ── EngineEvent ──> sink ── dispatch(Normal | Low) ──> ControllerCore::route_event
//! ```
//!
//! Time updates ride the low-priority band so user operations overtake them.

use crate::engine::{Capability, EngineEvent, EngineSink};
use crate::events::PlaybackEvent;
use crate::state::ControllerCore;
use crate::types::{MediaState, PlaybackState, PlayingType, TrackType};
use core_async::dispatch::{Priority, WeakDispatcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Builds the engine sinks that marshal events onto the queue.
pub(crate) struct EventRouter;

impl EventRouter {
    /// Sink for the adapter of `session`.
    pub(crate) fn sink(dispatcher: WeakDispatcher<ControllerCore>, session: u64) -> EngineSink {
        Arc::new(move |event: EngineEvent| {
            let priority = match event {
                EngineEvent::TimeChanged(_) => Priority::Low,
                _ => Priority::Normal,
            };
            if dispatcher
                .dispatch(priority, move |core| core.route_event(session, event))
                .is_err()
            {
                trace!("Controller gone; engine event dropped");
            }
        })
    }
}

impl ControllerCore {
    pub(crate) fn route_event(&mut self, session: u64, event: EngineEvent) {
        if self.disposed || session != self.session || self.adapter.is_none() {
            trace!(?event, session, "Dropping stale engine event");
            return;
        }
        match event {
            EngineEvent::StatusChanged(status) => self.on_status_changed(status),
            EngineEvent::TimeChanged(time) => self.on_time_changed(time),
            EngineEvent::LengthChanged(length) => self.on_length_changed(length),
            EngineEvent::EndReached => self.on_end_reached(),
            EngineEvent::MediaFailed(reason) => self.on_media_failed(reason),
            EngineEvent::TrackAdded { track_type, id } => self.on_track_added(track_type, id),
            EngineEvent::TrackDeleted { track_type, id } => self.on_track_deleted(track_type, id),
        }
    }

    fn on_status_changed(&mut self, status: MediaState) {
        self.set_media_state(status);
        match status {
            MediaState::Playing
                if matches!(self.state, PlaybackState::Loading | PlaybackState::Paused) =>
            {
                self.set_state(PlaybackState::Playing);
            }
            MediaState::Paused if self.state == PlaybackState::Playing => {
                self.set_state(PlaybackState::Paused);
            }
            MediaState::Stopped => self.on_stopped(),
            _ => {}
        }
    }

    /// The engine stopped on its own or after `stop`: drop it.
    fn on_stopped(&mut self) {
        if let Some(mut adapter) = self.adapter.take() {
            debug!(engine = %adapter.kind(), "Engine stopped; tearing down");
            adapter.unsubscribe();
            adapter.teardown();
            self.emit(PlaybackEvent::EngineChanged(None));
        }
        if self.state.is_active() {
            self.set_state(PlaybackState::Stopped);
        }
    }

    fn on_time_changed(&mut self, time: Duration) {
        if !matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            return;
        }
        self.clock.set_elapsed(time);
        self.emit_clock();
    }

    fn on_length_changed(&mut self, length: Duration) {
        self.clock.set_total(length);
        self.emit(PlaybackEvent::LengthChanged(length));
        self.emit_clock();
    }

    fn on_media_failed(&mut self, reason: String) {
        self.abort_session(&crate::PlaybackError::EngineFailure(reason));
    }

    /// Resolve the transient `EndReached` state to `Playing` (next track) or
    /// `Stopped` before returning. Only entered from `Playing`.
    fn on_end_reached(&mut self) {
        if self.state != PlaybackState::Playing {
            trace!(state = %self.state, "Ignoring end of media outside playback");
            return;
        }
        self.set_state(PlaybackState::EndReached);
        self.set_media_state(MediaState::Ended);

        match self.playing_type {
            PlayingType::Music => self.finish_music(),
            PlayingType::Video => self.finish_video(),
            PlayingType::NotPlaying => self.set_state(PlaybackState::Stopped),
        }
        debug_assert_ne!(self.state, PlaybackState::EndReached);
    }

    fn finish_music(&mut self) {
        if self.tracks.next() {
            if let Some(next) = self.tracks.current().cloned() {
                if let Err(e) = self.load_media(next, false) {
                    warn!(error = %e, "Advancing to next track failed");
                }
                if self.state == PlaybackState::EndReached {
                    self.set_state(PlaybackState::Stopped);
                }
                return;
            }
        }

        debug!("Playlist finished");
        self.tracks.set_running(false);
        self.set_state(PlaybackState::Stopped);
        self.set_playing_type(PlayingType::NotPlaying, false);
        self.services.notifications.clear_tiles();
        self.services.navigation.navigate_home();
        self.emit(PlaybackEvent::PlaylistFinished);
    }

    /// Videos rewind their watched time and leave the player regardless of
    /// any playlist.
    fn finish_video(&mut self) {
        if let Some(media) = self.media.as_mut() {
            media.time_watched = Duration::ZERO;
        }
        if let Some(token) = self.history_token.take() {
            self.persist(token, Duration::ZERO);
        }

        if self.services.navigation.can_go_back() {
            self.services.navigation.go_back();
        } else {
            self.services.navigation.navigate_to_library();
        }

        self.set_state(PlaybackState::Stopped);
        self.set_playing_type(PlayingType::NotPlaying, false);
    }

    fn on_track_added(&mut self, track_type: TrackType, id: i32) {
        let Some(adapter) = self.adapter.as_ref() else {
            return;
        };
        let tracks = adapter.tracks(track_type);
        trace!(?track_type, id, count = tracks.len(), "Track added");

        // Index 0 is the "disabled" entry; 1 is the first real track.
        let auto_select = {
            let list = self.track_list_mut(track_type);
            list.replace(tracks);
            if list.has_selection() {
                None
            } else {
                list.items().get(1).map(|t| t.id)
            }
        };

        if let Some(auto) = auto_select {
            if let Some(adapter) = self.adapter.as_mut() {
                if adapter.supports(Capability::SelectTrack) {
                    if let Err(e) = adapter.select_track(track_type, auto) {
                        warn!(error = %e, ?track_type, "Auto-selecting track failed");
                    }
                }
            }
            self.track_list_mut(track_type).select(Some(auto));
        }
        self.publish_tracks(track_type);
    }

    fn on_track_deleted(&mut self, track_type: TrackType, id: i32) {
        if self.track_list_mut(track_type).remove(id) {
            trace!(?track_type, id, "Track removed");
            self.publish_tracks(track_type);
        }
    }
}
