//! Position and persistence timers.
//!
//! Both run as workers on the controller's runtime and only hold a weak
//! handle to the queue, so they never keep a dropped controller alive.

use crate::events::PlaybackEvent;
use crate::state::ControllerCore;
use crate::types::PlaybackState;
use core_async::dispatch::Priority;
use core_async::select;
use core_async::task::WorkerHandle;
use core_async::time::steady_interval;
use tracing::{debug, trace};

impl ControllerCore {
    /// Start the position timer for the current session unless it already
    /// runs.
    pub(crate) fn start_position_timer(&mut self) {
        if self.position_timer.is_some() {
            return;
        }
        let Some(dispatcher) = self.dispatcher.clone() else {
            return;
        };
        let session = self.session;
        let period = self.config.position_interval;

        self.position_timer = Some(WorkerHandle::spawn_on(&self.runtime, move |token| async move {
            let mut ticker = steady_interval(period);
            loop {
                select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let tick = dispatcher.dispatch(Priority::Low, move |core: &mut ControllerCore| {
                            core.on_position_tick(session)
                        });
                        if tick.is_err() {
                            break;
                        }
                    }
                }
            }
            trace!(session, "Position timer stopped");
        }));
    }

    pub(crate) fn stop_position_timer(&mut self) {
        if let Some(timer) = self.position_timer.take() {
            timer.cancel();
        }
    }

    pub(crate) fn on_position_tick(&mut self, session: u64) {
        if self.disposed || session != self.session || self.state != PlaybackState::Playing {
            return;
        }
        let Some(adapter) = self.adapter.as_ref() else {
            return;
        };

        let length = if self.clock.is_total_known() {
            None
        } else {
            adapter.length().ok().flatten()
        };
        let time = adapter.time();

        if let Some(length) = length {
            self.clock.set_total(length);
            self.emit(PlaybackEvent::LengthChanged(length));
        }
        match time {
            Ok(Some(elapsed)) => self.clock.set_elapsed(elapsed),
            Ok(None) => {}
            Err(e) => debug!(error = %e, "Position query failed"),
        }
        self.emit_clock();
    }

    /// Start the persistence timer. Runs for the controller's lifetime;
    /// ticks without an active token do nothing.
    pub(crate) fn start_persistence_timer(&mut self) {
        if self.persistence_timer.is_some() {
            return;
        }
        let Some(dispatcher) = self.dispatcher.clone() else {
            return;
        };
        let period = self.config.persistence_interval;

        self.persistence_timer = Some(WorkerHandle::spawn_on(&self.runtime, move |token| async move {
            let mut ticker = steady_interval(period);
            // The first tick fires immediately.
            ticker.tick().await;
            loop {
                select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let tick = dispatcher.dispatch(Priority::Low, |core: &mut ControllerCore| {
                            core.persist_position()
                        });
                        if tick.is_err() {
                            break;
                        }
                    }
                }
            }
            trace!("Persistence timer stopped");
        }));
    }
}
