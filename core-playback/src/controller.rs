//! # Playback Controller
//!
//! Public, cloneable handle to the controller. Every operation is a job on
//! the controller's execution context; the async methods resolve once that
//! job has run, so callers observe the outcome of their own transition.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{MediaDescriptor, PlaybackConfig, PlaybackController};
//!
//! let controller = PlaybackController::new(&core_config, PlaybackConfig::default())?;
//! let mut events = controller.subscribe();
//!
//! controller
//!     .set_media(MediaDescriptor::video("/videos/holiday.mkv").with_token("tok-42"), false)
//!     .await?;
//! controller.set_volume(80).await?;
//! controller.skip_ahead().await?;
//! ```
//!
//! ## Executors
//!
//! [`PlaybackController::new`] runs the controller on a Tokio-backed
//! [`DispatchQueue`]. [`PlaybackController::with_executor`] accepts any
//! [`Executor`], which is how tests substitute the synchronous
//! [`InlineExecutor`](core_async::dispatch::InlineExecutor).

use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::state::{ControllerCore, PlaybackSnapshot};
use crate::types::{MediaDescriptor, PlaybackState, TrackType};
use core_async::dispatch::{DispatchError, DispatchQueue, Dispatcher, Executor, Priority};
use core_async::runtime::Handle;
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Unified playback control over the host's engines.
#[derive(Clone)]
pub struct PlaybackController {
    dispatcher: Dispatcher<ControllerCore>,
    events: EventBus<PlaybackEvent>,
    history: Arc<dyn bridge_traits::HistoryService>,
}

impl PlaybackController {
    /// Create a controller on its own dispatch queue.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(core: &CoreConfig, config: PlaybackConfig) -> Result<Self> {
        Self::with_executor(core, config, |state| DispatchQueue::spawn(state))
    }

    /// Create a controller on a caller-supplied executor.
    ///
    /// `make_executor` receives the initial controller state and must move
    /// it into the executor it returns. Timers are spawned on the runtime
    /// current at construction time, which must exist.
    pub fn with_executor<F, X>(core: &CoreConfig, config: PlaybackConfig, make_executor: F) -> Result<Self>
    where
        F: FnOnce(ControllerCore) -> Arc<X>,
        X: Executor<ControllerCore> + 'static,
    {
        config.validate().map_err(PlaybackError::Config)?;
        let runtime = Handle::try_current().map_err(|_| {
            PlaybackError::NotInitialized(
                "playback controller must be created inside a Tokio runtime".to_string(),
            )
        })?;

        let events = EventBus::new(config.event_buffer);
        let state = ControllerCore::new(core, config, events.clone(), runtime);
        let executor: Arc<dyn Executor<ControllerCore>> = make_executor(state);
        let dispatcher = Dispatcher::new(executor);

        let weak = dispatcher.downgrade();
        dispatcher.dispatch(Priority::Normal, move |core| core.bind(weak))?;
        debug!("Playback controller created");

        Ok(Self {
            dispatcher,
            events,
            history: Arc::clone(&core.history),
        })
    }

    /// Stream of property-change notices. Dropping it unsubscribes.
    pub fn subscribe(&self) -> EventStream<PlaybackEvent> {
        self.events.stream()
    }

    async fn run<R, F>(&self, job: F) -> Result<R>
    where
        F: FnOnce(&mut ControllerCore) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        self.dispatcher.call(Priority::Normal, job).await?
    }

    // ========================================================================
    // Media
    // ========================================================================

    /// Replace the current media.
    ///
    /// The previous engine is stopped, unsubscribed and released before the
    /// new one is created. With `force_full_engine` a track never goes to
    /// the background engine. Engine failures leave the controller `Idle`
    /// and are returned as [`PlaybackError::EngineFailure`].
    pub async fn set_media(&self, media: MediaDescriptor, force_full_engine: bool) -> Result<()> {
        self.run(move |core| core.load_media(media, force_full_engine))
            .await
    }

    /// Load a playlist and start playing the item at `start`.
    pub async fn set_playlist(&self, items: Vec<MediaDescriptor>, start: usize) -> Result<()> {
        self.run(move |core| core.set_playlist(items, start)).await
    }

    /// Advance to the next playlist item. Without one, only clears tiles.
    pub async fn play_next(&self) -> Result<()> {
        self.run(|core| core.play_next()).await
    }

    /// Step back to the previous playlist item. Without one, only clears
    /// tiles.
    pub async fn play_previous(&self) -> Result<()> {
        self.run(|core| core.play_previous()).await
    }

    /// Reopen the most recent history entry as a video.
    ///
    /// Returns `false` when the history is empty.
    pub async fn resume_last(&self) -> Result<bool> {
        let Some(token) = self.history.token_at_position(0).await? else {
            debug!("No history entry to resume");
            return Ok(false);
        };
        let media = MediaDescriptor::video(token.clone()).with_token(token);
        self.set_media(media, false).await?;
        Ok(true)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub async fn play(&self) -> Result<()> {
        self.run(|core| core.play()).await
    }

    /// Toggle between playing and paused.
    pub async fn pause(&self) -> Result<()> {
        self.run(|core| core.pause()).await
    }

    /// Stop playback, zero the clock and release display and pointer.
    pub async fn stop(&self) -> Result<()> {
        self.run(|core| core.stop()).await
    }

    /// Seek to a `0.0..=1.0` fraction. Out-of-range input is clamped.
    pub async fn seek(&self, position: f32) -> Result<()> {
        self.run(move |core| core.seek(position)).await
    }

    /// Seek to an absolute time, clamped to the media length once known.
    pub async fn set_time(&self, time: Duration) -> Result<()> {
        self.run(move |core| core.set_time(time)).await
    }

    pub async fn skip_ahead(&self) -> Result<()> {
        self.run(|core| core.skip_ahead()).await
    }

    pub async fn skip_back(&self) -> Result<()> {
        self.run(|core| core.skip_back()).await
    }

    /// Set volume in percent. Zero or negative requests are ignored.
    pub async fn set_volume(&self, percent: i32) -> Result<()> {
        self.run(move |core| core.set_volume(percent)).await
    }

    /// Set playback rate in percent (100 = normal). Requests in `(95, 105)`
    /// snap to 100; the result is clamped to the configured range.
    pub async fn set_rate(&self, percent: i32) -> Result<()> {
        self.run(move |core| core.set_rate(percent)).await
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    pub async fn set_audio_track(&self, id: i32) -> Result<()> {
        self.run(move |core| core.select_track(TrackType::Audio, id))
            .await
    }

    pub async fn set_subtitle_track(&self, id: i32) -> Result<()> {
        self.run(move |core| core.select_track(TrackType::Subtitle, id))
            .await
    }

    /// Attach an external subtitle file.
    pub async fn open_subtitle(&self, uri: impl Into<String>) -> Result<()> {
        let uri = uri.into();
        self.run(move |core| core.open_subtitle(&uri)).await
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Store the current elapsed time as the media's watched time and write
    /// it to history right away.
    pub async fn update_position(&self) -> Result<()> {
        let pending = self
            .dispatcher
            .call(Priority::Normal, |core| core.persist_position_confirmed())
            .await?;
        if let Some(pending) = pending {
            pending.await.map_err(|_| DispatchError::Closed)??;
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn snapshot(&self) -> Result<PlaybackSnapshot> {
        Ok(self
            .dispatcher
            .call(Priority::Normal, |core| core.snapshot())
            .await?)
    }

    pub async fn state(&self) -> Result<PlaybackState> {
        Ok(self
            .dispatcher
            .call(Priority::Normal, |core| core.state)
            .await?)
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Stop playback and reset playing type, clock and playlist.
    pub async fn clean(&self) -> Result<()> {
        self.run(|core| core.clean()).await
    }

    /// Tear everything down. Safe to call more than once.
    pub async fn dispose(&self) {
        if let Err(e) = self
            .dispatcher
            .call(Priority::Normal, |core| core.dispose())
            .await
        {
            warn!(error = %e, "Controller already shut down");
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("dispatcher", &self.dispatcher)
            .field("events", &self.events)
            .finish()
    }
}
