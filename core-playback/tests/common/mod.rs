//! Shared fakes for the controller integration tests.
//!
//! Every engine kind has one shared state block; the provider hands each new
//! instance a reference to it, so tests can drive "the current engine"
//! without tracking instances. Calls from all engines and host services land
//! in one ordered log.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BackgroundBackend, BackgroundEvent, BridgeError, DisplayRequest, ElementEvent, ElementState,
    EngineKind, EngineProvider, EventSink, HistoryService, NativeBackend, NativeEvent,
    NavigationService, NotificationService, PlatformBackend, PointerService, TrackDescription,
};
use core_async::dispatch::InlineExecutor;
use core_playback::{ControllerCore, PlaybackConfig, PlaybackController, PlaybackEvent};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventStream;
use mockall::mock;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Call log
// ============================================================================

#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
    live_sinks: AtomicUsize,
    max_live_sinks: AtomicUsize,
}

impl CallLog {
    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls.lock().iter().position(|c| c.as_str() == call)
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn live_sinks(&self) -> usize {
        self.live_sinks.load(Ordering::SeqCst)
    }

    pub fn max_live_sinks(&self) -> usize {
        self.max_live_sinks.load(Ordering::SeqCst)
    }

    fn attached(&self) {
        let live = self.live_sinks.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live_sinks.fetch_max(live, Ordering::SeqCst);
    }

    fn detached(&self) {
        self.live_sinks.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Clone the sink out of its slot and invoke it without holding the lock;
/// the handler may detach on the same thread.
fn fire<E>(slot: &Mutex<Option<EventSink<E>>>, event: E) {
    let sink = slot.lock().clone();
    if let Some(sink) = sink {
        sink(event);
    }
}

// ============================================================================
// Native engine
// ============================================================================

pub struct NativeEngine {
    log: Arc<CallLog>,
    sink: Mutex<Option<EventSink<NativeEvent>>>,
    pub time_ms: AtomicI64,
    pub length_ms: AtomicI64,
    pub volume: AtomicI32,
    pub rate: Mutex<f32>,
    pub audio_tracks: Mutex<Vec<TrackDescription>>,
    pub subtitles: Mutex<Vec<TrackDescription>>,
    pub fail_open: AtomicBool,
}

impl NativeEngine {
    fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            sink: Mutex::new(None),
            time_ms: AtomicI64::new(0),
            length_ms: AtomicI64::new(0),
            volume: AtomicI32::new(100),
            rate: Mutex::new(1.0),
            audio_tracks: Mutex::new(Vec::new()),
            subtitles: Mutex::new(Vec::new()),
            fail_open: AtomicBool::new(false),
        }
    }

    pub fn emit(&self, event: NativeEvent) {
        fire(&self.sink, event);
    }

    /// The sink currently attached, for replaying events after a swap.
    pub fn current_sink(&self) -> Option<EventSink<NativeEvent>> {
        self.sink.lock().clone()
    }

    pub fn rate(&self) -> f32 {
        *self.rate.lock()
    }
}

struct NativeInstance {
    engine: Arc<NativeEngine>,
    attached: AtomicBool,
}

impl NativeBackend for NativeInstance {
    fn open(&self, location: &str) -> BridgeResult<()> {
        self.engine.log.record(format!("native:open:{location}"));
        if self.engine.fail_open.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("codec missing".into()));
        }
        Ok(())
    }

    fn play(&self) -> BridgeResult<()> {
        self.engine.log.record("native:play");
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        self.engine.log.record("native:pause");
        Ok(())
    }

    fn stop(&self) -> BridgeResult<()> {
        self.engine.log.record("native:stop");
        Ok(())
    }

    fn time(&self) -> i64 {
        self.engine.time_ms.load(Ordering::SeqCst)
    }

    fn set_time(&self, ms: i64) {
        self.engine.log.record(format!("native:set_time:{ms}"));
        self.engine.time_ms.store(ms, Ordering::SeqCst);
    }

    fn position(&self) -> f32 {
        let length = self.engine.length_ms.load(Ordering::SeqCst);
        if length <= 0 {
            return -1.0;
        }
        self.engine.time_ms.load(Ordering::SeqCst) as f32 / length as f32
    }

    fn set_position(&self, position: f32) {
        self.engine.log.record(format!("native:set_position:{position}"));
        let length = self.engine.length_ms.load(Ordering::SeqCst);
        if length > 0 {
            let ms = (length as f64 * f64::from(position)) as i64;
            self.engine.time_ms.store(ms, Ordering::SeqCst);
        }
    }

    fn length(&self) -> i64 {
        self.engine.length_ms.load(Ordering::SeqCst)
    }

    fn volume(&self) -> i32 {
        self.engine.volume.load(Ordering::SeqCst)
    }

    fn set_volume(&self, volume: i32) {
        self.engine.volume.store(volume, Ordering::SeqCst);
    }

    fn set_rate(&self, rate: f32) {
        *self.engine.rate.lock() = rate;
    }

    fn audio_tracks(&self) -> Vec<TrackDescription> {
        self.engine.audio_tracks.lock().clone()
    }

    fn subtitles(&self) -> Vec<TrackDescription> {
        self.engine.subtitles.lock().clone()
    }

    fn set_audio_track(&self, id: i32) {
        self.engine.log.record(format!("native:audio_track:{id}"));
    }

    fn set_subtitle(&self, id: i32) {
        self.engine.log.record(format!("native:subtitle:{id}"));
    }

    fn add_subtitle_file(&self, uri: &str) -> BridgeResult<()> {
        self.engine.log.record(format!("native:subtitle_file:{uri}"));
        Ok(())
    }

    fn attach(&self, sink: EventSink<NativeEvent>) {
        self.engine.log.record("native:attach");
        *self.engine.sink.lock() = Some(sink);
        if !self.attached.swap(true, Ordering::SeqCst) {
            self.engine.log.attached();
        }
    }

    fn detach(&self) {
        self.engine.log.record("native:detach");
        if self.attached.swap(false, Ordering::SeqCst) {
            *self.engine.sink.lock() = None;
            self.engine.log.detached();
        }
    }

    fn release(&self) {
        self.engine.log.record("native:release");
    }
}

// ============================================================================
// Platform element
// ============================================================================

pub struct PlatformElement {
    log: Arc<CallLog>,
    sink: Mutex<Option<EventSink<ElementEvent>>>,
    pub bound: AtomicBool,
    pub state: Mutex<ElementState>,
    pub position: Mutex<Duration>,
    pub duration: Mutex<Option<Duration>>,
    pub volume: Mutex<f64>,
}

impl PlatformElement {
    fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            sink: Mutex::new(None),
            bound: AtomicBool::new(true),
            state: Mutex::new(ElementState::Closed),
            position: Mutex::new(Duration::ZERO),
            duration: Mutex::new(None),
            volume: Mutex::new(1.0),
        }
    }

    pub fn emit(&self, event: ElementEvent) {
        fire(&self.sink, event);
    }
}

struct PlatformInstance {
    element: Arc<PlatformElement>,
    attached: AtomicBool,
}

impl PlatformBackend for PlatformInstance {
    fn is_bound(&self) -> bool {
        self.element.bound.load(Ordering::SeqCst)
    }

    fn set_source(&self, location: &str) -> BridgeResult<()> {
        self.element.log.record(format!("platform:open:{location}"));
        Ok(())
    }

    fn play(&self) -> BridgeResult<()> {
        self.element.log.record("platform:play");
        *self.element.state.lock() = ElementState::Playing;
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        self.element.log.record("platform:pause");
        *self.element.state.lock() = ElementState::Paused;
        Ok(())
    }

    fn stop(&self) -> BridgeResult<()> {
        self.element.log.record("platform:stop");
        *self.element.state.lock() = ElementState::Stopped;
        Ok(())
    }

    fn current_state(&self) -> ElementState {
        *self.element.state.lock()
    }

    fn position(&self) -> Duration {
        *self.element.position.lock()
    }

    fn set_position(&self, position: Duration) {
        *self.element.position.lock() = position;
    }

    fn natural_duration(&self) -> Option<Duration> {
        *self.element.duration.lock()
    }

    fn volume(&self) -> f64 {
        *self.element.volume.lock()
    }

    fn set_volume(&self, volume: f64) {
        *self.element.volume.lock() = volume;
    }

    fn set_playback_rate(&self, rate: f64) {
        self.element.log.record(format!("platform:rate:{rate}"));
    }

    fn attach(&self, sink: EventSink<ElementEvent>) {
        self.element.log.record("platform:attach");
        *self.element.sink.lock() = Some(sink);
        if !self.attached.swap(true, Ordering::SeqCst) {
            self.element.log.attached();
        }
    }

    fn detach(&self) {
        self.element.log.record("platform:detach");
        if self.attached.swap(false, Ordering::SeqCst) {
            *self.element.sink.lock() = None;
            self.element.log.detached();
        }
    }
}

// ============================================================================
// Background player
// ============================================================================

pub struct BackgroundPlayer {
    log: Arc<CallLog>,
    sink: Mutex<Option<EventSink<BackgroundEvent>>>,
    pub state: Mutex<ElementState>,
    pub position: Mutex<Duration>,
    pub fail_queries: AtomicBool,
}

impl BackgroundPlayer {
    fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            sink: Mutex::new(None),
            state: Mutex::new(ElementState::Closed),
            position: Mutex::new(Duration::ZERO),
            fail_queries: AtomicBool::new(false),
        }
    }

    pub fn emit(&self, event: BackgroundEvent) {
        fire(&self.sink, event);
    }

    fn check(&self) -> BridgeResult<()> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("background task suspended".into()));
        }
        Ok(())
    }
}

struct BackgroundInstance {
    player: Arc<BackgroundPlayer>,
    attached: AtomicBool,
}

impl BackgroundBackend for BackgroundInstance {
    fn play_track(&self, location: &str) -> BridgeResult<()> {
        self.player.log.record(format!("background:open:{location}"));
        Ok(())
    }

    fn play(&self) -> BridgeResult<()> {
        self.player.log.record("background:play");
        *self.player.state.lock() = ElementState::Playing;
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        self.player.log.record("background:pause");
        *self.player.state.lock() = ElementState::Paused;
        Ok(())
    }

    fn stop(&self) -> BridgeResult<()> {
        self.player.log.record("background:stop");
        *self.player.state.lock() = ElementState::Stopped;
        Ok(())
    }

    fn current_state(&self) -> BridgeResult<ElementState> {
        self.player.check()?;
        Ok(*self.player.state.lock())
    }

    fn position(&self) -> BridgeResult<Duration> {
        self.player.check()?;
        Ok(*self.player.position.lock())
    }

    fn set_position(&self, position: Duration) -> BridgeResult<()> {
        self.player.check()?;
        *self.player.position.lock() = position;
        Ok(())
    }

    fn natural_duration(&self) -> BridgeResult<Duration> {
        self.player.check()?;
        Ok(Duration::from_secs(180))
    }

    fn volume(&self) -> BridgeResult<f64> {
        self.player.check()?;
        Ok(1.0)
    }

    fn set_volume(&self, _volume: f64) -> BridgeResult<()> {
        self.player.check()
    }

    fn attach(&self, sink: EventSink<BackgroundEvent>) {
        self.player.log.record("background:attach");
        *self.player.sink.lock() = Some(sink);
        if !self.attached.swap(true, Ordering::SeqCst) {
            self.player.log.attached();
        }
    }

    fn detach(&self) {
        self.player.log.record("background:detach");
        if self.attached.swap(false, Ordering::SeqCst) {
            *self.player.sink.lock() = None;
            self.player.log.detached();
        }
    }
}

// ============================================================================
// Provider
// ============================================================================

pub struct FakeProvider {
    available: Vec<EngineKind>,
    pub log: Arc<CallLog>,
    pub native: Arc<NativeEngine>,
    pub platform: Arc<PlatformElement>,
    pub background: Arc<BackgroundPlayer>,
    created: Mutex<Vec<EngineKind>>,
}

impl FakeProvider {
    pub fn new(available: &[EngineKind]) -> Self {
        let log = Arc::new(CallLog::default());
        Self {
            available: available.to_vec(),
            native: Arc::new(NativeEngine::new(Arc::clone(&log))),
            platform: Arc::new(PlatformElement::new(Arc::clone(&log))),
            background: Arc::new(BackgroundPlayer::new(Arc::clone(&log))),
            log,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Engine kinds in creation order.
    pub fn created(&self) -> Vec<EngineKind> {
        self.created.lock().clone()
    }
}

impl EngineProvider for FakeProvider {
    fn is_available(&self, kind: EngineKind) -> bool {
        self.available.contains(&kind)
    }

    fn create_native(&self) -> BridgeResult<Box<dyn NativeBackend>> {
        self.created.lock().push(EngineKind::Native);
        Ok(Box::new(NativeInstance {
            engine: Arc::clone(&self.native),
            attached: AtomicBool::new(false),
        }))
    }

    fn create_platform(&self) -> BridgeResult<Box<dyn PlatformBackend>> {
        self.created.lock().push(EngineKind::Platform);
        Ok(Box::new(PlatformInstance {
            element: Arc::clone(&self.platform),
            attached: AtomicBool::new(false),
        }))
    }

    fn create_background(&self) -> BridgeResult<Box<dyn BackgroundBackend>> {
        self.created.lock().push(EngineKind::BackgroundNative);
        Ok(Box::new(BackgroundInstance {
            player: Arc::clone(&self.background),
            attached: AtomicBool::new(false),
        }))
    }
}

// ============================================================================
// Host services
// ============================================================================

/// Navigation, notifications, display request and pointer in one recorder.
#[derive(Default)]
pub struct HostRecorder {
    pub log: CallLog,
    pub can_go_back: AtomicBool,
}

impl NavigationService for HostRecorder {
    fn can_go_back(&self) -> bool {
        self.can_go_back.load(Ordering::SeqCst)
    }

    fn go_back(&self) {
        self.log.record("go_back");
    }

    fn navigate_home(&self) {
        self.log.record("navigate_home");
    }

    fn navigate_to_library(&self) {
        self.log.record("navigate_to_library");
    }
}

impl NotificationService for HostRecorder {
    fn clear_tiles(&self) {
        self.log.record("clear_tiles");
    }

    fn update_now_playing(&self, title: &str) {
        self.log.record(format!("now_playing:{title}"));
    }

    fn show_toast(&self, message: &str) {
        self.log.record(format!("toast:{message}"));
    }
}

impl DisplayRequest for HostRecorder {
    fn request_active(&self) -> BridgeResult<()> {
        self.log.record("display_active");
        Ok(())
    }

    fn request_release(&self) -> BridgeResult<()> {
        self.log.record("display_release");
        Ok(())
    }
}

impl PointerService for HostRecorder {
    fn hide_pointer(&self) {
        self.log.record("pointer_hide");
    }

    fn restore_pointer(&self) {
        self.log.record("pointer_restore");
    }
}

mock! {
    pub History {}

    #[async_trait]
    impl HistoryService for History {
        async fn update_media_history(&self, token: &str, elapsed: Duration) -> BridgeResult<()>;
        async fn token_at_position(&self, index: usize) -> BridgeResult<Option<String>>;
    }
}

/// History that accepts anything and has no entries.
pub fn quiet_history() -> MockHistory {
    let mut history = MockHistory::new();
    history.expect_update_media_history().returning(|_, _| Ok(()));
    history.expect_token_at_position().returning(|_| Ok(None));
    history
}

/// History that records every write.
pub fn recording_history() -> (MockHistory, Arc<Mutex<Vec<(String, Duration)>>>) {
    let writes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&writes);
    let mut history = MockHistory::new();
    history
        .expect_update_media_history()
        .returning(move |token, elapsed| {
            sink.lock().push((token.to_string(), elapsed));
            Ok(())
        });
    history.expect_token_at_position().returning(|_| Ok(None));
    (history, writes)
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub controller: PlaybackController,
    pub executor: Arc<InlineExecutor<ControllerCore>>,
    pub provider: Arc<FakeProvider>,
    pub host: Arc<HostRecorder>,
    pub events: EventStream<PlaybackEvent>,
}

pub struct HarnessBuilder {
    available: Vec<EngineKind>,
    background_audio: bool,
    hide_pointer: bool,
    history: Option<MockHistory>,
    config: PlaybackConfig,
}

impl HarnessBuilder {
    pub fn engines(mut self, available: &[EngineKind]) -> Self {
        self.available = available.to_vec();
        self
    }

    pub fn background_audio(mut self, enabled: bool) -> Self {
        self.background_audio = enabled;
        self
    }

    pub fn hide_pointer(mut self, enabled: bool) -> Self {
        self.hide_pointer = enabled;
        self
    }

    pub fn history(mut self, history: MockHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    /// Must be called inside a Tokio runtime.
    pub fn build(self) -> Harness {
        let provider = Arc::new(FakeProvider::new(&self.available));
        let host = Arc::new(HostRecorder::default());
        let history = self.history.unwrap_or_else(quiet_history);

        let core = CoreConfig::builder()
            .engine_provider(provider.clone())
            .history(Arc::new(history))
            .navigation(host.clone())
            .notifications(host.clone())
            .display_request(host.clone())
            .pointer(host.clone())
            .enable_background_audio(self.background_audio)
            .hide_pointer_during_playback(self.hide_pointer)
            .build()
            .expect("core config");

        let mut slot = None;
        let controller = PlaybackController::with_executor(&core, self.config, |state| {
            let executor = Arc::new(InlineExecutor::new(state));
            slot = Some(Arc::clone(&executor));
            executor
        })
        .expect("controller");
        let executor = slot.expect("executor created");
        let events = controller.subscribe();

        Harness {
            controller,
            executor,
            provider,
            host,
            events,
        }
    }
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            available: vec![
                EngineKind::Native,
                EngineKind::Platform,
                EngineKind::BackgroundNative,
            ],
            background_audio: false,
            hide_pointer: false,
            history: None,
            config: PlaybackConfig::default(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn native(&self) -> &NativeEngine {
        &self.provider.native
    }

    pub fn platform(&self) -> &PlatformElement {
        &self.provider.platform
    }

    pub fn background(&self) -> &BackgroundPlayer {
        &self.provider.background
    }

    pub fn engine_log(&self) -> &CallLog {
        &self.provider.log
    }
}

/// Let spawned fire-and-forget work (history writes) run.
pub async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
}
