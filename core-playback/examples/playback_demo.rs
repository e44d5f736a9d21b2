//! # Playback Controller Demo
//!
//! Drives the controller against a simulated native engine and the desktop
//! host services, with structured logging on.
//!
//! Run with: `cargo run --example playback_demo --package core-playback -- [pretty|json|compact]`

use bridge_desktop::{DesktopDisplayRequest, InMemoryHistory, LoggingNavigator, LoggingNotifier};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    ConsoleLogger, EngineKind, EngineProvider, EventSink, LogLevel, NativeBackend, NativeEvent,
    NativeTrackType, TrackDescription,
};
use core_playback::{MediaDescriptor, PlaybackConfig, PlaybackController, PlaybackEvent};
use core_runtime::config::CoreConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use parking_lot::Mutex;
use std::env;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// ============================================================================
// Simulated native engine
// ============================================================================

/// Advances its clock by wall time and reports the end after `length_ms`.
#[derive(Default)]
struct SimulatedEngine {
    sink: Mutex<Option<EventSink<NativeEvent>>>,
    time_ms: Arc<AtomicI64>,
}

impl SimulatedEngine {
    const LENGTH_MS: i64 = 3_000;

    fn emit(&self, event: NativeEvent) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }
}

impl NativeBackend for SimulatedEngine {
    fn open(&self, location: &str) -> BridgeResult<()> {
        info!(location, "engine: open");
        self.time_ms.store(0, Ordering::SeqCst);
        self.emit(NativeEvent::Opening);
        self.emit(NativeEvent::LengthChanged(Self::LENGTH_MS));
        Ok(())
    }

    fn play(&self) -> BridgeResult<()> {
        self.emit(NativeEvent::Playing);
        self.emit(NativeEvent::TrackAdded {
            kind: NativeTrackType::Audio,
            id: 1,
        });

        let sink = self.sink.lock().clone();
        let time = Arc::clone(&self.time_ms);
        std::thread::spawn(move || {
            while time.load(Ordering::SeqCst) < Self::LENGTH_MS {
                std::thread::sleep(Duration::from_millis(250));
                let now = time.fetch_add(250, Ordering::SeqCst) + 250;
                if let Some(sink) = &sink {
                    sink(NativeEvent::TimeChanged(now));
                }
            }
            if let Some(sink) = &sink {
                sink(NativeEvent::EndReached);
            }
        });
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        Ok(())
    }

    fn stop(&self) -> BridgeResult<()> {
        self.time_ms.store(Self::LENGTH_MS, Ordering::SeqCst);
        Ok(())
    }

    fn time(&self) -> i64 {
        self.time_ms.load(Ordering::SeqCst)
    }

    fn set_time(&self, ms: i64) {
        self.time_ms.store(ms, Ordering::SeqCst);
    }

    fn position(&self) -> f32 {
        self.time() as f32 / Self::LENGTH_MS as f32
    }

    fn set_position(&self, position: f32) {
        self.set_time((Self::LENGTH_MS as f32 * position) as i64);
    }

    fn length(&self) -> i64 {
        Self::LENGTH_MS
    }

    fn volume(&self) -> i32 {
        100
    }

    fn set_volume(&self, volume: i32) {
        info!(volume, "engine: volume");
    }

    fn set_rate(&self, rate: f32) {
        info!(rate, "engine: rate");
    }

    fn audio_tracks(&self) -> Vec<TrackDescription> {
        vec![
            TrackDescription::new(-1, "Disable"),
            TrackDescription::new(1, "Stereo"),
        ]
    }

    fn subtitles(&self) -> Vec<TrackDescription> {
        Vec::new()
    }

    fn set_audio_track(&self, id: i32) {
        info!(id, "engine: audio track");
    }

    fn set_subtitle(&self, _id: i32) {}

    fn add_subtitle_file(&self, _uri: &str) -> BridgeResult<()> {
        Ok(())
    }

    fn attach(&self, sink: EventSink<NativeEvent>) {
        *self.sink.lock() = Some(sink);
    }

    fn detach(&self) {
        *self.sink.lock() = None;
    }

    fn release(&self) {
        info!("engine: release");
    }
}

struct SimulatedProvider;

impl EngineProvider for SimulatedProvider {
    fn is_available(&self, kind: EngineKind) -> bool {
        kind == EngineKind::Native
    }

    fn create_native(&self) -> BridgeResult<Box<dyn NativeBackend>> {
        Ok(Box::new(SimulatedEngine::default()))
    }
}

// ============================================================================
// Demo
// ============================================================================

#[tokio::main]
async fn main() -> core_playback::Result<()> {
    let format = match env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };
    let core = CoreConfig::builder()
        .engine_provider(Arc::new(SimulatedProvider))
        .history(Arc::new(InMemoryHistory::new()))
        .navigation(Arc::new(LoggingNavigator::new()))
        .notifications(Arc::new(LoggingNotifier::new()))
        .display_request(Arc::new(DesktopDisplayRequest::new()))
        .logger_sink(Arc::new(ConsoleLogger::default()))
        .build()
        .map_err(|e| core_playback::PlaybackError::Config(e.to_string()))?;

    if let Err(e) = init_logging(
        LoggingConfig::for_core(&core)
            .with_format(format)
            .with_level(LogLevel::Debug),
    ) {
        eprintln!("logging unavailable: {e}");
    }

    let controller = PlaybackController::new(&core, PlaybackConfig::default())?;
    let mut events = controller
        .subscribe()
        .filter(|e| !matches!(e, PlaybackEvent::ClockChanged(_)));

    controller
        .set_playlist(
            vec![
                MediaDescriptor::track("/music/first.mp3").with_title("First"),
                MediaDescriptor::track("/music/second.mp3").with_title("Second"),
            ],
            0,
        )
        .await?;
    controller.set_volume(70).await?;
    controller.set_rate(98).await?;

    while let Ok(event) = events.recv().await {
        info!(?event, "event");
        if event == PlaybackEvent::PlaylistFinished {
            break;
        }
    }

    let snapshot = controller.snapshot().await?;
    info!(state = %snapshot.state, running = snapshot.collection.is_running, "Demo finished");
    controller.dispose().await;
    Ok(())
}
