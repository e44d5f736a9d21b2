//! Controller behaviour driven through fake engines on an inline executor.

mod common;

use bridge_traits::{BackgroundEvent, ElementState, EngineKind, NativeEvent, NativeTrackType, TrackDescription};
use common::{recording_history, settle, Harness, MockHistory};
use core_playback::{
    MediaDescriptor, MediaState, PlaybackError, PlaybackEvent, PlaybackState, PlayingType,
};
use std::sync::atomic::Ordering;
use std::time::Duration;

fn track(name: &str) -> MediaDescriptor {
    MediaDescriptor::track(format!("/music/{name}.mp3")).with_title(name)
}

// ============================================================================
// Media loading
// ============================================================================

#[tokio::test]
async fn set_media_track_starts_native_playback_from_zero() {
    let h = Harness::new();

    h.controller.set_media(track("intro"), false).await.unwrap();

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.engine, Some(EngineKind::Native));
    assert_eq!(snap.state, PlaybackState::Playing);
    assert_eq!(snap.playing_type, PlayingType::Music);
    assert_eq!(snap.clock.elapsed(), Duration::ZERO);
    assert!(snap.collection.cursor.is_none());

    assert_eq!(h.provider.created(), vec![EngineKind::Native]);
    let log = h.engine_log();
    assert!(log.position("native:open:/music/intro.mp3") < log.position("native:play"));
    assert_eq!(h.host.log.count("now_playing:intro"), 1);
    assert_eq!(h.host.log.count("display_active"), 1);
}

#[tokio::test]
async fn set_media_while_playing_tears_down_previous_engine_first() {
    let h = Harness::new();

    h.controller.set_media(track("one"), false).await.unwrap();
    h.engine_log().clear();
    h.controller.set_media(track("two"), false).await.unwrap();

    let log = h.engine_log();
    let detach = log.position("native:detach").expect("old engine detached");
    let stop = log.position("native:stop").expect("old engine stopped");
    let release = log.position("native:release").expect("old engine released");
    let attach = log.position("native:attach").expect("new engine attached");
    assert!(detach < stop && stop < release && release < attach);

    assert_eq!(log.max_live_sinks(), 1);
    assert_eq!(log.live_sinks(), 1);
    assert_eq!(h.controller.state().await.unwrap(), PlaybackState::Playing);
}

#[tokio::test]
async fn events_from_a_replaced_engine_are_ignored() {
    let h = Harness::new();

    h.controller.set_media(track("one"), false).await.unwrap();
    let stale = h.native().current_sink().expect("sink attached");
    h.controller.set_media(track("two"), false).await.unwrap();

    stale(NativeEvent::EndReached);
    stale(NativeEvent::LengthChanged(90_000));

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Playing);
    assert!(!snap.clock.is_total_known());
    assert_eq!(h.host.log.count("navigate_home"), 0);
}

#[tokio::test]
async fn empty_location_is_rejected_before_any_engine_swap() {
    let h = Harness::new();
    h.controller.set_media(track("keep"), false).await.unwrap();

    let err = h
        .controller
        .set_media(MediaDescriptor::video("  "), false)
        .await
        .unwrap_err();

    assert!(matches!(err, PlaybackError::InvalidArgument(_)));
    assert_eq!(h.provider.created().len(), 1);
    assert_eq!(h.controller.state().await.unwrap(), PlaybackState::Playing);
}

#[tokio::test]
async fn open_failure_resets_to_idle_and_notifies_once() {
    let h = Harness::new();
    h.native().fail_open.store(true, Ordering::SeqCst);
    let mut events = h.controller.subscribe();

    let err = h
        .controller
        .set_media(MediaDescriptor::video("/videos/broken.avi"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaybackError::EngineFailure(_)));

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Idle);
    assert_eq!(snap.media_state, MediaState::Error);
    assert_eq!(snap.engine, None);
    assert_eq!(h.engine_log().count("native:release"), 1);
    assert_eq!(h.engine_log().live_sinks(), 0);
    assert_eq!(h.host.log.count("toast:Can't play this media"), 1);

    let failures = events
        .drain()
        .into_iter()
        .filter(|e| matches!(e, PlaybackEvent::MediaFailed(_)))
        .count();
    assert_eq!(failures, 1);
}

#[tokio::test]
async fn engine_error_event_is_reported_once_per_load() {
    let h = Harness::new();
    h.controller
        .set_media(MediaDescriptor::video("/videos/a.mkv"), false)
        .await
        .unwrap();
    let sink = h.native().current_sink().expect("sink attached");

    sink(NativeEvent::EncounteredError);
    sink(NativeEvent::EncounteredError);

    assert_eq!(h.controller.state().await.unwrap(), PlaybackState::Idle);
    assert_eq!(h.host.log.count("toast:Can't play this media"), 1);
    assert_eq!(h.host.log.count("display_release"), 1);
}

#[tokio::test]
async fn unbound_platform_element_is_not_initialized() {
    let h = Harness::builder().engines(&[EngineKind::Platform]).build();
    h.platform().bound.store(false, Ordering::SeqCst);

    let err = h
        .controller
        .set_media(MediaDescriptor::video("/videos/a.mp4"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, PlaybackError::NotInitialized(_)));
    assert_eq!(h.controller.state().await.unwrap(), PlaybackState::Idle);
}

#[tokio::test]
async fn platform_is_used_when_native_is_missing() {
    let h = Harness::builder().engines(&[EngineKind::Platform]).build();

    h.controller
        .set_media(MediaDescriptor::stream("https://example.org/live.m3u8"), false)
        .await
        .unwrap();

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.engine, Some(EngineKind::Platform));
    assert_eq!(snap.playing_type, PlayingType::Video);
    assert!(snap.is_stream);

    // Track selection is a logged no-op on this engine.
    h.controller.set_audio_track(2).await.unwrap();
    let snap = h.controller.snapshot().await.unwrap();
    assert!(snap.current_audio_track.is_none());
    assert_eq!(snap.state, PlaybackState::Playing);
}

#[tokio::test]
async fn video_resumes_at_watched_time() {
    let h = Harness::new();
    let media = MediaDescriptor::video("/videos/film.mkv")
        .with_token("tok-film")
        .with_time_watched(Duration::from_secs(30));

    h.controller.set_media(media, false).await.unwrap();

    assert_eq!(h.engine_log().count("native:set_time:30000"), 1);
    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.clock.elapsed(), Duration::from_secs(30));
}

// ============================================================================
// Background audio selection
// ============================================================================

#[tokio::test]
async fn supported_track_goes_to_background_engine() {
    let h = Harness::builder().background_audio(true).build();

    h.controller.set_media(track("song"), false).await.unwrap();

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.engine, Some(EngineKind::BackgroundNative));
    assert_eq!(h.host.log.count("toast:Can't enable background audio"), 0);
}

#[tokio::test]
async fn unsupported_format_falls_back_with_toast() {
    let h = Harness::builder().background_audio(true).build();

    h.controller
        .set_media(MediaDescriptor::track("/music/song.flac"), false)
        .await
        .unwrap();

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.engine, Some(EngineKind::Native));
    assert_eq!(h.host.log.count("toast:Can't enable background audio"), 1);
}

#[tokio::test]
async fn forced_full_engine_skips_background() {
    let h = Harness::builder().background_audio(true).build();

    h.controller.set_media(track("song"), true).await.unwrap();

    assert_eq!(h.provider.created(), vec![EngineKind::Native]);
}

#[tokio::test]
async fn background_query_failures_are_swallowed() {
    let h = Harness::builder().background_audio(true).build();
    h.controller.set_media(track("song"), false).await.unwrap();
    h.background().fail_queries.store(true, Ordering::SeqCst);

    h.controller.set_time(Duration::from_secs(5)).await.unwrap();
    h.controller.set_volume(40).await.unwrap();

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Playing);
    assert_eq!(snap.volume, 40);
}

#[tokio::test]
async fn background_pause_event_updates_state() {
    let h = Harness::builder().background_audio(true).build();
    h.controller.set_media(track("song"), false).await.unwrap();

    h.background()
        .emit(BackgroundEvent::StateChanged(ElementState::Paused));

    assert_eq!(h.controller.state().await.unwrap(), PlaybackState::Paused);
}

// ============================================================================
// Transport, volume and rate
// ============================================================================

#[tokio::test]
async fn transport_without_media_is_not_initialized() {
    let h = Harness::new();

    let err = h.controller.play().await.unwrap_err();
    assert!(matches!(err, PlaybackError::NotInitialized(_)));
    assert!(h.controller.seek(0.5).await.is_err());
}

#[tokio::test]
async fn pause_toggles_and_releases_resources() {
    let h = Harness::builder().hide_pointer(true).build();
    h.controller.set_media(track("a"), false).await.unwrap();

    h.controller.pause().await.unwrap();
    assert_eq!(h.controller.state().await.unwrap(), PlaybackState::Paused);
    assert_eq!(h.host.log.count("display_release"), 1);
    assert_eq!(h.host.log.count("pointer_restore"), 1);

    h.controller.pause().await.unwrap();
    assert_eq!(h.controller.state().await.unwrap(), PlaybackState::Playing);
    assert_eq!(h.host.log.count("display_active"), 2);
    assert_eq!(h.host.log.count("pointer_hide"), 2);
}

#[tokio::test]
async fn pointer_is_left_alone_unless_enabled() {
    let h = Harness::new();
    h.controller.set_media(track("a"), false).await.unwrap();
    h.controller.stop().await.unwrap();

    assert_eq!(h.host.log.count("pointer_hide"), 0);
    assert_eq!(h.host.log.count("pointer_restore"), 0);
}

#[tokio::test]
async fn stop_zeroes_clock() {
    let h = Harness::new();
    h.controller.set_media(track("a"), false).await.unwrap();
    h.controller.set_time(Duration::from_secs(12)).await.unwrap();

    h.controller.stop().await.unwrap();

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Stopped);
    assert_eq!(snap.clock.elapsed(), Duration::ZERO);
    assert_eq!(h.host.log.count("display_release"), 1);
}

#[tokio::test]
async fn pause_after_stop_leaves_engine_stopped() {
    let h = Harness::builder().engines(&[EngineKind::Platform]).build();
    h.controller
        .set_media(MediaDescriptor::video("/videos/a.mkv"), false)
        .await
        .unwrap();
    h.controller.stop().await.unwrap();
    let plays = h.engine_log().count("platform:play");

    h.controller.pause().await.unwrap();

    assert_eq!(h.controller.state().await.unwrap(), PlaybackState::Stopped);
    assert_eq!(*h.platform().state.lock(), ElementState::Stopped);
    assert_eq!(h.engine_log().count("platform:play"), plays);
    assert_eq!(h.host.log.count("display_active"), 1);
    assert_eq!(h.host.log.count("display_release"), 1);
}

#[tokio::test]
async fn end_reached_while_paused_is_ignored() {
    let h = Harness::new();
    h.controller
        .set_media(MediaDescriptor::video("/videos/a.mkv"), false)
        .await
        .unwrap();
    h.controller.pause().await.unwrap();

    h.native().emit(NativeEvent::EndReached);

    assert_eq!(h.controller.state().await.unwrap(), PlaybackState::Paused);
    assert_eq!(h.host.log.count("go_back"), 0);
    assert_eq!(h.host.log.count("navigate_to_library"), 0);
}

#[tokio::test]
async fn seek_and_set_time_clamp_to_length() {
    let h = Harness::new();
    h.controller
        .set_media(MediaDescriptor::video("/videos/a.mkv"), false)
        .await
        .unwrap();
    h.native().length_ms.store(100_000, Ordering::SeqCst);
    h.native().emit(NativeEvent::LengthChanged(100_000));

    h.controller.seek(1.7).await.unwrap();
    assert_eq!(h.engine_log().count("native:set_position:1"), 1);
    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.clock.elapsed(), Duration::from_secs(100));

    h.controller.set_time(Duration::from_secs(500)).await.unwrap();
    assert_eq!(h.engine_log().count("native:set_time:100000"), 1);

    h.controller.seek(f32::NAN).await.unwrap();
    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.clock.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn skip_moves_by_configured_step() {
    let h = Harness::new();
    h.controller
        .set_media(MediaDescriptor::video("/videos/a.mkv"), false)
        .await
        .unwrap();

    h.controller.skip_ahead().await.unwrap();
    h.controller.skip_ahead().await.unwrap();
    h.controller.skip_back().await.unwrap();
    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.clock.elapsed(), Duration::from_secs(10));

    h.controller.skip_back().await.unwrap();
    h.controller.skip_back().await.unwrap();
    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.clock.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn zero_volume_is_ignored() {
    let h = Harness::new();
    h.controller.set_media(track("a"), false).await.unwrap();
    h.controller.set_volume(60).await.unwrap();

    h.controller.set_volume(0).await.unwrap();
    h.controller.set_volume(-5).await.unwrap();

    assert_eq!(h.controller.snapshot().await.unwrap().volume, 60);
    assert_eq!(h.native().volume.load(Ordering::SeqCst), 60);
}

#[tokio::test]
async fn volume_carries_over_to_next_engine() {
    let h = Harness::new();
    h.controller.set_volume(250).await.unwrap();
    assert_eq!(h.controller.snapshot().await.unwrap().volume, 100);

    h.controller.set_volume(35).await.unwrap();
    h.controller.set_media(track("a"), false).await.unwrap();

    assert_eq!(h.native().volume.load(Ordering::SeqCst), 35);
}

#[tokio::test]
async fn rate_near_normal_snaps_to_one() {
    let h = Harness::new();
    h.controller.set_media(track("a"), false).await.unwrap();

    for requested in 96..105 {
        h.controller.set_rate(requested).await.unwrap();
        assert_eq!(h.controller.snapshot().await.unwrap().rate, 100);
        assert_eq!(h.native().rate(), 1.0);
    }

    h.controller.set_rate(150).await.unwrap();
    assert_eq!(h.native().rate(), 1.5);
    h.controller.set_rate(10_000).await.unwrap();
    assert_eq!(h.controller.snapshot().await.unwrap().rate, 400);
}

#[tokio::test]
async fn rate_is_ignored_by_background_engine() {
    let h = Harness::builder().background_audio(true).build();
    h.controller.set_media(track("a"), false).await.unwrap();

    h.controller.set_rate(150).await.unwrap();

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.engine, Some(EngineKind::BackgroundNative));
    assert_eq!(snap.state, PlaybackState::Playing);
}

// ============================================================================
// Engine events
// ============================================================================

#[tokio::test]
async fn time_and_length_events_update_the_clock() {
    let h = Harness::new();
    h.controller
        .set_media(MediaDescriptor::video("/videos/a.mkv"), false)
        .await
        .unwrap();

    h.native().emit(NativeEvent::LengthChanged(120_000));
    h.native().emit(NativeEvent::TimeChanged(30_000));

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.clock.total(), Duration::from_secs(120));
    assert_eq!(snap.clock.elapsed(), Duration::from_secs(30));
    assert!((snap.clock.position() - 0.25).abs() < f32::EPSILON);
}

#[tokio::test]
async fn engine_stop_event_discards_the_engine() {
    let h = Harness::new();
    h.controller.set_media(track("a"), false).await.unwrap();

    h.native().emit(NativeEvent::Stopped);

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Stopped);
    assert_eq!(snap.engine, None);
    assert_eq!(h.engine_log().live_sinks(), 0);
    assert!(matches!(
        h.controller.play().await,
        Err(PlaybackError::NotInitialized(_))
    ));
}

#[tokio::test]
async fn first_real_track_is_auto_selected() {
    let h = Harness::new();
    *h.native().audio_tracks.lock() = vec![
        TrackDescription::new(-1, "Disable"),
        TrackDescription::new(3, "English"),
        TrackDescription::new(4, "French"),
    ];
    h.controller
        .set_media(MediaDescriptor::video("/videos/a.mkv"), false)
        .await
        .unwrap();

    h.native().emit(NativeEvent::TrackAdded {
        kind: NativeTrackType::Audio,
        id: 3,
    });
    h.native().emit(NativeEvent::TrackAdded {
        kind: NativeTrackType::Video,
        id: 0,
    });

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.audio_tracks.len(), 3);
    assert_eq!(snap.current_audio_track.map(|t| t.id), Some(3));
    assert_eq!(h.engine_log().count("native:audio_track:3"), 1);

    h.controller.set_audio_track(4).await.unwrap();
    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.current_audio_track.map(|t| t.name), Some("French".to_string()));

    // Lists are cleared once playback stops.
    h.controller.stop().await.unwrap();
    assert!(h.controller.snapshot().await.unwrap().audio_tracks.is_empty());
}

#[tokio::test]
async fn subtitle_files_reach_the_native_engine() {
    let h = Harness::new();
    h.controller
        .set_media(MediaDescriptor::video("/videos/a.mkv"), false)
        .await
        .unwrap();

    h.controller.open_subtitle("/subs/a.srt").await.unwrap();
    assert_eq!(h.engine_log().count("native:subtitle_file:/subs/a.srt"), 1);

    let err = h.controller.open_subtitle("").await.unwrap_err();
    assert!(err.is_caller_error());
}

// ============================================================================
// End of media
// ============================================================================

#[tokio::test]
async fn music_end_without_next_finishes_the_playlist() {
    let h = Harness::new();
    let mut events = h.controller.subscribe();
    h.controller
        .set_playlist(vec![track("only")], 0)
        .await
        .unwrap();

    h.native().emit(NativeEvent::EndReached);

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Stopped);
    assert!(!snap.collection.is_running);
    assert_eq!(snap.playing_type, PlayingType::NotPlaying);
    assert_eq!(h.host.log.count("navigate_home"), 1);
    assert_eq!(h.host.log.count("clear_tiles"), 1);

    let events = events.drain();
    assert!(events.contains(&PlaybackEvent::PlaylistFinished));
    assert!(!events.contains(&PlaybackEvent::StateChanged(PlaybackState::EndReached)));
}

#[tokio::test]
async fn music_end_advances_to_next_track() {
    let h = Harness::new();
    h.controller
        .set_playlist(vec![track("a"), track("b")], 0)
        .await
        .unwrap();

    h.native().emit(NativeEvent::EndReached);

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Playing);
    assert_eq!(snap.collection.cursor, Some(1));
    assert_eq!(h.engine_log().count("native:open:/music/b.mp3"), 1);
    assert_eq!(h.host.log.count("navigate_home"), 0);
}

#[tokio::test]
async fn video_end_rewinds_and_leaves_the_player() {
    let (history, writes) = recording_history();
    let h = Harness::builder().history(history).build();
    h.controller
        .set_playlist(
            vec![
                MediaDescriptor::video("/videos/a.mkv")
                    .with_token("tok-a")
                    .with_time_watched(Duration::from_secs(40)),
                MediaDescriptor::video("/videos/b.mkv"),
            ],
            0,
        )
        .await
        .unwrap();

    h.native().emit(NativeEvent::EndReached);
    settle().await;

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Stopped);
    assert_eq!(
        snap.media.map(|m| m.time_watched),
        Some(Duration::ZERO)
    );
    assert_eq!(h.host.log.count("navigate_to_library"), 1);
    assert_eq!(h.host.log.count("go_back"), 0);
    assert_eq!(h.provider.created().len(), 1);
    assert!(writes
        .lock()
        .contains(&("tok-a".to_string(), Duration::ZERO)));
}

#[tokio::test]
async fn video_end_goes_back_when_possible() {
    let h = Harness::new();
    h.host.can_go_back.store(true, Ordering::SeqCst);
    h.controller
        .set_media(MediaDescriptor::video("/videos/a.mkv"), false)
        .await
        .unwrap();

    h.native().emit(NativeEvent::EndReached);

    assert_eq!(h.host.log.count("go_back"), 1);
    assert_eq!(h.host.log.count("navigate_to_library"), 0);
}

// ============================================================================
// Playlist
// ============================================================================

#[tokio::test]
async fn play_next_at_end_only_clears_tiles() {
    let h = Harness::new();
    h.controller
        .set_playlist(vec![track("a"), track("b")], 1)
        .await
        .unwrap();

    h.controller.play_next().await.unwrap();

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.collection.cursor, Some(1));
    assert_eq!(h.provider.created().len(), 1);
    assert_eq!(h.host.log.count("clear_tiles"), 1);
}

#[tokio::test]
async fn play_previous_loads_earlier_item() {
    let h = Harness::new();
    h.controller
        .set_playlist(vec![track("a"), track("b")], 1)
        .await
        .unwrap();

    h.controller.play_previous().await.unwrap();
    assert_eq!(h.engine_log().count("native:open:/music/a.mp3"), 1);

    h.controller.play_previous().await.unwrap();
    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.collection.cursor, Some(0));
    assert_eq!(h.provider.created().len(), 2);
}

#[tokio::test]
async fn playlist_start_out_of_range_is_rejected() {
    let h = Harness::new();

    let err = h
        .controller
        .set_playlist(vec![track("a")], 3)
        .await
        .unwrap_err();

    assert!(matches!(err, PlaybackError::InvalidArgument(_)));
    assert!(h.provider.created().is_empty());
}

#[tokio::test]
async fn clean_resets_everything() {
    let h = Harness::new();
    h.controller
        .set_playlist(vec![track("a"), track("b")], 0)
        .await
        .unwrap();

    h.controller.clean().await.unwrap();

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Stopped);
    assert_eq!(snap.playing_type, PlayingType::NotPlaying);
    assert_eq!(snap.engine, None);
    assert!(snap.media.is_none());
    assert_eq!(snap.collection.len, 0);
    assert!(!snap.collection.is_running);
}

// ============================================================================
// History
// ============================================================================

#[tokio::test]
async fn update_position_writes_elapsed_time() {
    let (history, writes) = recording_history();
    let h = Harness::builder().history(history).build();
    h.controller
        .set_media(
            MediaDescriptor::video("/videos/a.mkv").with_token("tok-a"),
            false,
        )
        .await
        .unwrap();
    h.controller.set_time(Duration::from_secs(42)).await.unwrap();

    h.controller.update_position().await.unwrap();

    assert_eq!(
        writes.lock().last(),
        Some(&("tok-a".to_string(), Duration::from_secs(42)))
    );
    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(
        snap.media.map(|m| m.time_watched),
        Some(Duration::from_secs(42))
    );
}

#[tokio::test]
async fn resume_last_opens_most_recent_entry() {
    let mut history = MockHistory::new();
    history
        .expect_token_at_position()
        .withf(|index| *index == 0)
        .times(1)
        .returning(|_| Ok(Some("tok-recent".to_string())));
    history.expect_update_media_history().returning(|_, _| Ok(()));
    let h = Harness::builder().history(history).build();

    assert!(h.controller.resume_last().await.unwrap());

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.playing_type, PlayingType::Video);
    assert_eq!(
        snap.media.and_then(|m| m.token),
        Some("tok-recent".to_string())
    );
}

#[tokio::test]
async fn resume_last_with_empty_history_does_nothing() {
    let h = Harness::new();

    assert!(!h.controller.resume_last().await.unwrap());
    assert!(h.provider.created().is_empty());
}

// ============================================================================
// Disposal
// ============================================================================

#[tokio::test]
async fn dispose_twice_releases_once() {
    let h = Harness::new();
    h.controller.set_media(track("a"), false).await.unwrap();

    h.controller.dispose().await;
    h.controller.dispose().await;

    let log = h.engine_log();
    assert_eq!(log.count("native:detach"), 1);
    assert_eq!(log.count("native:release"), 1);
    assert_eq!(log.live_sinks(), 0);
    assert_eq!(h.host.log.count("display_release"), 1);

    let snap = h.controller.snapshot().await.unwrap();
    assert_eq!(snap.state, PlaybackState::Stopped);
    assert!(matches!(
        h.controller.set_media(track("b"), false).await,
        Err(PlaybackError::NotInitialized(_))
    ));
}

#[tokio::test]
async fn dropping_the_controller_releases_the_engine() {
    let h = Harness::new();
    h.controller.set_media(track("a"), false).await.unwrap();
    let provider = h.provider.clone();
    let host = h.host.clone();

    drop(h);

    assert_eq!(provider.log.count("native:release"), 1);
    assert_eq!(provider.log.live_sinks(), 0);
    assert_eq!(host.log.count("display_release"), 1);
}
