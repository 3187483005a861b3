//! Integration tests for session state driving the visualizer regime.

mod fixtures;

use fixtures::{bass_spectrum, seeded_config};
use spherebeat::audio::StaticSpectrum;
use spherebeat::{Regime, SessionEvent, SessionState, SpectrumSource, TrackEntry, Visualizer};

fn playlist(n: usize) -> Vec<TrackEntry> {
    (0..n)
        .map(|i| TrackEntry::new(format!("blob:{}", i), format!("Track {}", i + 1)))
        .collect()
}

/// One frame the way the outer shell wires it: live audio feeds the analyser,
/// anything else runs idle.
fn frame(
    vis: &mut Visualizer,
    session: &SessionState,
    t: f32,
    spectrum: &mut StaticSpectrum,
) -> Regime {
    let source = if session.is_live() {
        Some(spectrum as &mut dyn SpectrumSource)
    } else {
        None
    };
    vis.tick(t, source).regime
}

#[test]
fn test_upload_starts_first_track() {
    let state = SessionState::new().apply(SessionEvent::TracksAdded {
        tracks: playlist(3),
    });
    assert!(state.initialized);
    assert_eq!(state.current, Some(0));
    assert!(state.is_live());
    assert_eq!(state.current_track().unwrap().name, "Track 1");
}

#[test]
fn test_second_upload_keeps_current_track() {
    let state = SessionState::new()
        .apply(SessionEvent::TracksAdded {
            tracks: playlist(2),
        })
        .apply(SessionEvent::Next)
        .apply(SessionEvent::TracksAdded {
            tracks: playlist(2),
        });
    assert_eq!(state.tracks.len(), 4);
    assert_eq!(state.current, Some(1));
}

#[test]
fn test_empty_upload_is_ignored() {
    let state = SessionState::new().apply(SessionEvent::TracksAdded { tracks: vec![] });
    assert_eq!(state, SessionState::new());
}

#[test]
fn test_next_and_previous_wrap() {
    let state = SessionState::new().apply(SessionEvent::TracksAdded {
        tracks: playlist(3),
    });

    let back = state.apply(SessionEvent::Previous);
    assert_eq!(back.current, Some(2));

    let forward = back.apply(SessionEvent::Next);
    assert_eq!(forward.current, Some(0));
}

#[test]
fn test_ended_advances_and_resets_transport() {
    let state = SessionState::new()
        .apply(SessionEvent::TracksAdded {
            tracks: playlist(2),
        })
        .apply(SessionEvent::MetadataLoaded { duration: 120.0 })
        .apply(SessionEvent::TimeUpdate { time: 119.5 })
        .apply(SessionEvent::Ended);

    assert_eq!(state.current, Some(1));
    assert!(state.transport.is_playing);
    assert_eq!(state.transport.current_time, 0.0);
    assert_eq!(state.transport.duration, 0.0);
}

#[test]
fn test_toggle_without_tracks_stays_idle() {
    let state = SessionState::new().apply(SessionEvent::TogglePlay);
    assert!(!state.transport.is_playing);
    assert!(!state.is_live());
}

#[test]
fn test_seek_clamps_to_duration() {
    let state = SessionState::new()
        .apply(SessionEvent::TracksAdded {
            tracks: playlist(1),
        })
        .apply(SessionEvent::MetadataLoaded { duration: 30.0 });

    assert_eq!(
        state.apply(SessionEvent::Seek { time: 45.0 }).transport.current_time,
        30.0
    );
    assert_eq!(
        state.apply(SessionEvent::Seek { time: -3.0 }).transport.current_time,
        0.0
    );
}

#[test]
fn test_volume_clamped() {
    let state = SessionState::new();
    assert_eq!(
        state.apply(SessionEvent::SetVolume { volume: 1.7 }).transport.volume,
        1.0
    );
    assert_eq!(
        state.apply(SessionEvent::SetVolume { volume: f32::NAN }).transport.volume,
        state.transport.volume
    );
}

#[test]
fn test_playback_failure_drops_to_idle() {
    let mut vis = Visualizer::mount(seeded_config(200)).unwrap();
    let mut spectrum = StaticSpectrum::new(bass_spectrum(128, 20, 255));

    let mut session = SessionState::new().apply(SessionEvent::TracksAdded {
        tracks: playlist(1),
    });
    assert_eq!(
        frame(&mut vis, &session, 0.0, &mut spectrum),
        Regime::Active { bass: 1.0 }
    );

    session = session.apply(SessionEvent::PlaybackFailed);
    assert_eq!(frame(&mut vis, &session, 0.1, &mut spectrum), Regime::Idle);
    assert_eq!(vis.field().positions(), vis.field().original_positions());
}

#[test]
fn test_pause_and_resume_switch_regime() {
    let mut vis = Visualizer::mount(seeded_config(200)).unwrap();
    let mut spectrum = StaticSpectrum::new(bass_spectrum(128, 20, 128));

    let session = SessionState::new();
    assert_eq!(frame(&mut vis, &session, 0.0, &mut spectrum), Regime::Idle);

    let playing = session.apply(SessionEvent::TracksAdded {
        tracks: playlist(2),
    });
    assert!(frame(&mut vis, &playing, 0.1, &mut spectrum).is_active());

    let paused = playing.apply(SessionEvent::TogglePlay);
    assert_eq!(frame(&mut vis, &paused, 0.2, &mut spectrum), Regime::Idle);

    let resumed = paused.apply(SessionEvent::TogglePlay);
    assert!(frame(&mut vis, &resumed, 0.3, &mut spectrum).is_active());
}

#[test]
fn test_event_log_replays_from_json() {
    let events = r#"[
        {"type":"tracks_added","tracks":[{"id":"a","name":"Intro"},{"id":"b","name":"Drop"}]},
        {"type":"metadata_loaded","duration":200.0},
        {"type":"time_update","time":12.5},
        {"type":"next"},
        {"type":"toggle_play"},
        {"type":"set_volume","volume":0.3}
    ]"#;
    let events: Vec<SessionEvent> = serde_json::from_str(events).unwrap();
    let state = events
        .into_iter()
        .fold(SessionState::new(), |state, event| state.apply(event));

    assert_eq!(state.current_track().unwrap().name, "Drop");
    assert!(!state.transport.is_playing);
    assert_eq!(state.transport.current_time, 0.0);
    assert!((state.transport.volume - 0.3).abs() < 1e-6);
}
