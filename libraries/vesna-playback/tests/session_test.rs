//! Playback session integration tests
//!
//! Drives a session against the recording backend and checks both the
//! session state and the exact backend traffic.

use std::time::Duration;
use vesna_core::testing::{BackendCall, RecordingBackend};
use vesna_core::{BackendError, TrackRef};
use vesna_playback::{PlaybackError, PlaybackSession, PlaybackState, SessionHandle, TrackList};

// ============================================================================
// TEST UTILITIES
// ============================================================================

fn stations(n: usize) -> TrackList {
    (0..n)
        .map(|i| TrackRef::new(format!("http://radio.example/{}.mp3", i)))
        .collect()
}

fn create_session(tracks: TrackList) -> (PlaybackSession, RecordingBackend) {
    let backend = RecordingBackend::new();
    let session = PlaybackSession::new(backend.boxed(), tracks, 60);
    (session, backend)
}

// ============================================================================
// NAVIGATION
// ============================================================================

#[test]
fn empty_list_never_touches_backend() {
    let (mut session, backend) = create_session(TrackList::new());

    assert_eq!(session.play(None), Err(PlaybackError::EmptyPlaylist));
    assert_eq!(session.next(), Err(PlaybackError::EmptyPlaylist));
    assert_eq!(session.previous(), Err(PlaybackError::EmptyPlaylist));
    assert_eq!(session.current_index(), None);
    assert!(backend.calls().is_empty());
}

#[test]
fn seven_switches_return_to_first_station() {
    let (mut session, backend) = create_session(stations(7));
    session.play(None).unwrap();

    for _ in 0..7 {
        session.next().unwrap();
    }

    assert_eq!(session.current_index(), Some(0));
    assert_eq!(backend.played().len(), 8);
    assert_eq!(backend.played().first(), backend.played().last());
}

#[test]
fn previous_wraps_to_last() {
    let (mut session, _backend) = create_session(stations(3));
    session.play(Some(0)).unwrap();

    let track = session.previous().unwrap();
    assert_eq!(track.uri(), "http://radio.example/2.mp3");
    assert_eq!(session.current_index(), Some(2));
}

#[test]
fn next_from_nothing_selected_starts_at_first() {
    let (mut session, _backend) = create_session(stations(3));
    let track = session.next().unwrap();
    assert_eq!(track.uri(), "http://radio.example/0.mp3");
}

#[test]
fn failed_play_keeps_previous_state() {
    let (mut session, backend) = create_session(stations(2));
    backend.fail_plays_with(BackendError::Open {
        uri: "http://radio.example/0.mp3".to_string(),
        reason: "connection refused".to_string(),
    });

    let result = session.play(None);
    assert!(matches!(result, Err(PlaybackError::Backend(BackendError::Open { .. }))));
    assert_eq!(session.state(), PlaybackState::Stopped);
    assert_eq!(session.current_index(), None);
}

// ============================================================================
// PAUSE / STOP
// ============================================================================

#[test]
fn pause_resume_stop_sequence() {
    let (mut session, backend) = create_session(stations(2));

    session.play(Some(1)).unwrap();
    assert_eq!(session.pause().unwrap(), PlaybackState::Paused);
    assert_eq!(session.pause().unwrap(), PlaybackState::Playing);
    session.stop().unwrap();
    assert_eq!(session.stop(), Err(PlaybackError::AlreadyStopped));
    assert_eq!(session.pause(), Err(PlaybackError::NoActiveTrack));

    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::SetVolume(60),
            BackendCall::Play("http://radio.example/1.mp3".to_string()),
            BackendCall::Pause,
            BackendCall::Resume,
            BackendCall::Stop,
        ]
    );
}

#[test]
fn stop_while_paused() {
    let (mut session, _backend) = create_session(stations(1));
    session.play(None).unwrap();
    session.pause().unwrap();

    session.stop().unwrap();
    assert_eq!(session.state(), PlaybackState::Stopped);
}

// ============================================================================
// VOLUME
// ============================================================================

#[test]
fn volume_commands_reach_backend() {
    let (mut session, backend) = create_session(stations(1));

    assert_eq!(session.volume_delta(-15).unwrap(), 45);
    assert_eq!(session.set_volume(100).unwrap(), 100);
    assert_eq!(session.volume_delta(35).unwrap(), 100);
    assert_eq!(session.set_volume(250), Err(PlaybackError::InvalidVolume(250)));

    assert_eq!(backend.volumes(), vec![45, 100, 100]);
    assert_eq!(session.volume(), 100);
}

// ============================================================================
// BACKEND EVENTS
// ============================================================================

#[tokio::test(start_paused = true)]
async fn track_end_auto_advances() {
    let backend = RecordingBackend::new();
    let session = PlaybackSession::new(backend.boxed(), stations(2), 60);
    let handle = SessionHandle::new(session);
    handle.watch_track_end(tokio::runtime::Handle::current());

    handle.lock().play(Some(1)).unwrap();
    assert!(backend.finish_track());
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(handle.lock().current_index(), Some(0));
    assert_eq!(
        backend.played(),
        vec!["http://radio.example/1.mp3", "http://radio.example/0.mp3"]
    );
}

#[tokio::test(start_paused = true)]
async fn track_end_after_stop_is_ignored() {
    let backend = RecordingBackend::new();
    let session = PlaybackSession::new(backend.boxed(), stations(2), 60);
    let handle = SessionHandle::new(session);
    handle.watch_track_end(tokio::runtime::Handle::current());

    handle.lock().play(Some(0)).unwrap();
    handle.lock().stop().unwrap();
    backend.finish_track();
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(handle.lock().state(), PlaybackState::Stopped);
    assert_eq!(backend.played().len(), 1);
}
