//! Property-based tests for the playback session
//!
//! Uses proptest to verify list and volume invariants across many random
//! inputs.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use vesna_core::testing::RecordingBackend;
use vesna_core::TrackRef;
use vesna_playback::{PlaybackSession, ShuffleIndexer, TrackList};

// ===== Helpers =====

fn arbitrary_tracks() -> impl Strategy<Value = TrackList> {
    prop::collection::hash_set("[a-z0-9]{1,12}", 1..40).prop_map(|names| {
        names
            .into_iter()
            .map(|name| TrackRef::new(format!("/music/{}.mp3", name)))
            .collect()
    })
}

fn create_session(tracks: TrackList, volume: u8) -> (PlaybackSession, RecordingBackend) {
    let backend = RecordingBackend::new();
    let session = PlaybackSession::new(backend.boxed(), tracks, volume);
    (session, backend)
}

// ===== Property Tests =====

proptest! {
    /// Property: n skips forward on an n-track list return to the start
    #[test]
    fn next_wraps_back_to_start(tracks in arbitrary_tracks(), start in 0usize..40) {
        let len = tracks.len();
        let start = start % len;
        let (mut session, _backend) = create_session(tracks, 50);

        session.play(Some(start)).unwrap();
        for _ in 0..len {
            session.next().unwrap();
        }
        prop_assert_eq!(session.current_index(), Some(start));
    }

    /// Property: n skips back on an n-track list return to the start
    #[test]
    fn previous_wraps_back_to_start(tracks in arbitrary_tracks(), start in 0usize..40) {
        let len = tracks.len();
        let start = start % len;
        let (mut session, _backend) = create_session(tracks, 50);

        session.play(Some(start)).unwrap();
        for _ in 0..len {
            session.previous().unwrap();
        }
        prop_assert_eq!(session.current_index(), Some(start));
    }

    /// Property: Shuffle then unshuffle keeps the track set and the playing track
    #[test]
    fn shuffle_roundtrip_keeps_identity(
        tracks in arbitrary_tracks(),
        start in 0usize..40,
        seed in any::<u64>()
    ) {
        let start = start % tracks.len();
        let original: HashSet<TrackRef> = tracks.iter().cloned().collect();
        let (mut session, _backend) = create_session(tracks, 50);
        let playing = session.play(Some(start)).unwrap();

        session.shuffle_with(&mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(session.current_track(), Some(&playing));
        let shuffled: HashSet<TrackRef> = session.tracks().iter().cloned().collect();
        prop_assert_eq!(&shuffled, &original);

        session.unshuffle();
        prop_assert_eq!(session.current_track(), Some(&playing));
        prop_assert_eq!(session.current_index(), Some(start));
        let restored: HashSet<TrackRef> = session.tracks().iter().cloned().collect();
        prop_assert_eq!(&restored, &original);
    }

    /// Property: Shuffle mapping is always a bijection
    #[test]
    fn shuffle_mapping_is_bijection(tracks in arbitrary_tracks(), seed in any::<u64>()) {
        let len = tracks.len();
        let mut indexer = ShuffleIndexer::new(tracks);
        indexer.shuffle_with(&mut StdRng::seed_from_u64(seed), None);

        let seen: HashSet<usize> = (0..len)
            .filter_map(|i| indexer.mapping().original_index(i))
            .collect();
        prop_assert_eq!(seen.len(), len);
        prop_assert!(seen.iter().all(|&i| i < len));
    }

    /// Property: Out-of-range absolute volume leaves the volume unchanged
    #[test]
    fn invalid_volume_leaves_state(
        initial in 0u8..=100,
        level in prop_oneof![-1000i32..0, 101i32..1000]
    ) {
        let (mut session, backend) = create_session(TrackList::new(), initial);
        backend.clear_calls();

        prop_assert!(session.set_volume(level).is_err());
        prop_assert_eq!(session.volume(), initial);
        prop_assert!(backend.calls().is_empty());
    }

    /// Property: Relative volume changes never leave 1-100
    #[test]
    fn volume_delta_stays_audible(
        initial in 0u8..=100,
        deltas in prop::collection::vec(-150i32..150, 1..30)
    ) {
        let (mut session, _backend) = create_session(TrackList::new(), initial);
        for delta in deltas {
            let level = session.volume_delta(delta).unwrap();
            prop_assert!((1..=100).contains(&level));
            prop_assert_eq!(level, session.volume());
        }
    }
}
