//! Playback session - one track list driving one audio backend
//!
//! The session owns the backend, the (possibly shuffled) track list, the
//! current position, playback state and volume. Every backend call goes
//! through here so state and device never disagree.
//!
//! Background work (volume ramps, end-of-track handling, sleep timers) reaches
//! the session through a [`SessionHandle`]. The handle's lock is held for one
//! operation at a time and never across an `.await`.

use crate::{
    error::{PlaybackError, Result},
    shuffle::ShuffleIndexer,
    track_list::TrackList,
    types::{PlaybackState, MAX_VOLUME, MIN_AUDIBLE_VOLUME},
};
use rand::Rng;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vesna_core::{AudioBackend, TrackEndedCallback, TrackRef};

/// Result of a single ramp step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStep {
    /// Volume moved, target not reached yet
    Continue(u8),

    /// Target reached
    Done(u8),
}

/// Volume in effect before a fade-in muted the session
#[derive(Debug, Clone, Copy)]
pub(crate) struct SavedVolume {
    level: u8,
    synced: bool,
}

/// Playback session
pub struct PlaybackSession {
    backend: Box<dyn AudioBackend>,
    playlist: ShuffleIndexer,
    current: Option<usize>,
    state: PlaybackState,
    volume: u8,
    // Whether the backend has been told `volume` yet
    volume_synced: bool,
    ramp: Option<CancellationToken>,
}

impl PlaybackSession {
    /// Create a session
    ///
    /// Nothing is sent to the backend until the first command; the initial
    /// volume goes out with the first `play`.
    pub fn new(backend: Box<dyn AudioBackend>, tracks: TrackList, volume: u8) -> Self {
        let volume = volume.min(MAX_VOLUME);
        debug!(tracks = tracks.len(), volume, "Playback session created");

        Self {
            backend,
            playlist: ShuffleIndexer::new(tracks),
            current: None,
            state: PlaybackState::Stopped,
            volume,
            volume_synced: false,
            ramp: None,
        }
    }

    // ===== Playback Control =====

    /// Play the track at `index` in the active view
    ///
    /// Without an index, resumes the current track or starts from the top.
    /// Cancels any running volume ramp.
    pub fn play(&mut self, index: Option<usize>) -> Result<TrackRef> {
        if self.playlist.view().is_empty() {
            return Err(PlaybackError::EmptyPlaylist);
        }

        let index = index.or(self.current).unwrap_or(0);
        let len = self.playlist.view().len();
        if index >= len {
            return Err(PlaybackError::IndexOutOfRange { index, len });
        }

        self.cancel_ramp();
        self.load(index)
    }

    /// Toggle between playing and paused
    ///
    /// Returns the new state.
    pub fn pause(&mut self) -> Result<PlaybackState> {
        if !self.backend.is_loaded() {
            return Err(PlaybackError::NoActiveTrack);
        }

        match self.state {
            PlaybackState::Playing => {
                self.backend.pause()?;
                self.state = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                self.backend.resume()?;
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Stopped => return Err(PlaybackError::NoActiveTrack),
        }

        debug!(state = ?self.state, "Pause toggled");
        Ok(self.state)
    }

    /// Stop playback
    ///
    /// The current position is kept so `play(None)` picks the same track up
    /// again.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == PlaybackState::Stopped {
            return Err(PlaybackError::AlreadyStopped);
        }

        self.cancel_ramp();
        self.backend.stop()?;
        self.state = PlaybackState::Stopped;

        info!(index = ?self.current, "Playback stopped");
        Ok(())
    }

    /// Skip forward, wrapping to the first track
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<TrackRef> {
        let index = self.next_index().ok_or(PlaybackError::EmptyPlaylist)?;
        self.play(Some(index))
    }

    /// Skip back, wrapping to the last track
    pub fn previous(&mut self) -> Result<TrackRef> {
        let len = self.playlist.view().len();
        if len == 0 {
            return Err(PlaybackError::EmptyPlaylist);
        }

        let index = match self.current {
            Some(current) => (current + len - 1) % len,
            None => len - 1,
        };
        self.play(Some(index))
    }

    /// Advance after the backend reported the end of a track
    ///
    /// Only acts while playing. Does not cancel a running ramp, so a sleep
    /// fade-out carries on across the track change.
    pub fn handle_track_ended(&mut self) -> Result<Option<TrackRef>> {
        if self.state != PlaybackState::Playing {
            debug!(state = ?self.state, "Track end ignored");
            return Ok(None);
        }

        let index = self.next_index().ok_or(PlaybackError::EmptyPlaylist)?;
        self.load(index).map(Some)
    }

    fn next_index(&self) -> Option<usize> {
        let len = self.playlist.view().len();
        if len == 0 {
            return None;
        }
        Some(match self.current {
            Some(current) => (current + 1) % len,
            None => 0,
        })
    }

    fn load(&mut self, index: usize) -> Result<TrackRef> {
        let track = self
            .playlist
            .view()
            .get(index)
            .cloned()
            .ok_or(PlaybackError::IndexOutOfRange {
                index,
                len: self.playlist.view().len(),
            })?;

        if self.state != PlaybackState::Stopped || self.backend.is_loaded() {
            self.backend.stop()?;
        }
        if !self.volume_synced {
            self.apply_volume(self.volume)?;
        }

        self.backend.play(track.uri())?;
        self.state = PlaybackState::Playing;
        self.current = Some(index);

        info!(index, track = %track, "Playing");
        Ok(track)
    }

    // ===== Volume =====

    /// Set an absolute volume
    ///
    /// Values outside 0-100 are rejected and leave the volume untouched.
    pub fn set_volume(&mut self, level: i32) -> Result<u8> {
        let level = u8::try_from(level)
            .ok()
            .filter(|l| *l <= MAX_VOLUME)
            .ok_or(PlaybackError::InvalidVolume(level))?;

        self.cancel_ramp();
        self.apply_volume(level)?;
        Ok(level)
    }

    /// Change the volume by a signed amount, clamped to 1-100
    pub fn volume_delta(&mut self, delta: i32) -> Result<u8> {
        let target = (i32::from(self.volume) + delta)
            .clamp(i32::from(MIN_AUDIBLE_VOLUME), i32::from(MAX_VOLUME));
        let level = u8::try_from(target).unwrap_or(MAX_VOLUME);

        self.cancel_ramp();
        self.apply_volume(level)?;
        Ok(level)
    }

    fn apply_volume(&mut self, level: u8) -> Result<()> {
        self.backend.set_volume(level)?;
        self.volume = level;
        self.volume_synced = true;
        Ok(())
    }

    // ===== Ramps =====

    /// Start tracking a new ramp, cancelling the previous one
    pub fn begin_ramp(&mut self) -> CancellationToken {
        self.cancel_ramp();
        let token = CancellationToken::new();
        self.ramp = Some(token.clone());
        token
    }

    /// Start a fade-in: drop to silence and hand back the ramp token
    ///
    /// The only path that sets volume 0. Skips the backend call when a
    /// preceding [`mute_for_fade_in`](Self::mute_for_fade_in) already
    /// silenced it.
    pub fn prime_fade_in(&mut self) -> Result<CancellationToken> {
        let token = self.begin_ramp();
        if self.volume != 0 || !self.volume_synced {
            self.apply_volume(0)?;
        }
        Ok(token)
    }

    /// Arrange for the next `load` to go out at volume 0
    ///
    /// The backend is not touched here; `load` sends the 0 after stopping
    /// the old track and before playing the new one.
    pub(crate) fn mute_for_fade_in(&mut self) -> SavedVolume {
        let saved = SavedVolume {
            level: self.volume,
            synced: self.volume_synced,
        };
        self.volume = 0;
        self.volume_synced = false;
        saved
    }

    /// Undo [`mute_for_fade_in`](Self::mute_for_fade_in) after a failed start
    pub(crate) fn restore_volume(&mut self, saved: SavedVolume) {
        if self.volume_synced {
            // The 0 reached the backend before the failure
            if let Err(e) = self.apply_volume(saved.level) {
                warn!(error = %e, level = saved.level, "Failed to restore volume");
            }
        } else {
            self.volume = saved.level;
            self.volume_synced = saved.synced;
        }
    }

    /// Move the volume one step toward `target`
    ///
    /// Checked under the session lock: once the token is cancelled no further
    /// step is applied.
    pub fn ramp_step(&mut self, token: &CancellationToken, target: u8, step: u8) -> Result<RampStep> {
        if token.is_cancelled() {
            return Err(PlaybackError::Cancelled);
        }

        let target = target.min(MAX_VOLUME);
        let step = step.max(1);
        if self.volume == target {
            return Ok(RampStep::Done(target));
        }

        let next = if self.volume < target {
            self.volume.saturating_add(step).min(target)
        } else {
            self.volume.saturating_sub(step).max(target)
        };
        self.apply_volume(next)?;

        Ok(if next == target {
            RampStep::Done(next)
        } else {
            RampStep::Continue(next)
        })
    }

    /// Cancel the running ramp, if any
    pub fn cancel_ramp(&mut self) {
        if let Some(token) = self.ramp.take() {
            if !token.is_cancelled() {
                debug!(volume = self.volume, "Volume ramp cancelled");
            }
            token.cancel();
        }
    }

    // ===== Track List =====

    /// Shuffle with the thread-local RNG
    pub fn shuffle(&mut self) -> Option<usize> {
        self.shuffle_with(&mut rand::thread_rng())
    }

    /// Shuffle the original order and relocate the current track
    ///
    /// Returns the current track's new position.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let current = self.current_track().cloned();
        let position = self.playlist.shuffle_with(rng, current.as_ref());
        info!(tracks = self.playlist.view().len(), "Track list shuffled");
        self.relocate(current.is_some(), position)
    }

    /// Restore the original order and relocate the current track
    pub fn unshuffle(&mut self) -> Option<usize> {
        let current = self.current_track().cloned();
        let position = self.playlist.unshuffle(current.as_ref());
        info!("Track list restored to original order");
        self.relocate(current.is_some(), position)
    }

    /// Swap in a rescanned track list, keeping the current track by identity
    pub fn replace_tracks(&mut self, tracks: TrackList) -> Option<usize> {
        let current = self.current_track().cloned();
        let position = self.playlist.replace(tracks, current.as_ref());
        debug!(tracks = self.playlist.view().len(), "Track list replaced");
        self.relocate(current.is_some(), position)
    }

    fn relocate(&mut self, had_current: bool, position: Option<usize>) -> Option<usize> {
        if had_current && position.is_none() {
            warn!("Current track lost on reorder, stopping");
            if self.state != PlaybackState::Stopped {
                if let Err(e) = self.backend.stop() {
                    warn!(error = %e, "Backend stop failed");
                }
            }
            self.state = PlaybackState::Stopped;
        }
        self.current = position;
        position
    }

    // ===== Backend Events =====

    /// Register the backend's end-of-track callback
    pub fn on_track_ended(&mut self, callback: TrackEndedCallback) {
        self.backend.on_track_ended(callback);
    }

    // ===== Accessors =====

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current volume (0-100)
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Position of the current track in the active view
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Current track, if one is selected
    pub fn current_track(&self) -> Option<&TrackRef> {
        self.current.and_then(|i| self.playlist.view().get(i))
    }

    /// Active view of the track list
    pub fn tracks(&self) -> &TrackList {
        self.playlist.view()
    }

    /// Track list in original order
    pub fn original_tracks(&self) -> &TrackList {
        self.playlist.original()
    }

    /// Whether the backend has something loaded
    pub fn is_loaded(&self) -> bool {
        self.backend.is_loaded()
    }

    /// Whether the active view is shuffled
    pub fn is_shuffled(&self) -> bool {
        self.playlist.is_shuffled()
    }
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("tracks", &self.playlist.view().len())
            .field("current", &self.current)
            .field("state", &self.state)
            .field("volume", &self.volume)
            .field("shuffled", &self.playlist.is_shuffled())
            .finish_non_exhaustive()
    }
}

/// Shared handle to a playback session
#[derive(Debug, Clone)]
pub struct SessionHandle(Arc<Mutex<PlaybackSession>>);

impl SessionHandle {
    /// Wrap a session
    pub fn new(session: PlaybackSession) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    /// Lock the session
    ///
    /// A panic in another holder does not leave the session in a torn state
    /// (every mutation is a single assignment after the backend call), so a
    /// poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, PlaybackSession> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Auto-advance when the backend reports the end of a track
    ///
    /// The backend callback only spawns a task on `runtime`; the session is
    /// locked from that task, so a backend that calls back from inside one of
    /// its own commands cannot deadlock.
    pub fn watch_track_end(&self, runtime: Handle) {
        let weak = Arc::downgrade(&self.0);
        self.lock().on_track_ended(Box::new(move || {
            let weak = weak.clone();
            runtime.spawn(async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let handle = SessionHandle(inner);
                let result = handle.lock().handle_track_ended();
                match result {
                    Ok(Some(track)) => debug!(track = %track, "Advanced after track end"),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Auto-advance failed"),
                }
            });
        }));
    }
}
