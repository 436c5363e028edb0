//! Recording test doubles
//!
//! Available with the `test-utils` feature. Both doubles are cheap handles
//! over shared state: clone one, hand the clone to the code under test, and
//! inspect the original.

use crate::error::{BackendError, BackendResult};
use crate::traits::{AudioBackend, BackendFactory, SpeechOutput, TrackEndedCallback};
use std::sync::{Arc, Mutex, MutexGuard};

/// A call received by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Play(String),
    Pause,
    Resume,
    Stop,
    SetVolume(u8),
}

#[derive(Default)]
struct BackendState {
    calls: Vec<BackendCall>,
    loaded: bool,
    fail_play: Option<BackendError>,
    on_end: Option<Arc<dyn Fn() + Send + Sync>>,
}

/// Audio backend that records every call
#[derive(Clone, Default)]
pub struct RecordingBackend {
    state: Arc<Mutex<BackendState>>,
}

impl RecordingBackend {
    /// Create a backend with nothing loaded
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("recording backend lock poisoned")
    }

    /// Boxed handle sharing this backend's state
    pub fn boxed(&self) -> Box<dyn AudioBackend> {
        Box::new(self.clone())
    }

    /// Factory that always hands out handles to this backend
    pub fn factory(&self) -> Arc<dyn BackendFactory> {
        let backend = self.clone();
        Arc::new(move |_scope: &str| -> BackendResult<Box<dyn AudioBackend>> {
            Ok(backend.boxed())
        })
    }

    /// All calls so far
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    /// URIs passed to `play`, in order
    pub fn played(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Play(uri) => Some(uri.clone()),
                _ => None,
            })
            .collect()
    }

    /// Levels passed to `set_volume`, in order
    pub fn volumes(&self) -> Vec<u8> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SetVolume(level) => Some(*level),
                _ => None,
            })
            .collect()
    }

    /// Last volume set, if any
    pub fn last_volume(&self) -> Option<u8> {
        self.volumes().last().copied()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Make every following `play` fail with `error`
    pub fn fail_plays_with(&self, error: BackendError) {
        self.state().fail_play = Some(error);
    }

    /// Simulate the loaded track ending on its own
    ///
    /// Returns `false` if no callback was registered. The callback runs
    /// outside the backend lock, as a real backend thread would.
    pub fn finish_track(&self) -> bool {
        let callback = {
            let mut state = self.state();
            state.loaded = false;
            state.on_end.clone()
        };
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl AudioBackend for RecordingBackend {
    fn play(&mut self, uri: &str) -> BackendResult<()> {
        let mut state = self.state();
        if let Some(error) = state.fail_play.clone() {
            return Err(error);
        }
        state.calls.push(BackendCall::Play(uri.to_string()));
        state.loaded = true;
        Ok(())
    }

    fn pause(&mut self) -> BackendResult<()> {
        self.state().calls.push(BackendCall::Pause);
        Ok(())
    }

    fn resume(&mut self) -> BackendResult<()> {
        self.state().calls.push(BackendCall::Resume);
        Ok(())
    }

    fn stop(&mut self) -> BackendResult<()> {
        let mut state = self.state();
        state.calls.push(BackendCall::Stop);
        state.loaded = false;
        Ok(())
    }

    fn set_volume(&mut self, level: u8) -> BackendResult<()> {
        self.state().calls.push(BackendCall::SetVolume(level));
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.state().loaded
    }

    fn on_track_ended(&mut self, callback: TrackEndedCallback) {
        self.state().on_end = Some(Arc::from(callback));
    }
}

/// Speech output that records every utterance
#[derive(Clone, Default)]
pub struct RecordingSpeech {
    lines: Arc<Mutex<Vec<String>>>,
    cue_clears: Arc<Mutex<usize>>,
}

impl RecordingSpeech {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far
    pub fn spoken(&self) -> Vec<String> {
        self.lines.lock().expect("speech lock poisoned").clone()
    }

    /// Most recent utterance
    pub fn last(&self) -> Option<String> {
        self.spoken().last().cloned()
    }

    /// Take and forget everything spoken so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().expect("speech lock poisoned"))
    }

    /// How many times `clear_cues` was called
    pub fn cue_clears(&self) -> usize {
        *self.cue_clears.lock().expect("speech lock poisoned")
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, text: &str) {
        self.lines
            .lock()
            .expect("speech lock poisoned")
            .push(text.to_string());
    }

    fn clear_cues(&self) {
        *self.cue_clears.lock().expect("speech lock poisoned") += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn backend_records_and_shares_state() {
        let backend = RecordingBackend::new();
        let mut handle = backend.boxed();

        handle.set_volume(30).unwrap();
        handle.play("/music/a.mp3").unwrap();
        assert!(backend.is_loaded());

        handle.stop().unwrap();
        assert!(!backend.is_loaded());
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::SetVolume(30),
                BackendCall::Play("/music/a.mp3".to_string()),
                BackendCall::Stop,
            ]
        );
    }

    #[test]
    fn failing_play_is_not_recorded() {
        let backend = RecordingBackend::new();
        backend.fail_plays_with(BackendError::Unavailable("gone".to_string()));

        let mut handle = backend.boxed();
        assert!(handle.play("/music/a.mp3").is_err());
        assert!(backend.played().is_empty());
        assert!(!backend.is_loaded());
    }

    #[test]
    fn finish_track_runs_callback() {
        let backend = RecordingBackend::new();
        assert!(!backend.finish_track());

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        backend.boxed().on_track_ended(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(backend.finish_track());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn speech_records_lines() {
        let speech = RecordingSpeech::new();
        speech.speak("включаю");
        speech.clear_cues();

        assert_eq!(speech.last().as_deref(), Some("включаю"));
        assert_eq!(speech.take(), vec!["включаю".to_string()]);
        assert!(speech.spoken().is_empty());
        assert_eq!(speech.cue_clears(), 1);
    }
}
