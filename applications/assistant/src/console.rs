//! Console collaborators
//!
//! Stand-ins for the speaker and the speech synthesizer: the backend logs
//! what it would play, speech goes to stdout.

use tracing::{debug, info};
use vesna_core::{
    AudioBackend, BackendFactory, BackendResult, SpeechOutput, TrackEndedCallback,
};

/// Simulated audio output
///
/// Tracks never end on their own, so the end-of-track callback is kept but
/// never fired.
pub struct ConsoleBackend {
    scope: String,
    uri: Option<String>,
    paused: bool,
    volume: u8,
    on_end: Option<TrackEndedCallback>,
}

impl ConsoleBackend {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            uri: None,
            paused: false,
            volume: 0,
            on_end: None,
        }
    }

    /// Currently loaded URI
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_end_callback(&self) -> bool {
        self.on_end.is_some()
    }
}

impl AudioBackend for ConsoleBackend {
    fn play(&mut self, uri: &str) -> BackendResult<()> {
        info!(scope = %self.scope, uri, "Playing");
        self.uri = Some(uri.to_string());
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) -> BackendResult<()> {
        info!(scope = %self.scope, "Paused");
        self.paused = true;
        Ok(())
    }

    fn resume(&mut self) -> BackendResult<()> {
        info!(scope = %self.scope, "Resumed");
        self.paused = false;
        Ok(())
    }

    fn stop(&mut self) -> BackendResult<()> {
        info!(scope = %self.scope, "Stopped");
        self.uri = None;
        self.paused = false;
        Ok(())
    }

    fn set_volume(&mut self, level: u8) -> BackendResult<()> {
        // Ramps step every tick; keep them out of the info log
        debug!(scope = %self.scope, level, "Volume");
        self.volume = level;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.uri.is_some()
    }

    fn on_track_ended(&mut self, callback: TrackEndedCallback) {
        self.on_end = Some(callback);
    }
}

/// Hands out a fresh [`ConsoleBackend`] per skill
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleBackendFactory;

impl BackendFactory for ConsoleBackendFactory {
    fn create(&self, scope: &str) -> BackendResult<Box<dyn AudioBackend>> {
        Ok(Box::new(ConsoleBackend::new(scope)))
    }
}

/// Prints spoken responses
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSpeech;

impl SpeechOutput for ConsoleSpeech {
    fn speak(&self, text: &str) {
        println!("vesna: {text}");
    }
}
