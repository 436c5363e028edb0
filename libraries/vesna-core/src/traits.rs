//! Collaborator traits for Vesna
//!
//! The playback engine never touches audio devices, speech synthesis or
//! settings files directly; it goes through these narrow surfaces.
use crate::error::{BackendResult, Result};
use crate::types::SkillOptions;

/// Callback invoked by a backend when the current track finishes on its own
pub type TrackEndedCallback = Box<dyn Fn() + Send + Sync>;

/// Audio playback backend
///
/// Implementers open a URI (file path or stream URL) and control its output.
/// Calls are expected to return quickly; decoding and streaming happen on the
/// backend's own threads.
pub trait AudioBackend: Send {
    /// Open `uri` and start playing it, replacing whatever was loaded
    fn play(&mut self, uri: &str) -> BackendResult<()>;

    /// Pause output, keeping the media loaded
    fn pause(&mut self) -> BackendResult<()>;

    /// Resume paused output
    fn resume(&mut self) -> BackendResult<()>;

    /// Stop output and unload the media
    fn stop(&mut self) -> BackendResult<()>;

    /// Set output volume (0-100)
    fn set_volume(&mut self, level: u8) -> BackendResult<()>;

    /// Whether media is currently loaded (playing or paused)
    fn is_loaded(&self) -> bool;

    /// Register the end-of-track callback
    ///
    /// Backends may invoke the callback from any thread, including from inside
    /// another backend call.
    fn on_track_ended(&mut self, callback: TrackEndedCallback);
}

/// Creates audio backends for skills
///
/// A failing factory is how a skill learns that its backend is unavailable.
pub trait BackendFactory: Send + Sync {
    /// Create a backend for the given skill scope
    fn create(&self, scope: &str) -> BackendResult<Box<dyn AudioBackend>>;
}

impl<F> BackendFactory for F
where
    F: Fn(&str) -> BackendResult<Box<dyn AudioBackend>> + Send + Sync,
{
    fn create(&self, scope: &str) -> BackendResult<Box<dyn AudioBackend>> {
        self(scope)
    }
}

/// Speech synthesis output
pub trait SpeechOutput: Send + Sync {
    /// Say `text` to the user
    fn speak(&self, text: &str);

    /// Drop any pending "listening" cue or queued confirmation
    ///
    /// Called when a conversation context ends on an explicit user stop.
    fn clear_cues(&self) {}
}

/// Persistent per-skill options
pub trait OptionsStore: Send + Sync {
    /// Load options for `scope`, `None` if nothing was stored yet
    fn load(&self, scope: &str) -> Result<Option<SkillOptions>>;

    /// Store options for `scope`
    fn save(&self, scope: &str, options: &SkillOptions) -> Result<()>;
}
