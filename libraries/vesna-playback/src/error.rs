//! Error types for playback control

use thiserror::Error;
use vesna_core::BackendError;

/// Playback errors
///
/// Every variant is an expected outcome of a spoken command; skills turn them
/// into spoken fallbacks instead of propagating them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Track list is empty
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// Requested index is outside the track list
    #[error("Index {index} out of range for {len} tracks")]
    IndexOutOfRange { index: usize, len: usize },

    /// Nothing is loaded in the backend
    #[error("No active track")]
    NoActiveTrack,

    /// Stop requested while already stopped
    #[error("Playback already stopped")]
    AlreadyStopped,

    /// Backend could not be created or initialized
    #[error("Audio backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Volume ramp was interrupted by a conflicting command
    #[error("Volume ramp cancelled")]
    Cancelled,

    /// Deferred action refused at scheduling time
    #[error("Schedule rejected: {0}")]
    ScheduleRejected(String),

    /// Absolute volume outside 0-100
    #[error("Invalid volume: {0}. Must be between 0 and 100")]
    InvalidVolume(i32),

    /// Backend command failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
