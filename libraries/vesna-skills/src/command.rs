//! Player commands

use vesna_core::StepSize;

/// Command understood by a player skill
///
/// Arguments that the original phrase binds (step size, direction) are
/// carried in the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerCommand {
    /// Start playback; the rest of the phrase may name a track
    Start,

    /// Next track
    Next,

    /// Previous track
    Previous,

    /// Next station, only while something is loaded
    SwitchStation,

    /// Toggle pause
    Pause,

    /// Stop playback and end the conversation
    Stop,

    /// Raise volume by a profile step
    Louder(StepSize),

    /// Lower volume by a profile step
    Quieter(StepSize),

    /// Repeat the last relative volume change ("ещё")
    RepeatVolume,

    /// Shuffle the track list
    Shuffle,

    /// Restore the original order
    Unshuffle,

    /// Arm the sleep timer
    Sleep,

    /// Say what is playing
    Status,
}

impl PlayerCommand {
    /// Whether a missing session should be created for this command
    ///
    /// Only starting playback may open the backend; everything else reports
    /// that nothing is playing.
    pub fn opens_session(self) -> bool {
        matches!(self, Self::Start)
    }
}
