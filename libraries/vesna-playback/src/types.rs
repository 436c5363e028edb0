//! Core types for playback control

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing playing
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Lowest volume reachable through relative commands and fade-outs
pub const MIN_AUDIBLE_VOLUME: u8 = 1;

/// Highest volume
pub const MAX_VOLUME: u8 = 100;

/// Configuration for stepped volume transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RampConfig {
    /// Pause between two steps (default: 100ms)
    pub step_delay: Duration,

    /// Volume change per step (default: 1)
    pub step_size: u8,
}

impl RampConfig {
    /// Create a ramp configuration; a zero step size is bumped to 1
    pub fn new(step_delay: Duration, step_size: u8) -> Self {
        Self {
            step_delay,
            step_size: step_size.max(1),
        }
    }
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(100),
            step_size: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ramp_config() {
        let config = RampConfig::default();
        assert_eq!(config.step_delay, Duration::from_millis(100));
        assert_eq!(config.step_size, 1);
    }

    #[test]
    fn zero_step_is_bumped() {
        let config = RampConfig::new(Duration::from_millis(10), 0);
        assert_eq!(config.step_size, 1);
    }

    #[test]
    fn default_state_is_stopped() {
        assert_eq!(PlaybackState::default(), PlaybackState::Stopped);
    }
}
