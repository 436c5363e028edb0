//! Vesna Playback
//!
//! The playback engine behind the voice skills.
//!
//! This crate provides:
//! - Ordered track lists with stable track identity
//! - Shuffle/unshuffle that keeps the playing track
//! - A playback session driving one audio backend (play, pause, stop,
//!   next/previous with wraparound, absolute and relative volume)
//! - Cancellable stepped volume ramps (fade-in on start, fade-out on sleep)
//! - A one-shot deferred action scheduler and the sleep timer built on it
//!
//! # Architecture
//!
//! `vesna-playback` knows nothing about phrases or skills. The audio device
//! is reached through [`vesna_core::AudioBackend`]. Ramps and timers run as
//! tokio tasks spawned on a runtime [`Handle`](tokio::runtime::Handle) and
//! reach the session through a [`SessionHandle`].
//!
//! # Example
//!
//! ```rust
//! use vesna_core::{testing::RecordingBackend, TrackRef};
//! use vesna_playback::{PlaybackSession, PlaybackState, TrackList};
//!
//! let backend = RecordingBackend::new();
//! let tracks: TrackList = vec![
//!     TrackRef::new("/music/a.mp3"),
//!     TrackRef::new("/music/b.mp3"),
//! ]
//! .into();
//!
//! let mut session = PlaybackSession::new(backend.boxed(), tracks, 40);
//! session.play(None)?;
//! session.next()?;
//! assert_eq!(session.current_index(), Some(1));
//! session.next()?;
//! assert_eq!(session.current_index(), Some(0));
//!
//! session.stop()?;
//! assert_eq!(session.state(), PlaybackState::Stopped);
//! # Ok::<(), vesna_playback::PlaybackError>(())
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod ramp;
pub mod scheduler;
pub mod session;
pub mod shuffle;
pub mod sleep;
pub mod track_list;
pub mod types;

pub use error::{PlaybackError, Result};
pub use ramp::{RampHandle, VolumeRamp};
pub use scheduler::{DeferredActionScheduler, MAX_DELAY};
pub use session::{PlaybackSession, RampStep, SessionHandle};
pub use shuffle::{ShuffleIndexer, ShuffleMapping};
pub use sleep::{SleepOutcome, SleepRequest, SleepTimer};
pub use track_list::TrackList;
pub use types::{PlaybackState, RampConfig, MAX_VOLUME, MIN_AUDIBLE_VOLUME};
