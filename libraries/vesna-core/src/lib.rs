//! Vesna Core
//!
//! Platform-agnostic types, collaborator traits, and error handling shared by
//! the Vesna playback engine and its skills.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackRef`, `SkillOptions`, `Station`
//! - **Collaborator Traits**: `AudioBackend`, `BackendFactory`, `SpeechOutput`, `OptionsStore`
//! - **Error Handling**: `CoreError` for options I/O, `BackendError` for audio backends
//!
//! Everything that talks to the outside world (audio output, speech synthesis,
//! settings storage) is reached through one of the traits, so the engine can be
//! driven by real devices or by the recording doubles in [`testing`].
//!
//! # Example
//!
//! ```rust
//! use vesna_core::{MemoryOptionsStore, OptionsStore, SkillOptions, MediaSource, TrackRef};
//! use std::path::PathBuf;
//!
//! let store = MemoryOptionsStore::new();
//! let options = SkillOptions::new(MediaSource::MusicFolder(PathBuf::from("music")));
//! store.save("music", &options).unwrap();
//! assert_eq!(store.load("music").unwrap(), Some(options));
//!
//! let track = TrackRef::from_path("/music/Yesterday.mp3");
//! assert_eq!(track.name(), "Yesterday");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod options_store;
pub mod text;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{BackendError, BackendResult, CoreError, Result};
pub use options_store::{JsonOptionsStore, MemoryOptionsStore};
pub use traits::{AudioBackend, BackendFactory, OptionsStore, SpeechOutput, TrackEndedCallback};
pub use types::{MediaSource, SkillOptions, Station, StepSize, TrackRef, VolumeSteps};
