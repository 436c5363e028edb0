//! Vesna Assistant Library
//!
//! Console front end for the Vesna playback skills: configuration, wiring
//! and simulated collaborators. Exposed as a library for testing.

pub mod app;
pub mod config;
pub mod console;
pub mod error;

pub use app::{build_assistant, check, profile_for, SkillReport};
pub use config::{AssistantConfig, RampSettings};
pub use console::{ConsoleBackend, ConsoleBackendFactory, ConsoleSpeech};
pub use error::{AssistantError, Result};
