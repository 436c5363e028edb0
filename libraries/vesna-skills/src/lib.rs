//! Vesna Skills
//!
//! Voice skills on top of the playback engine, and the dispatcher that
//! routes recognized phrases to them.
//!
//! This crate provides:
//! - Phrase tables mapping normalized trigger phrases to commands
//! - The conversation context router (follow-ups, exit phrases)
//! - One player skill implementation configured by a profile (radio, music)
//! - Track sources (station lists, music folders)
//! - The [`Assistant`] dispatcher with wake words and skill arbitration
//!
//! # Example
//!
//! ```rust
//! use vesna_skills::{Assistant, ContextRouter, Dispatch};
//!
//! let mut assistant = Assistant::new(ContextRouter::new()).with_wake_words(["ирина"]);
//! // No skills registered yet
//! assert_eq!(assistant.handle_phrase("Ирина, радио"), Dispatch::Unrecognized);
//! assert_eq!(assistant.handle_phrase("радио"), Dispatch::Ignored);
//! ```

#![forbid(unsafe_code)]

pub mod assistant;
pub mod command;
pub mod phrase;
pub mod player_skill;
pub mod profile;
pub mod router;
pub mod skill;
pub mod sources;

pub use assistant::{Assistant, Dispatch};
pub use command::PlayerCommand;
pub use phrase::{CommandDescriptor, PhraseMatch, PhraseTable};
pub use player_skill::{PlayerSkill, SkillServices};
pub use profile::{Messages, SkillKind, SkillProfile};
pub use router::{ContextRouter, ContextState, SkillId, EXIT_PHRASES};
pub use skill::{ContextEffect, Skill};
