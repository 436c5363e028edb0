//! Conversation context
//!
//! After a skill command the router remembers the skill, so a short
//! follow-up ("тише", "ещё") reaches it without the full trigger phrase.
//! At most one skill is armed at a time.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Phrases that end a conversation without doing anything
pub const EXIT_PHRASES: &[&str] = &["хорошо", "оставь", "стать", "оставить"];

/// Skill identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkillId(String);

impl SkillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Router state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContextState {
    /// No conversation in progress
    #[default]
    Idle,

    /// Next phrase goes to this skill first
    Armed(SkillId),
}

/// Shared conversation context
///
/// Cloning yields another handle to the same state, so timers can release a
/// context from outside the dispatch path.
#[derive(Debug, Clone, Default)]
pub struct ContextRouter {
    state: Arc<Mutex<ContextState>>,
}

impl ContextRouter {
    /// Create an idle router
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Route the next phrase to `skill`
    pub fn arm(&self, skill: &SkillId) {
        let mut state = self.lock();
        if *state != ContextState::Armed(skill.clone()) {
            debug!(skill = %skill, "Context armed");
        }
        *state = ContextState::Armed(skill.clone());
    }

    /// Return to idle
    pub fn clear(&self) {
        let mut state = self.lock();
        if let ContextState::Armed(skill) = &*state {
            debug!(skill = %skill, "Context cleared");
        }
        *state = ContextState::Idle;
    }

    /// Return to idle only if `skill` holds the context
    ///
    /// Returns `true` if the context was released.
    pub fn release(&self, skill: &SkillId) -> bool {
        let mut state = self.lock();
        if *state == ContextState::Armed(skill.clone()) {
            debug!(skill = %skill, "Context released");
            *state = ContextState::Idle;
            true
        } else {
            false
        }
    }

    /// Current state
    pub fn state(&self) -> ContextState {
        self.lock().clone()
    }

    /// Skill holding the context, if any
    pub fn armed(&self) -> Option<SkillId> {
        match &*self.lock() {
            ContextState::Armed(skill) => Some(skill.clone()),
            ContextState::Idle => None,
        }
    }

    /// Whether a normalized phrase ends the conversation
    pub fn is_exit_phrase(phrase: &str) -> bool {
        EXIT_PHRASES.contains(&phrase)
    }
}
