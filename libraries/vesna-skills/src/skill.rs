//! Skill interface used by the dispatcher

use crate::router::SkillId;

/// What a handled command does to the conversation context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextEffect {
    /// Route the next phrase to this skill
    Arm,

    /// End the conversation
    Release,

    /// Leave the context as it is
    Keep,
}

/// A voice skill
///
/// Phrases reach a skill already normalized and with the wake word removed.
/// Handlers never fail: errors are spoken by the skill itself.
pub trait Skill: Send {
    /// Stable identifier
    fn id(&self) -> &SkillId;

    /// Length of the longest top-level trigger `phrase` starts with
    fn top_level_weight(&self, phrase: &str) -> Option<usize>;

    /// Run the top-level command matching `phrase`
    fn handle_top_level(&mut self, phrase: &str) -> ContextEffect;

    /// Run a follow-up phrase while this skill holds the context
    ///
    /// `None` if the phrase is not one of the skill's follow-ups.
    fn handle_in_context(&mut self, phrase: &str) -> Option<ContextEffect>;

    /// Ask the user to rephrase
    fn clarify(&mut self);

    /// Whether the skill is playing or paused right now
    fn is_active(&self) -> bool {
        false
    }
}
