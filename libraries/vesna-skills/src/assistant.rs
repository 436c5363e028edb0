//! Command dispatcher
//!
//! Takes one recognized phrase at a time, finds the skill it belongs to and
//! keeps the conversation context up to date.
//!
//! While a skill holds the context a phrase is tried, in order, as:
//! 1. an exit phrase (ends the conversation)
//! 2. one of the armed skill's follow-ups
//! 3. a full top-level command; one belonging to another skill ends the
//!    conversation first
//! 4. otherwise the armed skill asks for clarification
//!
//! Competing top-level matches go to the longest trigger, then to a skill
//! that is currently playing, then to the skill registered first.

use crate::router::{ContextRouter, SkillId};
use crate::skill::{ContextEffect, Skill};
use tracing::{debug, info, warn};
use vesna_core::text::{normalize, remainder_after, starts_with_words};

/// What happened to a phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A skill ran a command
    Handled(SkillId),

    /// The armed skill asked the user to rephrase
    Clarified(SkillId),

    /// An exit phrase ended the conversation
    ExitedContext,

    /// Not addressed to the assistant (no wake word) or empty
    Ignored,

    /// No skill recognized the phrase
    Unrecognized,
}

/// Phrase dispatcher over a set of skills
pub struct Assistant {
    skills: Vec<Box<dyn Skill>>,
    router: ContextRouter,
    wake_words: Vec<String>,
}

impl Assistant {
    /// Create a dispatcher with no skills
    pub fn new(router: ContextRouter) -> Self {
        Self {
            skills: Vec::new(),
            router,
            wake_words: Vec::new(),
        }
    }

    /// Require one of these words in front of phrases while idle
    #[must_use]
    pub fn with_wake_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.wake_words = words
            .into_iter()
            .map(|w| normalize(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        self
    }

    /// Add a skill; registration order breaks arbitration ties
    pub fn register(&mut self, skill: Box<dyn Skill>) {
        if self.skills.iter().any(|s| s.id() == skill.id()) {
            warn!(skill = %skill.id(), "Skill registered twice, ignoring");
            return;
        }
        info!(skill = %skill.id(), "Skill registered");
        self.skills.push(skill);
    }

    /// Conversation context
    pub fn router(&self) -> &ContextRouter {
        &self.router
    }

    /// Registered skill ids in order
    pub fn skill_ids(&self) -> Vec<SkillId> {
        self.skills.iter().map(|s| s.id().clone()).collect()
    }

    /// Handle one recognized phrase
    pub fn handle_phrase(&mut self, phrase: &str) -> Dispatch {
        let normalized = normalize(phrase);
        let armed = self.router.armed();

        let phrase = match self.strip_wake_word(&normalized) {
            Some(rest) => rest,
            None if armed.is_some() || self.wake_words.is_empty() => normalized.as_str(),
            None => {
                debug!(phrase = %normalized, "No wake word, ignoring");
                return Dispatch::Ignored;
            }
        };
        if phrase.is_empty() {
            return Dispatch::Ignored;
        }

        if let Some(id) = armed {
            if let Some(dispatch) = self.handle_armed(&id, phrase) {
                return dispatch;
            }
        }

        self.dispatch_top_level(phrase)
    }

    fn strip_wake_word<'a>(&self, phrase: &'a str) -> Option<&'a str> {
        self.wake_words
            .iter()
            .find(|w| starts_with_words(phrase, w))
            .map(|w| remainder_after(phrase, w))
    }

    fn handle_armed(&mut self, id: &SkillId, phrase: &str) -> Option<Dispatch> {
        if ContextRouter::is_exit_phrase(phrase) {
            self.router.clear();
            return Some(Dispatch::ExitedContext);
        }

        let Some(index) = self.position(id) else {
            warn!(skill = %id, "Context armed by unknown skill, clearing");
            self.router.clear();
            return None;
        };

        if let Some(effect) = self.skills[index].handle_in_context(phrase) {
            self.apply(id, effect);
            return Some(Dispatch::Handled(id.clone()));
        }

        match self.arbitrate(phrase) {
            Some(best) if best == index => None,
            Some(best) => {
                debug!(from = %id, to = %self.skills[best].id(), "Unrelated command, leaving context");
                self.router.clear();
                None
            }
            None => {
                self.skills[index].clarify();
                self.router.arm(id);
                Some(Dispatch::Clarified(id.clone()))
            }
        }
    }

    fn dispatch_top_level(&mut self, phrase: &str) -> Dispatch {
        let Some(index) = self.arbitrate(phrase) else {
            debug!(phrase, "No skill matched");
            return Dispatch::Unrecognized;
        };

        let id = self.skills[index].id().clone();
        let effect = self.skills[index].handle_top_level(phrase);
        self.apply(&id, effect);
        Dispatch::Handled(id)
    }

    /// Index of the skill that should take a top-level phrase
    fn arbitrate(&self, phrase: &str) -> Option<usize> {
        let mut best: Option<(usize, usize, bool)> = None;

        for (index, skill) in self.skills.iter().enumerate() {
            let Some(weight) = skill.top_level_weight(phrase) else {
                continue;
            };
            let active = skill.is_active();
            let better = match best {
                None => true,
                Some((_, best_weight, best_active)) => {
                    weight > best_weight || (weight == best_weight && active && !best_active)
                }
            };
            if better {
                best = Some((index, weight, active));
            }
        }

        best.map(|(index, _, _)| index)
    }

    fn position(&self, id: &SkillId) -> Option<usize> {
        self.skills.iter().position(|s| s.id() == id)
    }

    fn apply(&self, id: &SkillId, effect: ContextEffect) {
        match effect {
            ContextEffect::Arm => self.router.arm(id),
            ContextEffect::Release => self.router.clear(),
            ContextEffect::Keep => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Skill with fixed triggers that logs what it was asked to do
    struct ScriptedSkill {
        id: SkillId,
        triggers: Vec<&'static str>,
        follow_ups: Vec<&'static str>,
        active: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedSkill {
        fn new(id: &str, triggers: &[&'static str], log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                id: SkillId::new(id),
                triggers: triggers.to_vec(),
                follow_ups: vec!["тише"],
                active: false,
                log: Arc::clone(log),
            }
        }

        fn record(&self, entry: String) {
            self.log.lock().unwrap().push(entry);
        }
    }

    impl Skill for ScriptedSkill {
        fn id(&self) -> &SkillId {
            &self.id
        }

        fn top_level_weight(&self, phrase: &str) -> Option<usize> {
            self.triggers
                .iter()
                .filter(|t| starts_with_words(phrase, t))
                .map(|t| t.chars().count())
                .max()
        }

        fn handle_top_level(&mut self, phrase: &str) -> ContextEffect {
            self.record(format!("{}:top:{}", self.id, phrase));
            if phrase == "стоп" {
                ContextEffect::Release
            } else {
                ContextEffect::Arm
            }
        }

        fn handle_in_context(&mut self, phrase: &str) -> Option<ContextEffect> {
            if self.follow_ups.contains(&phrase) {
                self.record(format!("{}:ctx:{}", self.id, phrase));
                Some(ContextEffect::Arm)
            } else {
                None
            }
        }

        fn clarify(&mut self) {
            self.record(format!("{}:clarify", self.id));
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn assistant(log: &Arc<Mutex<Vec<String>>>) -> Assistant {
        let mut assistant = Assistant::new(ContextRouter::new());
        assistant.register(Box::new(ScriptedSkill::new("radio", &["радио", "пауза", "стоп"], log)));
        assistant.register(Box::new(ScriptedSkill::new("music", &["включи музыку", "пауза"], log)));
        assistant
    }

    #[test]
    fn top_level_arms_context() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = assistant(&log);

        assert_eq!(assistant.handle_phrase("Радио!"), Dispatch::Handled(SkillId::new("radio")));
        assert_eq!(assistant.router().armed(), Some(SkillId::new("radio")));
        assert_eq!(log.lock().unwrap().as_slice(), &["radio:top:радио".to_string()]);
    }

    #[test]
    fn follow_up_needs_context() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = assistant(&log);

        assert_eq!(assistant.handle_phrase("тише"), Dispatch::Unrecognized);
        assistant.handle_phrase("радио");
        assert_eq!(assistant.handle_phrase("тише"), Dispatch::Handled(SkillId::new("radio")));
    }

    #[test]
    fn unknown_phrase_in_context_clarifies() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = assistant(&log);

        assistant.handle_phrase("радио");
        assert_eq!(
            assistant.handle_phrase("сделай что-нибудь"),
            Dispatch::Clarified(SkillId::new("radio"))
        );
        assert_eq!(assistant.router().armed(), Some(SkillId::new("radio")));
        assert_eq!(log.lock().unwrap().last().unwrap(), "radio:clarify");
    }

    #[test]
    fn exit_phrase_clears_context() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = assistant(&log);

        assistant.handle_phrase("радио");
        assert_eq!(assistant.handle_phrase("хорошо"), Dispatch::ExitedContext);
        assert_eq!(assistant.router().armed(), None);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn other_skill_command_switches_context() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = assistant(&log);

        assistant.handle_phrase("радио");
        assert_eq!(
            assistant.handle_phrase("включи музыку"),
            Dispatch::Handled(SkillId::new("music"))
        );
        assert_eq!(assistant.router().armed(), Some(SkillId::new("music")));
    }

    #[test]
    fn release_effect_clears_context() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = assistant(&log);

        assistant.handle_phrase("радио");
        assistant.handle_phrase("стоп");
        assert_eq!(assistant.router().armed(), None);
    }

    #[test]
    fn tie_goes_to_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = assistant(&log);

        assert_eq!(assistant.handle_phrase("пауза"), Dispatch::Handled(SkillId::new("radio")));
    }

    #[test]
    fn tie_goes_to_active_skill() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = Assistant::new(ContextRouter::new());
        assistant.register(Box::new(ScriptedSkill::new("radio", &["пауза"], &log)));
        let mut music = ScriptedSkill::new("music", &["пауза"], &log);
        music.active = true;
        assistant.register(Box::new(music));

        assert_eq!(assistant.handle_phrase("пауза"), Dispatch::Handled(SkillId::new("music")));
    }

    #[test]
    fn wake_word_required_when_idle() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = assistant(&log).with_wake_words(["Ирина"]);

        assert_eq!(assistant.handle_phrase("радио"), Dispatch::Ignored);
        assert_eq!(assistant.handle_phrase("ирина"), Dispatch::Ignored);
        assert_eq!(
            assistant.handle_phrase("Ирина, радио"),
            Dispatch::Handled(SkillId::new("radio"))
        );
        // Follow-ups inside a conversation need no wake word
        assert_eq!(assistant.handle_phrase("тише"), Dispatch::Handled(SkillId::new("radio")));
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut assistant = assistant(&log);
        assistant.register(Box::new(ScriptedSkill::new("radio", &["радио"], &log)));
        assert_eq!(
            assistant.skill_ids(),
            vec![SkillId::new("radio"), SkillId::new("music")]
        );
    }
}
