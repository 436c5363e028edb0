//! Phrase tables
//!
//! A table maps trigger phrases to commands. Triggers are written
//! pipe-separated ("тихо|выключи радио|стоп") and normalized once at
//! construction; incoming phrases must be normalized by the caller.

use vesna_core::text::{normalize, remainder_after, starts_with_words};

/// One command and the phrases that trigger it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor<C> {
    triggers: Vec<String>,
    command: C,
}

impl<C> CommandDescriptor<C> {
    /// Create a descriptor from pipe-separated triggers
    pub fn new(triggers: &str, command: C) -> Self {
        let triggers = triggers
            .split('|')
            .map(normalize)
            .filter(|t| !t.is_empty())
            .collect();
        Self { triggers, command }
    }

    /// Normalized trigger phrases
    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Bound command
    pub fn command(&self) -> &C {
        &self.command
    }
}

/// Prefix match result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatch<'a, C> {
    /// Matched command
    pub command: &'a C,

    /// Trigger that matched
    pub trigger: &'a str,

    /// Rest of the phrase after the trigger
    pub remainder: &'a str,
}

impl<C> PhraseMatch<'_, C> {
    /// Trigger length in characters, used to rank competing matches
    pub fn weight(&self) -> usize {
        self.trigger.chars().count()
    }
}

/// Ordered set of command descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseTable<C> {
    descriptors: Vec<CommandDescriptor<C>>,
}

impl<C> Default for PhraseTable<C> {
    fn default() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }
}

impl<C> PhraseTable<C> {
    /// Create empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor (builder style)
    #[must_use]
    pub fn with(mut self, triggers: &str, command: C) -> Self {
        self.push(CommandDescriptor::new(triggers, command));
        self
    }

    /// Add a descriptor
    pub fn push(&mut self, descriptor: CommandDescriptor<C>) {
        self.descriptors.push(descriptor);
    }

    /// Command whose trigger equals the whole phrase
    pub fn exact(&self, phrase: &str) -> Option<&C> {
        self.descriptors
            .iter()
            .find(|d| d.triggers.iter().any(|t| t == phrase))
            .map(|d| &d.command)
    }

    /// Command with the longest trigger the phrase starts with
    ///
    /// Matches on word boundaries only. Equal lengths go to the earlier
    /// descriptor.
    pub fn longest_prefix<'a>(&'a self, phrase: &'a str) -> Option<PhraseMatch<'a, C>> {
        let mut best: Option<PhraseMatch<'a, C>> = None;

        for descriptor in &self.descriptors {
            for trigger in &descriptor.triggers {
                if !starts_with_words(phrase, trigger) {
                    continue;
                }
                let candidate = PhraseMatch {
                    command: &descriptor.command,
                    trigger: trigger.as_str(),
                    remainder: remainder_after(phrase, trigger),
                };
                if best.as_ref().map_or(true, |b| candidate.weight() > b.weight()) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if table is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate descriptors in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, CommandDescriptor<C>> {
        self.descriptors.iter()
    }
}
