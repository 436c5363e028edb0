//! Spoken-text normalization
//!
//! Recognizers disagree on case, punctuation and the letter `ё`, so every
//! phrase and every trigger is folded through [`normalize`] before comparison.

/// Fold a phrase into its comparison form
///
/// Lowercases, maps `ё` to `е`, drops punctuation and collapses whitespace.
pub fn normalize(phrase: &str) -> String {
    let mut out = String::with_capacity(phrase.len());
    let mut pending_space = false;

    for ch in phrase.chars().flat_map(char::to_lowercase) {
        let ch = if ch == 'ё' { 'е' } else { ch };

        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_space = true;
        }
        // Other punctuation is dropped without splitting words
    }

    out
}

/// Check whether `phrase` starts with `prefix` on a word boundary
///
/// Both arguments must already be normalized.
pub fn starts_with_words(phrase: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match phrase.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(' '),
        None => false,
    }
}

/// Remainder of `phrase` after a word-boundary `prefix`, trimmed
pub fn remainder_after<'a>(phrase: &'a str, prefix: &str) -> &'a str {
    if starts_with_words(phrase, prefix) {
        phrase[prefix.len()..].trim_start()
    } else {
        phrase
    }
}
