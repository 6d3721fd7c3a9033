//! Answer judging.
//!
//! Both checks are plain lowercase substring tests: no tokenization of the
//! learner's text, no fuzzy matching, no synonyms. They are total over any
//! input, so empty or garbled answers simply come out incorrect.

/// How many leading tokens of a phrase gloss are tried by [`judge_phrase_answer`].
const PHRASE_KEY_TOKENS: usize = 3;

/// Correct iff the lowercased expected gloss occurs in the lowercased answer.
pub fn judge_vocabulary_answer(user_text: &str, expected_gloss: &str) -> bool {
    user_text
        .to_lowercase()
        .contains(&expected_gloss.to_lowercase())
}

/// Correct iff one of the first three whitespace tokens of the expected gloss
/// occurs in the answer. An empty gloss has no tokens and is never matched.
pub fn judge_phrase_answer(user_text: &str, expected_gloss: &str) -> bool {
    let answer = user_text.to_lowercase();
    expected_gloss
        .to_lowercase()
        .split_whitespace()
        .take(PHRASE_KEY_TOKENS)
        .any(|token| answer.contains(token))
}
