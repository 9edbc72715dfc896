//! Impression Synthesizer — picks a conclusion sentence when no IMPRESSION
//! section could be extracted.

use std::sync::LazyLock;

use regex::Regex;

use crate::report::extractor::split_sentences;

/// Sentences this short are never picked.
const MIN_SENTENCE_CHARS: usize = 6;

/// Normalcy patterns, checked case-insensitively against each sentence.
static NORMALCY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)normal",
        r"(?i)no.*abnormal",
        r"(?i)unremarkable",
        r"(?i)within.*normal.*limit",
        r"(?i)no acute",
        r"(?i)clear",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Returns the first sentence (document order) matching any normalcy pattern,
/// otherwise the first sentence, each terminated with a period. `None` when
/// the text has no sentence longer than five characters.
pub fn synthesize_impression(text: &str) -> Option<String> {
    let sentences: Vec<&str> = split_sentences(text)
        .into_iter()
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .collect();

    sentences
        .iter()
        .find(|s| NORMALCY_PATTERNS.iter().any(|p| p.is_match(s)))
        .or_else(|| sentences.first())
        .map(|s| format!("{s}."))
}
