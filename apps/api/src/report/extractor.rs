//! Section Extractor — markup cleanup and keyword-bounded section lookup.
//!
//! Model output is free text. Sections are found by keyword heuristics, not a
//! grammar: start keywords are tried in caller order (never nearest-first),
//! and a section runs to the nearest later boundary keyword.

use std::sync::LazyLock;

use regex::Regex;

/// Keywords that open a FINDINGS-like section, in priority order.
pub const FINDINGS_KEYWORDS: &[&str] = &["findings", "observations", "analysis"];
/// Keywords that open an IMPRESSION-like section, in priority order.
pub const IMPRESSION_KEYWORDS: &[&str] = &["impression", "conclusion", "summary"];
/// Keywords that open a RECOMMENDATIONS-like section, in priority order.
pub const RECOMMENDATION_KEYWORDS: &[&str] = &["recommendations", "follow-up", "next steps"];
/// Keywords that terminate any extracted section.
pub const SECTION_BOUNDARIES: &[&str] = &[
    "impression",
    "conclusion",
    "recommendations",
    "follow-up",
    "findings",
];

/// Extracted sections shorter than this (in characters) are treated as noise.
pub const MIN_SECTION_CHARS: usize = 10;

pub const REPORT_TITLE: &str = "RADIOLOGY REPORT";

/// Labels that may only appear as headers. Occurrences inside free text are
/// rewritten to sentence case.
const RESERVED_LABELS: &[(&str, &str)] = &[
    (REPORT_TITLE, "Radiology report"),
    ("FINDINGS:", "Findings:"),
    ("IMPRESSION:", "Impression:"),
    ("RECOMMENDATIONS:", "Recommendations:"),
];

static ASTERISK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*+").expect("valid regex"));
static HASH_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#+").expect("valid regex"));
static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("valid regex"));
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strips emphasis markup and collapses whitespace onto a single line.
///
/// Removes runs of `*` and `#`, runs of two or more `_`, then collapses every
/// whitespace run to one space and trims.
pub fn clean_markup(raw: &str) -> String {
    let text = ASTERISK_RUNS.replace_all(raw, "");
    let text = HASH_RUNS.replace_all(&text, "");
    let text = UNDERSCORE_RUNS.replace_all(&text, "");
    let text = WHITESPACE_RUNS.replace_all(&text, " ");
    text.trim().to_string()
}

/// Locates the section opened by the first of `start_keywords` that yields
/// usable content.
///
/// Keywords are tried in the caller's order, each at its first occurrence.
/// The section ends at the nearest later occurrence of any
/// `boundary_keywords` entry other than the matched keyword, or at the end of
/// the text. Leading `:`, `-` and whitespace are stripped. A candidate shorter
/// than `MIN_SECTION_CHARS` is discarded and the next keyword is tried.
pub fn extract_section(
    text: &str,
    start_keywords: &[&str],
    boundary_keywords: &[&str],
) -> Option<String> {
    // ASCII lowering keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();

    start_keywords.iter().find_map(|kw| {
        let keyword = kw.to_ascii_lowercase();
        let start = lower.find(&keyword)? + keyword.len();
        let end = boundary_keywords
            .iter()
            .map(|b| b.to_ascii_lowercase())
            .filter(|b| *b != keyword)
            .filter_map(|b| lower[start..].find(&b).map(|pos| start + pos))
            .min()
            .unwrap_or(text.len());

        let section = text[start..end]
            .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
            .trim();

        (section.chars().count() >= MIN_SECTION_CHARS).then(|| section.to_string())
    })
}

/// Rewrites reserved header labels inside caller or model text so the only
/// upper-case occurrences left are the ones the layout emits itself.
pub fn defuse_reserved_labels(text: &str) -> String {
    RESERVED_LABELS
        .iter()
        .fold(text.to_string(), |acc, (label, plain)| acc.replace(label, plain))
}

/// Splits on `.`, `!` and `?`, trimming each piece and dropping empty ones.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
