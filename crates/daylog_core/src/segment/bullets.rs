//! Heuristic bullet segmenter.
//!
//! # Invariants
//! - Output order matches input order.
//! - Output pieces are non-empty, start with an uppercase letter when the
//!   first character has one, and carry no trailing `.`/`!`/`?`.

use once_cell::sync::Lazy;
use regex::Regex;

// Sentence ends, semicolons, and "and then"/"then" connectives, each with an
// optional leading comma.
static SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*,?\s*(?:\.(?:\s+|$)|;|\band\s+then\b|\bthen\b)\s*")
        .expect("valid segment split regex")
});
static TRAILING_PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+$").expect("valid trailing punctuation regex"));

/// Leading filler stripped once per piece; first match wins.
///
/// Longer openers come before `"I "` so they stay reachable.
pub const FILLER_PREFIXES: &[&str] = &[
    "I went and ",
    "I'm ",
    "I\u{2019}m ",
    "I had ",
    "I was ",
    "I did ",
    "I ",
    "then I ",
    "and I ",
    "so I ",
    "after that I ",
];

/// Splits an utterance into cleaned entries.
pub fn segment(utterance: &str) -> Vec<String> {
    SPLIT_RE
        .split(utterance)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .filter_map(clean_piece)
        .collect()
}

/// Cleans one candidate piece; `None` when nothing is left.
pub fn clean_piece(piece: &str) -> Option<String> {
    let stripped = strip_filler(piece.trim());
    let without_punctuation = TRAILING_PUNCTUATION_RE.replace(stripped, "");
    let cleaned = capitalize_first(without_punctuation.trim());
    (!cleaned.is_empty()).then_some(cleaned)
}

fn strip_filler(piece: &str) -> &str {
    for prefix in FILLER_PREFIXES {
        let matches = piece
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if matches {
            return piece[prefix.len()..].trim_start();
        }
    }
    piece
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
