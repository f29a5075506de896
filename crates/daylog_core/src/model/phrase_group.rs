//! Phrase groups before and after date normalization.
//!
//! # Invariants
//! - `PhraseGroup` phrases are non-empty trimmed strings once they leave the
//!   payload boundary.
//! - `EntryGroup` dates are canonical keys; entries are `"- "` prefixed lines.

use crate::model::date_key::DateKey;
use crate::model::document::ENTRY_PREFIX;
use serde::Serialize;

/// Summarizer output for one date, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseGroup {
    /// Raw date expression. `None` when the summarizer omitted it.
    pub date: Option<String>,
    pub phrases: Vec<String>,
}

impl PhraseGroup {
    pub fn new(date: impl Into<String>, phrases: Vec<String>) -> Self {
        Self {
            date: Some(date.into()),
            phrases,
        }
    }

    /// Group whose date was not provided by the summarizer.
    pub fn undated(phrases: Vec<String>) -> Self {
        Self {
            date: None,
            phrases,
        }
    }
}

/// Whole summarizer result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SummaryPayload {
    /// Explicit per-date grouping.
    Grouped(Vec<PhraseGroup>),
    /// A single ungrouped list of phrases; it always lands on today.
    Ungrouped(Vec<String>),
}

impl SummaryPayload {
    /// Number of phrases across all groups.
    pub fn phrase_count(&self) -> usize {
        match self {
            Self::Grouped(groups) => groups.iter().map(|group| group.phrases.len()).sum(),
            Self::Ungrouped(phrases) => phrases.len(),
        }
    }
}

/// Normalized merge instruction for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryGroup {
    pub date: DateKey,
    pub entries: Vec<String>,
}

impl EntryGroup {
    pub fn new(date: DateKey, entries: Vec<String>) -> Self {
        Self { date, entries }
    }

    /// Builds a group from bare phrases, prefixing each as an entry line.
    pub fn from_phrases(date: DateKey, phrases: &[String]) -> Self {
        Self {
            date,
            entries: phrases.iter().map(|phrase| to_entry_line(phrase)).collect(),
        }
    }
}

/// Formats one phrase as an entry line; already prefixed phrases are kept.
pub fn to_entry_line(phrase: &str) -> String {
    let trimmed = phrase.trim();
    if trimmed.starts_with(ENTRY_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{ENTRY_PREFIX}{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::{to_entry_line, SummaryPayload};

    #[test]
    fn entry_line_prefix_is_idempotent() {
        assert_eq!(to_entry_line("walked the dog"), "- walked the dog");
        assert_eq!(to_entry_line("  - walked the dog "), "- walked the dog");
    }

    #[test]
    fn ungrouped_payload_counts_phrases() {
        let payload = SummaryPayload::Ungrouped(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(payload.phrase_count(), 2);
    }
}
