//! Summarizer JSON boundary validation.
//!
//! # Responsibility
//! - Turn the loosely typed summarizer JSON into strict `PhraseGroup`s.
//! - Filter malformed groups and phrases here, so the merge engine only ever
//!   sees well-formed input.
//!
//! # Invariants
//! - Malformed groups are recorded as `MalformedGroup` issues, never fatal.
//! - Only an absent or `null` date becomes `date: None`. A blank string is kept
//!   as an expression so normalization reports it; a non-string date is
//!   malformed, not missing.
//! - Only an unusable top-level shape or invalid JSON is an error.
//!
//! Accepted shapes:
//! - `[{"date": "...", "phrases": ["..."]}, ...]`
//! - `{"groups": [ ...same as above... ]}`
//! - `{"date": "...", "phrases": [...]}` (single group)
//! - `["phrase", ...]` or `{"phrases": [...]}` without a date (ungrouped)

use crate::model::phrase_group::{PhraseGroup, SummaryPayload};
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why one group was dropped or trimmed at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MalformedReason {
    /// Group entry is not a JSON object.
    NotAnObject,
    /// `date` is present but not a string.
    DateNotAString,
    /// `phrases` is missing or not an array.
    MissingPhrases,
    /// Some phrases were non-string or blank and were discarded.
    DiscardedPhrases { count: usize },
    /// No usable phrase remained; the group was dropped.
    NoUsablePhrases,
}

/// Boundary issue for one incoming group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedGroup {
    /// Zero-based position in the incoming array.
    pub index: usize,
    #[serde(flatten)]
    pub reason: MalformedReason,
}

impl Display for MalformedGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            MalformedReason::NotAnObject => write!(f, "group {} is not an object", self.index),
            MalformedReason::DateNotAString => {
                write!(f, "group {} has a non-string date", self.index)
            }
            MalformedReason::MissingPhrases => {
                write!(f, "group {} has no phrases array", self.index)
            }
            MalformedReason::DiscardedPhrases { count } => {
                write!(f, "group {} had {count} unusable phrases", self.index)
            }
            MalformedReason::NoUsablePhrases => {
                write!(f, "group {} has no usable phrases", self.index)
            }
        }
    }
}

/// Validated payload plus the issues found while validating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPayload {
    pub payload: SummaryPayload,
    pub issues: Vec<MalformedGroup>,
}

/// Payload that cannot be interpreted at all.
#[derive(Debug)]
pub enum PayloadError {
    Json(serde_json::Error),
    UnsupportedShape(&'static str),
}

impl Display for PayloadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid summarizer JSON: {err}"),
            Self::UnsupportedShape(details) => {
                write!(f, "unsupported summarizer payload: {details}")
            }
        }
    }
}

impl Error for PayloadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::UnsupportedShape(_) => None,
        }
    }
}

impl From<serde_json::Error> for PayloadError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parses and validates summarizer JSON text.
pub fn parse_summary_json(text: &str) -> Result<ParsedPayload, PayloadError> {
    let value: Value = serde_json::from_str(text)?;
    payload_from_value(&value)
}

/// Validates an already decoded summarizer JSON value.
pub fn payload_from_value(value: &Value) -> Result<ParsedPayload, PayloadError> {
    match value {
        Value::Array(items) => Ok(from_array(items)),
        Value::Object(object) => {
            if let Some(groups) = object.get("groups") {
                let items = groups
                    .as_array()
                    .ok_or(PayloadError::UnsupportedShape("`groups` is not an array"))?;
                return Ok(grouped(items));
            }
            if !object.contains_key("phrases") {
                return Err(PayloadError::UnsupportedShape(
                    "object has neither `groups` nor `phrases`",
                ));
            }
            if object.contains_key("date") {
                return Ok(grouped(std::slice::from_ref(value)));
            }
            let mut issues = Vec::new();
            let phrases = validate_phrases(object, 0, &mut issues).unwrap_or_default();
            Ok(ParsedPayload {
                payload: SummaryPayload::Ungrouped(phrases),
                issues,
            })
        }
        _ => Err(PayloadError::UnsupportedShape(
            "expected a JSON array or object",
        )),
    }
}

fn from_array(items: &[Value]) -> ParsedPayload {
    let all_strings = !items.is_empty() && items.iter().all(Value::is_string);
    if all_strings {
        let (phrases, discarded) = clean_phrases(items);
        let issues = if discarded > 0 {
            vec![MalformedGroup {
                index: 0,
                reason: MalformedReason::DiscardedPhrases { count: discarded },
            }]
        } else {
            Vec::new()
        };
        return ParsedPayload {
            payload: SummaryPayload::Ungrouped(phrases),
            issues,
        };
    }
    grouped(items)
}

fn grouped(items: &[Value]) -> ParsedPayload {
    let mut issues = Vec::new();
    let mut groups = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            issues.push(MalformedGroup {
                index,
                reason: MalformedReason::NotAnObject,
            });
            continue;
        };

        let date = match object.get("date") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(raw.trim().to_string()),
            Some(_) => {
                issues.push(MalformedGroup {
                    index,
                    reason: MalformedReason::DateNotAString,
                });
                continue;
            }
        };

        if let Some(phrases) = validate_phrases(object, index, &mut issues) {
            groups.push(PhraseGroup { date, phrases });
        }
    }

    ParsedPayload {
        payload: SummaryPayload::Grouped(groups),
        issues,
    }
}

fn validate_phrases(
    object: &Map<String, Value>,
    index: usize,
    issues: &mut Vec<MalformedGroup>,
) -> Option<Vec<String>> {
    let Some(raw) = object.get("phrases").and_then(Value::as_array) else {
        issues.push(MalformedGroup {
            index,
            reason: MalformedReason::MissingPhrases,
        });
        return None;
    };

    let (phrases, discarded) = clean_phrases(raw);
    if discarded > 0 {
        issues.push(MalformedGroup {
            index,
            reason: MalformedReason::DiscardedPhrases { count: discarded },
        });
    }
    if phrases.is_empty() {
        issues.push(MalformedGroup {
            index,
            reason: MalformedReason::NoUsablePhrases,
        });
        return None;
    }
    Some(phrases)
}

/// Keeps trimmed, non-empty, single-line string phrases.
fn clean_phrases(raw: &[Value]) -> (Vec<String>, usize) {
    let mut phrases = Vec::with_capacity(raw.len());
    let mut discarded = 0;
    for value in raw {
        match value.as_str().map(str::trim) {
            Some(phrase) if !phrase.is_empty() && !phrase.contains(['\n', '\r']) => {
                phrases.push(phrase.to_string());
            }
            _ => discarded += 1,
        }
    }
    (phrases, discarded)
}
