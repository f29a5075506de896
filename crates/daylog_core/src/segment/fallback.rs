//! Summarizer seam and the local fallback summarizer.
//!
//! # Responsibility
//! - Define the synchronous `Summarizer` contract the merge path consumes.
//! - Provide a heuristic local summarizer with the same output limits as the
//!   remote one, so both feed the merge engine interchangeably.
//!
//! # Invariants
//! - Fallback output holds at most `MAX_PHRASES` phrases.
//! - Every fallback phrase has at least `MIN_WORDS` and at most `MAX_WORDS`
//!   words.

use crate::model::phrase_group::SummaryPayload;
use crate::segment::bullets::segment;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MIN_WORDS: usize = 3;
pub const MAX_WORDS: usize = 15;
pub const MAX_PHRASES: usize = 5;

/// Failure reported by a summarizer implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizerError {
    /// Backend could not be reached or is not configured.
    Unavailable(String),
    /// Backend answered with something that is not a usable payload.
    InvalidResponse(String),
}

impl Display for SummarizerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(details) => write!(f, "summarizer unavailable: {details}"),
            Self::InvalidResponse(details) => {
                write!(f, "summarizer returned invalid response: {details}")
            }
        }
    }
}

impl Error for SummarizerError {}

/// Turns an utterance into phrase groups.
///
/// Implementations that talk to remote services resolve their transport
/// before returning; the merge path itself never suspends.
pub trait Summarizer {
    fn summarize(&self, utterance: &str) -> Result<SummaryPayload, SummarizerError>;
}

/// Local heuristic summarizer built on the bullet segmenter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSummarizer;

impl Summarizer for FallbackSummarizer {
    fn summarize(&self, utterance: &str) -> Result<SummaryPayload, SummarizerError> {
        Ok(SummaryPayload::Ungrouped(fallback_phrases(utterance)))
    }
}

/// Segments `utterance` and applies the summarizer output limits.
pub fn fallback_phrases(utterance: &str) -> Vec<String> {
    segment(utterance)
        .into_iter()
        .filter_map(|piece| {
            let words: Vec<&str> = piece.split_whitespace().collect();
            if words.len() < MIN_WORDS {
                return None;
            }
            if words.len() > MAX_WORDS {
                return Some(words[..MAX_WORDS].join(" "));
            }
            Some(piece)
        })
        .take(MAX_PHRASES)
        .collect()
}

/// Uses `primary` when it succeeds, otherwise the local fallback.
pub fn summarize_with_fallback(
    primary: Option<&dyn Summarizer>,
    utterance: &str,
) -> SummaryPayload {
    if let Some(summarizer) = primary {
        match summarizer.summarize(utterance) {
            Ok(payload) => {
                info!(
                    "event=summarize module=segment status=ok source=primary phrases={}",
                    payload.phrase_count()
                );
                return payload;
            }
            Err(err) => {
                warn!(
                    "event=summarize module=segment status=fallback source=primary error={}",
                    err
                );
            }
        }
    }

    let phrases = fallback_phrases(utterance);
    info!(
        "event=summarize module=segment status=ok source=fallback phrases={}",
        phrases.len()
    );
    SummaryPayload::Ungrouped(phrases)
}
