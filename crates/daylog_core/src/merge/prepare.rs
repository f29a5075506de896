//! Normalization of phrase groups into merge instructions.
//!
//! # Invariants
//! - Groups with a missing date land on today.
//! - Groups whose date is present but unparseable are reported per group and
//!   only land on today when the caller opted into `DefaultToToday`.
//! - Group order is preserved.

use crate::dates::normalize::{DateNormalizer, DateParseError};
use crate::logging::sanitize_message;
use crate::model::phrase_group::{EntryGroup, SummaryPayload};
use crate::payload::MalformedGroup;
use log::{info, warn};
use serde::{Deserialize, Serialize};

const MAX_LOGGED_EXPRESSION_CHARS: usize = 60;

/// What to do with a group whose date expression fails to normalize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnparsedDatePolicy {
    /// Leave the group out of the batch and report it.
    #[default]
    Report,
    /// Report it and merge it under today's key.
    DefaultToToday,
}

/// Per-group normalization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFailure {
    /// Position of the group in the incoming payload.
    pub index: usize,
    pub error: DateParseError,
    /// Whether the group was merged under today's key anyway.
    pub defaulted_to_today: bool,
}

/// Merge-ready groups plus everything that was filtered on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedBatch {
    pub groups: Vec<EntryGroup>,
    pub failures: Vec<GroupFailure>,
    pub issues: Vec<MalformedGroup>,
}

impl PreparedBatch {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Normalizes every group of `payload` against `normalizer`.
///
/// # Errors
/// - Returns an error only when today's own key cannot be built.
pub fn prepare_groups(
    payload: &SummaryPayload,
    normalizer: &DateNormalizer,
    policy: UnparsedDatePolicy,
) -> Result<PreparedBatch, DateParseError> {
    let today = normalizer.today_key()?;
    let mut batch = PreparedBatch::default();

    match payload {
        SummaryPayload::Ungrouped(phrases) => {
            if !phrases.is_empty() {
                batch.groups.push(EntryGroup::from_phrases(today, phrases));
            }
        }
        SummaryPayload::Grouped(groups) => {
            for (index, group) in groups.iter().enumerate() {
                if group.phrases.is_empty() {
                    continue;
                }
                let Some(raw_date) = group.date.as_deref() else {
                    info!("event=group_prepare module=merge status=ok date_source=missing index={index}");
                    batch
                        .groups
                        .push(EntryGroup::from_phrases(today.clone(), &group.phrases));
                    continue;
                };

                match normalizer.normalize(raw_date) {
                    Ok(key) => batch
                        .groups
                        .push(EntryGroup::from_phrases(key, &group.phrases)),
                    Err(error) => {
                        let defaulted = policy == UnparsedDatePolicy::DefaultToToday;
                        warn!(
                            "event=group_prepare module=merge status=unparsed index={} defaulted={} expression={}",
                            index,
                            defaulted,
                            sanitize_message(raw_date, MAX_LOGGED_EXPRESSION_CHARS)
                        );
                        if defaulted {
                            batch
                                .groups
                                .push(EntryGroup::from_phrases(today.clone(), &group.phrases));
                        }
                        batch.failures.push(GroupFailure {
                            index,
                            error,
                            defaulted_to_today: defaulted,
                        });
                    }
                }
            }
        }
    }

    Ok(batch)
}
