//! Merge/overwrite engine.
//!
//! # Responsibility
//! - Append entries under existing or new date sections.
//! - Replace the body of selected sections wholesale.
//!
//! # Invariants
//! - Existing sections are never reordered; new sections go to the end.
//! - A merge never creates a second header for a key; the first occurrence
//!   of a key is always the target.
//! - `overwrite_selected` with no selected dates is byte-identical to `append`.
//! - Operations work on a copy; errors return the input untouched.
//!
//! # See also
//! - `merge::conflict` for the report shown before choosing an operation.

use crate::model::date_key::{is_header_line, DateKey};
use crate::model::document::{Document, Section};
use crate::model::phrase_group::{to_entry_line, EntryGroup};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Handling of documents that repeat a header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateHeaderPolicy {
    /// Target the first section with the key; later ones are left alone.
    #[default]
    FirstMatch,
    /// Refuse to merge into a document with repeated headers.
    Reject,
}

/// Engine options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub duplicate_headers: DuplicateHeaderPolicy,
}

/// Merge failure. The input document is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// Group date is not a strict canonical key.
    InvalidGroupDate(String),
    /// Entry is blank or spans more than one line.
    InvalidEntry { date: DateKey, entry: String },
    /// Document repeats a header while duplicates are rejected.
    DuplicateHeader(DateKey),
    /// Produced document failed its consistency check.
    InvariantViolation(String),
}

impl Display for MergeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGroupDate(date) => write!(f, "group date `{date}` is not canonical"),
            Self::InvalidEntry { date, entry } => {
                write!(f, "invalid entry for {date}: `{}`", entry.escape_debug())
            }
            Self::DuplicateHeader(date) => write!(f, "document repeats header {date}"),
            Self::InvariantViolation(details) => {
                write!(f, "merge invariant violated: {details}")
            }
        }
    }
}

impl Error for MergeError {}

/// Stateless engine configured with `MergeOptions`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine {
    options: MergeOptions,
}

impl MergeEngine {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> MergeOptions {
        self.options
    }

    /// Adds every group's entries without removing any existing content.
    ///
    /// Groups without entries are skipped. Any other invalid group (non-canonical
    /// date, blank or multiline entry) fails the whole batch.
    pub fn append(&self, doc: &Document, groups: &[EntryGroup]) -> Result<Document, MergeError> {
        self.apply(doc, groups, &[])
    }

    /// Replaces the bodies of `dates_to_overwrite`; other groups append.
    ///
    /// When several groups share an overwritten date, the first replaces the
    /// body and the rest append below it. Groups without entries are skipped
    /// and never clear a section.
    pub fn overwrite_selected(
        &self,
        doc: &Document,
        groups: &[EntryGroup],
        dates_to_overwrite: &[DateKey],
    ) -> Result<Document, MergeError> {
        self.apply(doc, groups, dates_to_overwrite)
    }

    fn apply(
        &self,
        doc: &Document,
        groups: &[EntryGroup],
        dates_to_overwrite: &[DateKey],
    ) -> Result<Document, MergeError> {
        let result = self.apply_inner(doc, groups, dates_to_overwrite);
        match &result {
            Ok(_) => info!(
                "event=merge_apply module=merge status=ok groups={} overwrite_dates={}",
                groups.len(),
                dates_to_overwrite.len()
            ),
            Err(err) => error!(
                "event=merge_apply module=merge status=error groups={} error={}",
                groups.len(),
                err
            ),
        }
        result
    }

    fn apply_inner(
        &self,
        doc: &Document,
        groups: &[EntryGroup],
        dates_to_overwrite: &[DateKey],
    ) -> Result<Document, MergeError> {
        if self.options.duplicate_headers == DuplicateHeaderPolicy::Reject {
            if let Some(key) = doc.duplicate_headers().into_iter().next() {
                return Err(MergeError::DuplicateHeader(key));
            }
        }

        let instructions = groups
            .iter()
            .filter(|group| !group.entries.is_empty())
            .map(|group| Ok((group.date.clone(), entry_lines(group)?)))
            .collect::<Result<Vec<_>, MergeError>>()?;
        let skipped = groups.len() - instructions.len();
        if skipped > 0 {
            info!("event=merge_apply module=merge status=skip empty_groups={skipped}");
        }

        let overwrite: HashSet<&DateKey> = dates_to_overwrite.iter().collect();
        let mut replaced: HashSet<DateKey> = HashSet::new();
        let mut next = doc.clone();
        let mut index = next.key_index();

        for (key, lines) in instructions {
            let wants_overwrite = overwrite.contains(&key) && !replaced.contains(&key);
            match index.get(&key).copied() {
                None => {
                    let position = next.push_section(Section::new(key.clone(), lines));
                    index.insert(key.clone(), position);
                }
                Some(position) => {
                    let section = next.section_mut(position).ok_or_else(|| {
                        MergeError::InvariantViolation(format!(
                            "lookup for {key} points past the last section"
                        ))
                    })?;
                    if wants_overwrite {
                        section.replace_lines(lines);
                    } else {
                        section.append_lines(lines);
                    }
                }
            }
            if wants_overwrite {
                replaced.insert(key);
            }
        }

        verify(&next)?;
        Ok(next)
    }
}

/// Appends with default options.
pub fn append(doc: &Document, groups: &[EntryGroup]) -> Result<Document, MergeError> {
    MergeEngine::default().append(doc, groups)
}

/// Selectively overwrites with default options.
pub fn overwrite_selected(
    doc: &Document,
    groups: &[EntryGroup],
    dates_to_overwrite: &[DateKey],
) -> Result<Document, MergeError> {
    MergeEngine::default().overwrite_selected(doc, groups, dates_to_overwrite)
}

fn entry_lines(group: &EntryGroup) -> Result<Vec<String>, MergeError> {
    if !group.date.is_canonical() || group.date.to_date().is_none() {
        return Err(MergeError::InvalidGroupDate(group.date.to_string()));
    }
    group
        .entries
        .iter()
        .map(|entry| {
            if entry.trim().is_empty() || entry.contains(['\n', '\r']) {
                return Err(MergeError::InvalidEntry {
                    date: group.date.clone(),
                    entry: entry.clone(),
                });
            }
            Ok(to_entry_line(entry))
        })
        .collect()
}

/// Checks that the produced document survives a serialize/parse cycle.
fn verify(doc: &Document) -> Result<(), MergeError> {
    for section in doc.sections() {
        if let Some(line) = section.lines().iter().find(|line| is_header_line(line)) {
            return Err(MergeError::InvariantViolation(format!(
                "header-shaped line `{line}` inside body of {}",
                section.key()
            )));
        }
    }
    if Document::parse(&doc.serialize()) != *doc {
        return Err(MergeError::InvariantViolation(
            "document does not round-trip through its text form".to_string(),
        ));
    }
    Ok(())
}
