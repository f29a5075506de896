//! Conflict detection between incoming groups and the current document.
//!
//! # Invariants
//! - `affected_dates` keeps first-seen group order and has no duplicates.
//! - `existing_dates` is an ordered subset of its `affected` input.
//! - `preview` keeps the order of the dates it was asked for, in memory and
//!   in its JSON object form.

use crate::model::date_key::DateKey;
use crate::model::document::Document;
use crate::model::phrase_group::EntryGroup;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Current lines per date, in request order.
pub type Preview = Vec<(DateKey, Vec<String>)>;

/// What the caller shows before choosing append / overwrite / cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Dates the incoming groups would touch.
    pub affected: Vec<DateKey>,
    /// Affected dates that already have a section.
    pub existing: Vec<DateKey>,
    /// Current content of each existing date, as an overwrite would lose it.
    #[serde(serialize_with = "serialize_preview")]
    pub preview: Preview,
}

impl ConflictReport {
    pub fn build(doc: &Document, groups: &[EntryGroup]) -> Self {
        let affected = affected_dates(groups);
        let existing = existing_dates(doc, &affected);
        let preview = preview(doc, &existing);
        Self {
            affected,
            existing,
            preview,
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.existing.is_empty()
    }

    /// Preview lines for `key`, if it is an existing date.
    pub fn preview_for(&self, key: &DateKey) -> Option<&[String]> {
        self.preview
            .iter()
            .find(|(date, _)| date == key)
            .map(|(_, lines)| lines.as_slice())
    }
}

/// Distinct dates touched by `groups`, in group order.
pub fn affected_dates(groups: &[EntryGroup]) -> Vec<DateKey> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .filter(|group| seen.insert(group.date.clone()))
        .map(|group| group.date.clone())
        .collect()
}

/// Members of `affected` that already head a section of `doc`.
pub fn existing_dates(doc: &Document, affected: &[DateKey]) -> Vec<DateKey> {
    let index = doc.key_index();
    affected
        .iter()
        .filter(|key| index.contains_key(*key))
        .cloned()
        .collect()
}

/// Preview lines for each requested date; absent dates map to no lines.
/// Repeated dates appear once, at their first position.
pub fn preview(doc: &Document, dates: &[DateKey]) -> Preview {
    let mut seen = HashSet::new();
    dates
        .iter()
        .filter(|key| seen.insert(*key))
        .map(|key| {
            let lines = doc
                .section(key)
                .map(|section| section.preview_lines())
                .unwrap_or_default();
            (key.clone(), lines)
        })
        .collect()
}

fn serialize_preview<S: Serializer>(preview: &Preview, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(preview.iter().map(|(key, lines)| (key, lines)))
}
