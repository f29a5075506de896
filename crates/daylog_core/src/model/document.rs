//! Flat journal document model.
//!
//! # Responsibility
//! - Parse the flat text into an optional prologue plus ordered date sections.
//! - Serialize the model back to text byte-for-byte.
//! - Answer section lookups by canonical key (first occurrence wins).
//!
//! # Invariants
//! - Header lines are recognized by `is_header_line` only.
//! - Section order is the order encountered top to bottom.
//! - Untouched lines, including separator whitespace, are never normalized.
//! - Content before the first header is a prologue and never a merge target.

use crate::model::date_key::DateKey;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};

/// Prefix that marks a line as a journal entry.
pub const ENTRY_PREFIX: &str = "- ";

/// Whether a body line is an entry line (`"- "` prefixed).
pub fn is_entry_line(line: &str) -> bool {
    line.starts_with(ENTRY_PREFIX)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// One date header plus every line up to the next header or end of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    header: String,
    key: DateKey,
    lines: Vec<String>,
}

impl Section {
    /// Creates a programmatic section whose header line is exactly the key.
    pub fn new(key: DateKey, lines: Vec<String>) -> Self {
        Self {
            header: key.as_str().to_string(),
            key,
            lines,
        }
    }

    pub fn key(&self) -> &DateKey {
        &self.key
    }

    /// Header line exactly as it appeared in the source text.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Body lines (entries and incidental lines) in source order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Body lines that start with the entry prefix.
    pub fn entry_lines(&self) -> impl Iterator<Item = &String> {
        self.lines.iter().filter(|line| is_entry_line(line))
    }

    /// Lines an overwrite would discard, for confirmation prompts.
    ///
    /// Entry lines when any exist, otherwise every non-blank body line.
    pub fn preview_lines(&self) -> Vec<String> {
        let entries: Vec<String> = self.entry_lines().cloned().collect();
        if !entries.is_empty() {
            return entries;
        }
        self.lines
            .iter()
            .filter(|line| !is_blank(line))
            .cloned()
            .collect()
    }

    /// Inserts lines at the bottom of the section body.
    ///
    /// Trailing blank lines stay below the inserted lines so an existing
    /// separator before the next header is kept.
    pub(crate) fn append_lines(&mut self, new_lines: Vec<String>) {
        let at = self
            .lines
            .iter()
            .rposition(|line| !is_blank(line))
            .map_or(0, |index| index + 1);
        self.lines.splice(at..at, new_lines);
    }

    /// Replaces the full body span with `new_lines`.
    pub(crate) fn replace_lines(&mut self, new_lines: Vec<String>) {
        self.lines = new_lines;
    }

    fn ends_with_blank_line(&self) -> bool {
        self.lines.last().is_some_and(|line| is_blank(line))
    }
}

/// Parsed view of the flat journal text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    prologue: Vec<String>,
    sections: Vec<Section>,
    trailing_newline: bool,
}

impl Document {
    /// Parses flat text. Never fails: any text is a valid document.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }

        let (body, trailing_newline) = match text.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (text, false),
        };

        let mut prologue = Vec::new();
        let mut sections: Vec<Section> = Vec::new();
        for line in body.split('\n') {
            if let Some(key) = DateKey::from_header_line(line) {
                sections.push(Section {
                    header: line.to_string(),
                    key,
                    lines: Vec::new(),
                });
            } else if let Some(section) = sections.last_mut() {
                section.lines.push(line.to_string());
            } else {
                prologue.push(line.to_string());
            }
        }

        Self {
            prologue,
            sections,
            trailing_newline,
        }
    }

    /// Serializes back to flat text.
    pub fn serialize(&self) -> String {
        let mut out: Vec<&str> = self.prologue.iter().map(String::as_str).collect();
        for section in &self.sections {
            out.push(section.header.as_str());
            out.extend(section.lines.iter().map(String::as_str));
        }

        let mut text = out.join("\n");
        if self.trailing_newline {
            text.push('\n');
        }
        text
    }

    /// Lines before the first header.
    pub fn prologue(&self) -> &[String] {
        &self.prologue
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Whether the document holds no lines at all.
    pub fn is_empty(&self) -> bool {
        self.prologue.is_empty() && self.sections.is_empty()
    }

    /// Builds a fresh key -> position lookup. The first occurrence of a
    /// repeated header wins.
    pub fn key_index(&self) -> HashMap<DateKey, usize> {
        let mut index = HashMap::with_capacity(self.sections.len());
        for (position, section) in self.sections.iter().enumerate() {
            index.entry(section.key.clone()).or_insert(position);
        }
        index
    }

    /// Position of the first section with `key`.
    pub fn position_of(&self, key: &DateKey) -> Option<usize> {
        self.sections.iter().position(|section| &section.key == key)
    }

    /// First section with `key`.
    pub fn section(&self, key: &DateKey) -> Option<&Section> {
        self.position_of(key).map(|position| &self.sections[position])
    }

    pub fn has_section(&self, key: &DateKey) -> bool {
        self.position_of(key).is_some()
    }

    /// Body lines of the first section with `key`, or empty.
    pub fn section_content(&self, key: &DateKey) -> &[String] {
        self.section(key).map(Section::lines).unwrap_or_default()
    }

    /// Keys that head more than one section, in first-seen order.
    pub fn duplicate_headers(&self) -> Vec<DateKey> {
        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        let mut duplicates = Vec::new();
        for section in &self.sections {
            if !seen.insert(section.key.clone()) && reported.insert(section.key.clone()) {
                duplicates.push(section.key.clone());
            }
        }
        duplicates
    }

    pub(crate) fn section_mut(&mut self, position: usize) -> Option<&mut Section> {
        self.sections.get_mut(position)
    }

    /// Appends a new section at the end and returns its position.
    ///
    /// A blank separator line is added first unless the document is empty or
    /// already ends with a blank line.
    pub(crate) fn push_section(&mut self, section: Section) -> usize {
        if !self.ends_with_blank_line() && !self.is_empty() {
            match self.sections.last_mut() {
                Some(last) => last.lines.push(String::new()),
                None => self.prologue.push(String::new()),
            }
        }
        self.sections.push(section);
        self.sections.len() - 1
    }

    fn ends_with_blank_line(&self) -> bool {
        match self.sections.last() {
            Some(last) => last.ends_with_blank_line(),
            None => self.prologue.last().is_some_and(|line| is_blank(line)),
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.serialize())
    }
}
