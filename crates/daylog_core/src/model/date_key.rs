//! Canonical `M.D.YYYY` date key.
//!
//! # Responsibility
//! - Recognize section header lines inside the flat journal text.
//! - Build canonical keys from calendar dates.
//!
//! # Invariants
//! - Keys compare by exact string value; `1.1.2025` and `01.01.2025` differ.
//! - Keys produced by `from_date` never carry leading zeros and always have a
//!   four-digit year.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

// Header recognition accepts zero-padded components so hand-edited headers
// still terminate the previous section.
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").expect("valid header regex"));
static CANONICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9]\d?\.[1-9]\d?\.\d{4}$").expect("valid canonical regex"));

/// Section identity and display string, e.g. `9.21.2025`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(String);

/// Rejected key construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateKeyError {
    /// Value does not have the canonical `M.D.YYYY` shape.
    NotCanonical(String),
    /// Shape is canonical but the calendar date does not exist.
    NoSuchDate(String),
    /// Year cannot be written with exactly four digits.
    YearOutOfRange(i32),
}

impl Display for DateKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotCanonical(value) => write!(f, "`{value}` is not a canonical M.D.YYYY key"),
            Self::NoSuchDate(value) => write!(f, "`{value}` is not a real calendar date"),
            Self::YearOutOfRange(year) => write!(f, "year {year} is not a four-digit year"),
        }
    }
}

impl Error for DateKeyError {}

impl DateKey {
    /// Builds the canonical key for a calendar date.
    pub fn from_date(date: NaiveDate) -> Result<Self, DateKeyError> {
        let year = date.year();
        if !(1000..=9999).contains(&year) {
            return Err(DateKeyError::YearOutOfRange(year));
        }
        Ok(Self(format!("{}.{}.{}", date.month(), date.day(), year)))
    }

    /// Parses a strictly canonical key that names a real calendar date.
    pub fn parse_canonical(value: &str) -> Result<Self, DateKeyError> {
        let trimmed = value.trim();
        if !CANONICAL_RE.is_match(trimmed) {
            return Err(DateKeyError::NotCanonical(value.to_string()));
        }
        let key = Self(trimmed.to_string());
        if key.to_date().is_none() {
            return Err(DateKeyError::NoSuchDate(trimmed.to_string()));
        }
        Ok(key)
    }

    /// Returns the key named by a header line, if the line is a header.
    ///
    /// A line is a header iff its trimmed form matches `M.D.YYYY` exactly.
    pub fn from_header_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        HEADER_RE
            .is_match(trimmed)
            .then(|| Self(trimmed.to_string()))
    }

    /// Whether this key has the strict canonical shape (no leading zeros).
    pub fn is_canonical(&self) -> bool {
        CANONICAL_RE.is_match(&self.0)
    }

    /// Calendar date named by this key, when it names a real one.
    pub fn to_date(&self) -> Option<NaiveDate> {
        let mut parts = self.0.split('.');
        let month = parts.next()?.parse::<u32>().ok()?;
        let day = parts.next()?.parse::<u32>().ok()?;
        let year = parts.next()?.parse::<i32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether a raw document line is a section header.
pub fn is_header_line(line: &str) -> bool {
    HEADER_RE.is_match(line.trim())
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DateKey {
    type Error = DateKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_canonical(&value)
    }
}

impl From<DateKey> for String {
    fn from(value: DateKey) -> Self {
        value.0
    }
}
