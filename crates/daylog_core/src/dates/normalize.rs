//! Date normalizer.
//!
//! # Responsibility
//! - Recognize seven date grammars: canonical dotted, numeric with year,
//!   numeric without year, `today`, `yesterday`, weekday names (optionally
//!   `last`), and month name + day (+ optional year).
//! - Resolve relative forms against an injected "today".
//!
//! # Invariants
//! - Every success is a strict canonical key (`^\d{1,2}\.\d{1,2}\.\d{4}$`,
//!   no leading zeros).
//! - Unrecognized input is always `DateParseError`; nothing defaults to today
//!   here. Callers that want a default must apply it themselves.

use crate::model::date_key::{DateKey, DateKeyError};
use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DOTTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").expect("valid dotted regex"));
static NUMERIC_WITH_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").expect("valid numeric date regex")
});
static NUMERIC_NO_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})$").expect("valid month/day regex"));
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(last)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)$")
        .expect("valid weekday regex")
});
static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|august|aug|september|sept|sep|october|oct|november|nov|december|dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s+(\d{4}))?$",
    )
    .expect("valid month name regex")
});

/// Source of the current calendar date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Date normalization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    /// Input matches none of the recognized grammars.
    Unrecognized(String),
    /// Grammar matched but the values do not form a real date.
    InvalidDate { expression: String, reason: String },
}

impl DateParseError {
    /// Raw expression that failed to normalize.
    pub fn expression(&self) -> &str {
        match self {
            Self::Unrecognized(expression) => expression,
            Self::InvalidDate { expression, .. } => expression,
        }
    }
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrecognized(expression) => {
                write!(f, "unrecognized date expression: `{expression}`")
            }
            Self::InvalidDate { expression, reason } => {
                write!(f, "invalid date `{expression}`: {reason}")
            }
        }
    }
}

impl Error for DateParseError {}

/// Normalizer bound to one "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    today: NaiveDate,
}

impl DateNormalizer {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Reads today once from `clock`.
    pub fn from_clock(clock: &impl Clock) -> Self {
        Self::new(clock.today())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Canonical key for today.
    pub fn today_key(&self) -> Result<DateKey, DateParseError> {
        to_key("today", self.today)
    }

    /// Normalizes one date expression.
    pub fn normalize(&self, expression: &str) -> Result<DateKey, DateParseError> {
        let compact = expression.split_whitespace().collect::<Vec<_>>().join(" ");
        if compact.is_empty() {
            return Err(DateParseError::Unrecognized(expression.to_string()));
        }

        if let Ok(key) = DateKey::parse_canonical(&compact) {
            return Ok(key);
        }
        if let Some(caps) = DOTTED_RE.captures(&compact) {
            return from_parts(expression, &caps[1], &caps[2], Some(&caps[3]), self.today);
        }
        if let Some(caps) = NUMERIC_WITH_YEAR_RE.captures(&compact) {
            return from_parts(expression, &caps[1], &caps[2], Some(&caps[3]), self.today);
        }
        if let Some(caps) = NUMERIC_NO_YEAR_RE.captures(&compact) {
            return from_parts(expression, &caps[1], &caps[2], None, self.today);
        }

        let lowered = compact.to_lowercase();
        match lowered.as_str() {
            "today" => return to_key(expression, self.today),
            "yesterday" => {
                let date = self.today.pred_opt().ok_or_else(|| DateParseError::InvalidDate {
                    expression: expression.to_string(),
                    reason: "no day before today".to_string(),
                })?;
                return to_key(expression, date);
            }
            _ => {}
        }

        if let Some(caps) = WEEKDAY_RE.captures(&lowered) {
            let weekday = weekday_from_name(&caps[2])
                .ok_or_else(|| DateParseError::Unrecognized(expression.to_string()))?;
            let date = past_weekday(self.today, weekday, caps.get(1).is_some()).ok_or_else(
                || DateParseError::InvalidDate {
                    expression: expression.to_string(),
                    reason: "weekday lookup underflowed the calendar".to_string(),
                },
            )?;
            return to_key(expression, date);
        }

        if let Some(caps) = MONTH_DAY_RE.captures(&lowered) {
            let month = month_from_name(&caps[1])
                .ok_or_else(|| DateParseError::Unrecognized(expression.to_string()))?;
            return from_parts(
                expression,
                &month.to_string(),
                &caps[2],
                caps.get(3).map(|year| year.as_str()),
                self.today,
            );
        }

        Err(DateParseError::Unrecognized(expression.to_string()))
    }
}

/// Normalizes `expression` against an explicit `today`.
pub fn normalize_date(expression: &str, today: NaiveDate) -> Result<DateKey, DateParseError> {
    DateNormalizer::new(today).normalize(expression)
}

/// Most recent `weekday` on or before `today`; `last` steps back a further week.
fn past_weekday(today: NaiveDate, weekday: Weekday, last: bool) -> Option<NaiveDate> {
    let current = today.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let mut days_back = u64::from((current + 7 - target) % 7);
    if last {
        days_back += 7;
    }
    today.checked_sub_days(Days::new(days_back))
}

fn from_parts(
    expression: &str,
    month: &str,
    day: &str,
    year: Option<&str>,
    today: NaiveDate,
) -> Result<DateKey, DateParseError> {
    let invalid = |reason: &str| DateParseError::InvalidDate {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };
    let month = month.parse::<u32>().map_err(|_| invalid("month is not a number"))?;
    let day = day.parse::<u32>().map_err(|_| invalid("day is not a number"))?;
    let year = match year {
        Some(value) => value.parse::<i32>().map_err(|_| invalid("year is not a number"))?,
        None => today.year(),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| invalid("no such day in the calendar"))?;
    to_key(expression, date)
}

fn to_key(expression: &str, date: NaiveDate) -> Result<DateKey, DateParseError> {
    DateKey::from_date(date).map_err(|err: DateKeyError| DateParseError::InvalidDate {
        expression: expression.to_string(),
        reason: err.to_string(),
    })
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    match name {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sept" | "sep" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}
