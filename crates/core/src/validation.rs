//! Input validation utilities.
//!
//! Request checks accumulate into a [`Violations`] list instead of failing on the first bad
//! field, so a client sees every problem with a request in one response. Each helper returns
//! the parsed value on success and `None` after recording an issue, letting callers keep going
//! and build the resource only once [`Violations::finish`] succeeds.

use crate::error::FieldIssue;
use crate::{CoreError, CoreResult};
use chrono::{DateTime, Datelike, NaiveDate, SubsecRound, Utc};
use paeds_types::{NonEmptyText, TextError};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{L}[\p{L}\p{M}' .\-]*$").expect("name pattern is a valid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("phone pattern is a valid regex"));

static MRN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9\-]{4,20}$").expect("MRN pattern is a valid regex"));

/// Collected validation failures for one request.
#[derive(Debug, Default)]
pub struct Violations {
    issues: Vec<FieldIssue>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// `Ok(())` when nothing failed, otherwise [`CoreError::Validation`] with every issue.
    pub fn finish(self) -> CoreResult<()> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// The collected issues as an error, regardless of how many there are.
    pub fn into_error(self) -> CoreError {
        CoreError::Validation(self.issues)
    }

    /// Required free text of at most `max` characters, trimmed.
    pub fn text(&mut self, field: &str, value: &str, max: usize) -> Option<String> {
        match NonEmptyText::bounded(value, max) {
            Ok(text) => Some(text.into_string()),
            Err(TextError::Empty) => {
                self.add(field, "is required");
                None
            }
            Err(TextError::TooLong { max }) => {
                self.add(field, format!("must be at most {max} characters"));
                None
            }
        }
    }

    /// Optional free text; blank input is treated as absent.
    ///
    /// Returns `Ok(None)` for absent/blank, `Ok(Some)` for valid text and `Err(())` after
    /// recording an issue.
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<&str>,
        max: usize,
    ) -> Result<Option<String>, ()> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(v) => self.text(field, v, max).map(Some).ok_or(()),
        }
    }

    /// A personal name: starts with a letter; letters, combining marks, spaces, apostrophes,
    /// hyphens and periods only.
    pub fn name(&mut self, field: &str, value: &str, max: usize) -> Option<String> {
        let text = self.text(field, value, max)?;
        if !NAME_RE.is_match(&text) {
            self.add(
                field,
                "must start with a letter and contain only letters, spaces, apostrophes, hyphens or periods",
            );
            return None;
        }
        Some(text)
    }

    /// A phone number: optional leading `+`, then 7-20 digits, spaces, parentheses or hyphens.
    pub fn phone(&mut self, field: &str, value: &str) -> Option<String> {
        let value = value.trim();
        if !PHONE_RE.is_match(value) {
            self.add(field, "must be a phone number of 7-20 digits");
            return None;
        }
        Some(value.to_string())
    }

    /// A medical record number: 4-20 of `A-Z`, `0-9`, `-`.
    pub fn mrn(&mut self, field: &str, value: &str) -> Option<String> {
        let value = value.trim();
        if !MRN_RE.is_match(value) {
            self.add(
                field,
                "must be 4-20 uppercase letters, digits or hyphens",
            );
            return None;
        }
        Some(value.to_string())
    }

    /// A calendar date in `YYYY-MM-DD` form.
    pub fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        match parse_date(value) {
            Some(date) => Some(date),
            None => {
                self.add(field, "must be a valid date in YYYY-MM-DD format");
                None
            }
        }
    }

    /// An RFC 3339 timestamp, normalised to UTC.
    pub fn datetime(&mut self, field: &str, value: &str) -> Option<DateTime<Utc>> {
        match parse_datetime(value) {
            Some(dt) => Some(dt),
            None => {
                self.add(
                    field,
                    "must be an RFC 3339 date-time with offset, e.g. 2026-03-01T09:00:00Z",
                );
                None
            }
        }
    }

    /// One of an enumerated set of keys.
    pub fn one_of<T: FromStr>(&mut self, field: &str, value: &str, allowed: &[&str]) -> Option<T> {
        match value.trim().parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.add(field, format!("must be one of: {}", allowed.join(", ")));
                None
            }
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parse an RFC 3339 timestamp into UTC, truncated to whole seconds.
///
/// Instants that fall outside years 0000-9999 once moved to UTC are rejected, as
/// [`format_datetime`] could not render them back.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(0))
        .filter(|dt| is_representable(*dt))
}

/// Whether `value` renders as a four-digit-year RFC 3339 string.
pub fn is_representable(value: DateTime<Utc>) -> bool {
    (0..=9999).contains(&value.year())
}

/// Render a timestamp the way every resource and response carries it.
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
