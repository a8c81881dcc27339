//! Lock duration parsing and precedence.
//!
//! A duration can be given as text (`"5 minutes"`, `"-1 minute"`,
//! `"1 hour 30 minutes"`, `"2 days ago"`, an RFC 3339 timestamp, or a plain
//! `YYYY-MM-DD[ HH:MM:SS]` UTC timestamp), as a `chrono::Duration`, or as an
//! absolute `DateTime<Utc>`. The words `now`, `today`, `midnight`,
//! `tomorrow` and `yesterday` are accepted too; the day words mean midnight
//! UTC of that day.
//!
//! Empty values (blank text, `"0"`, or any zero-length offset) are treated as
//! unset and fall through to the next precedence level. `now` is not empty.
//! Like negative offsets and past timestamps it is honoured literally and
//! produces an already-expired lock.

use crate::error::{LockingError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Fallback used when no other precedence level supplies a duration.
pub const HARD_DEFAULT_DURATION: &str = "5 minutes";

static RELATIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[+-]?\d+\s*[a-z]+\s*)+(?:ago)?$").expect("Invalid relative duration regex")
});

static TERM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([+-]?\d+)\s*([a-z]+)").expect("Invalid duration term regex")
});

/// A duration as supplied by a caller or by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationInput {
    /// Text to be parsed.
    Text(String),
    /// Offset from the moment of locking.
    Span(Duration),
    /// Absolute expiry timestamp.
    Until(DateTime<Utc>),
}

/// A parsed, non-empty duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockDuration {
    Relative(Duration),
    Until(DateTime<Utc>),
    /// Midnight UTC, `days` after the day of locking.
    StartOfDay(i64),
}

impl LockDuration {
    /// Resolve to the expiry timestamp for a lock taken at `now`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self {
            LockDuration::Relative(offset) => now.checked_add_signed(*offset).ok_or_else(|| {
                LockingError::InvalidDuration(format!(
                    "offset of {} seconds is out of range",
                    offset.num_seconds()
                ))
            }),
            LockDuration::Until(at) => Ok(*at),
            LockDuration::StartOfDay(days) => Duration::try_days(*days)
                .and_then(|offset| now.date_naive().checked_add_signed(offset))
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|midnight| midnight.and_utc())
                .ok_or_else(|| {
                    LockingError::InvalidDuration(format!("day offset {} is out of range", days))
                }),
        }
    }
}

impl DurationInput {
    /// Parse this input.
    ///
    /// Returns `Ok(None)` for empty values so the caller can move on to the
    /// next precedence level.
    pub fn parse(&self) -> Result<Option<LockDuration>> {
        match self {
            DurationInput::Text(text) => parse_text(text),
            DurationInput::Span(span) if span.is_zero() => Ok(None),
            DurationInput::Span(span) => Ok(Some(LockDuration::Relative(*span))),
            DurationInput::Until(at) => Ok(Some(LockDuration::Until(*at))),
        }
    }
}

impl fmt::Display for DurationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationInput::Text(text) => write!(f, "{}", text),
            DurationInput::Span(span) => write!(f, "{} seconds", span.num_seconds()),
            DurationInput::Until(at) => write!(f, "{}", at.to_rfc3339()),
        }
    }
}

impl From<&str> for DurationInput {
    fn from(text: &str) -> Self {
        DurationInput::Text(text.to_string())
    }
}

impl From<String> for DurationInput {
    fn from(text: String) -> Self {
        DurationInput::Text(text)
    }
}

impl From<Duration> for DurationInput {
    fn from(span: Duration) -> Self {
        DurationInput::Span(span)
    }
}

impl From<DateTime<Utc>> for DurationInput {
    fn from(at: DateTime<Utc>) -> Self {
        DurationInput::Until(at)
    }
}

/// Pick the first non-empty duration by precedence.
///
/// Order: `explicit`, `subject_default`, `config_default`, `hard_default`.
/// A level that fails to parse is an error; it is never skipped.
pub fn resolve_duration(
    explicit: Option<&DurationInput>,
    subject_default: Option<&DurationInput>,
    config_default: Option<&DurationInput>,
    hard_default: &DurationInput,
) -> Result<LockDuration> {
    let levels = [explicit, subject_default, config_default, Some(hard_default)];

    for input in levels.into_iter().flatten() {
        if let Some(duration) = input.parse()? {
            return Ok(duration);
        }
    }

    Err(LockingError::InvalidDuration(format!(
        "no usable duration (fallback '{}' is empty)",
        hard_default
    )))
}

fn parse_text(text: &str) -> Result<Option<LockDuration>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return Ok(None);
    }

    if let Some(duration) = parse_keyword(trimmed) {
        return Ok(Some(duration));
    }

    if let Some(at) = parse_timestamp(trimmed) {
        return Ok(Some(LockDuration::Until(at)));
    }

    let offset = parse_relative(trimmed)?;
    if offset.is_zero() {
        Ok(None)
    } else {
        Ok(Some(LockDuration::Relative(offset)))
    }
}

fn parse_keyword(text: &str) -> Option<LockDuration> {
    match text.to_lowercase().as_str() {
        "now" => Some(LockDuration::Relative(Duration::zero())),
        "today" | "midnight" => Some(LockDuration::StartOfDay(0)),
        "tomorrow" => Some(LockDuration::StartOfDay(1)),
        "yesterday" => Some(LockDuration::StartOfDay(-1)),
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_relative(text: &str) -> Result<Duration> {
    let lowered = text.to_lowercase();
    if !RELATIVE_REGEX.is_match(&lowered) {
        return Err(invalid(text, "expected '<amount> <unit>' or a timestamp"));
    }

    let mut total_seconds: i64 = 0;
    for caps in TERM_REGEX.captures_iter(&lowered) {
        let unit = &caps[2];
        let amount: i64 = caps[1]
            .parse()
            .map_err(|_| invalid(text, "amount is out of range"))?;
        let unit_seconds = unit_seconds(unit)
            .ok_or_else(|| invalid(text, &format!("unknown unit '{}'", unit)))?;

        total_seconds = amount
            .checked_mul(unit_seconds)
            .and_then(|seconds| total_seconds.checked_add(seconds))
            .ok_or_else(|| invalid(text, "duration is out of range"))?;
    }

    if lowered.ends_with("ago") {
        total_seconds = -total_seconds;
    }

    Duration::try_seconds(total_seconds).ok_or_else(|| invalid(text, "duration is out of range"))
}

fn unit_seconds(unit: &str) -> Option<i64> {
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        "min" | "mins" | "minute" | "minutes" => Some(60),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(3_600),
        "d" | "day" | "days" => Some(86_400),
        "w" | "week" | "weeks" => Some(604_800),
        _ => None,
    }
}

fn invalid(text: &str, reason: &str) -> LockingError {
    LockingError::InvalidDuration(format!("'{}': {}", text, reason))
}
