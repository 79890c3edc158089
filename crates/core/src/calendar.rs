//! Calendar-day arithmetic and an injectable clock.
//!
//! All arithmetic happens on UTC calendar days. Conversion into a farm's
//! display timezone is a presentation concern and never happens here. There
//! is no process-wide configuration: callers construct a [`Clock`] and hand
//! it to whichever component needs "now".

use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::error::CoreError;
use crate::types::{CalendarDate, Timestamp};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current instant.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant in UTC.
    fn now(&self) -> Timestamp;

    /// The current UTC calendar day.
    fn today(&self) -> CalendarDate {
        self.now().date_naive()
    }
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock frozen at a single instant. Used by tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl FixedClock {
    /// Freeze the clock at UTC midnight of `date`.
    pub fn at_date(date: CalendarDate) -> Self {
        Self(utc_midnight(date))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

/// Parse a caller-supplied date.
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, in which case the UTC
/// calendar day of that instant is used.
pub fn parse_calendar_date(field: &'static str, value: &str) -> Result<CalendarDate, CoreError> {
    let trimmed = value.trim();
    if let Ok(date) = CalendarDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| CoreError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Midnight UTC at the start of `date`.
pub fn utc_midnight(date: CalendarDate) -> Timestamp {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Shift `date` by `days` (negative moves backwards).
pub fn shift_days(date: CalendarDate, days: i64) -> Result<CalendarDate, CoreError> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| {
            CoreError::Validation(format!("{date} shifted by {days} days is out of range"))
        })
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: CalendarDate, to: CalendarDate) -> i64 {
    (to - from).num_days()
}
