use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Calendar month and year of a transaction date.
///
/// Stored next to every expense and income so period filters do not need a
/// date-range scan. Always derived from the date, never set independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthYear {
    pub month: u32,
    pub year: i32,
}

impl MonthYear {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }
}

/// Parse an ISO 8601 date as sent by clients.
///
/// Accepts a plain `YYYY-MM-DD` date, an RFC 3339 timestamp or a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp. Timestamps are truncated to their
/// calendar date in the offset they were written in.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

pub fn is_valid_month(month: u32) -> bool {
    (1..=12).contains(&month)
}
