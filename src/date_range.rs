//! Named reporting windows.
//!
//! Report callers resolve `last_28_days` and friends into concrete dates
//! *before* fingerprinting, so a cached "last 7 days" result stops matching
//! once the calendar day rolls over.

use chrono::{Days, Local, NaiveDate};

use crate::error::{GatewayError, Result};

/// Named ranges and how many days back they start.
pub const NAMED_RANGES: &[(&str, u64)] = &[
    ("today", 0),
    ("yesterday", 1),
    ("last_7_days", 7),
    ("last_14_days", 14),
    ("last_28_days", 28),
    ("last_30_days", 30),
    ("last_90_days", 90),
    ("last_365_days", 365),
];

/// Inclusive date window in `YYYY-MM-DD` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Resolve `range` against the local calendar date.
pub fn parse_date_range(range: &str) -> Result<DateRange> {
    parse_date_range_at(range, Local::now().date_naive())
}

/// Resolve `range` relative to `today`.
///
/// Accepts a named range (case-insensitive) or an explicit
/// `YYYY-MM-DD,YYYY-MM-DD` pair.
pub fn parse_date_range_at(range: &str, today: NaiveDate) -> Result<DateRange> {
    if let Some((start, end)) = range.split_once(',') {
        let start = parse_day(start.trim())?;
        let end = parse_day(end.trim())?;
        if start > end {
            return Err(GatewayError::Validation(format!(
                "Date range starts after it ends: '{range}'"
            )));
        }
        return Ok(DateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let key = range.trim().to_lowercase();
    let days = NAMED_RANGES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, days)| *days)
        .ok_or_else(|| {
            let names: Vec<&str> = NAMED_RANGES.iter().map(|(n, _)| *n).collect();
            GatewayError::Validation(format!(
                "Unknown date range: '{range}'. Use one of: {} or 'YYYY-MM-DD,YYYY-MM-DD'",
                names.join(", ")
            ))
        })?;

    let start = days_before(today, days)?;
    let end = if key == "yesterday" { start } else { today };
    Ok(DateRange {
        start: start.to_string(),
        end: end.to_string(),
    })
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| GatewayError::Validation(format!("Invalid date '{raw}': {e}")))
}

fn days_before(day: NaiveDate, n: u64) -> Result<NaiveDate> {
    day.checked_sub_days(Days::new(n))
        .ok_or_else(|| GatewayError::Validation(format!("Date out of range: {day} - {n} days")))
}
