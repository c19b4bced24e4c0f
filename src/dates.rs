//! Date range validation for the historical weather archive
//!
//! The archive only holds observed data, so a requested range is checked against
//! today (UTC) and its end is clamped to today when it runs into the future.

use crate::error::ToolError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive calendar date range, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "start_date")]
    pub start: NaiveDate,
    #[serde(rename = "end_date")]
    pub end: NaiveDate,
}

/// Requested range as given, and the range actually queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRange {
    pub requested: DateRange,
    pub resolved: DateRange,
}

/// Date-time layouts accepted besides RFC 3339; `%.f` also matches no fraction
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse `YYYY-MM-DD` or compact `YYYYMMDD`; an ISO date-time, with or
/// without an offset, is truncated to its own calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ToolError> {
    let input = input.trim();

    if let Ok(date) = input.parse::<NaiveDate>() {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.date_naive());
    }
    if let Some(dt) = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
    {
        return Ok(dt.date());
    }
    if input.len() == 8 && input.bytes().all(|b| b.is_ascii_digit()) {
        let dashed = format!("{}-{}-{}", &input[..4], &input[4..6], &input[6..]);
        if let Ok(date) = dashed.parse::<NaiveDate>() {
            return Ok(date);
        }
    }

    Err(ToolError::InvalidDateFormat)
}

/// Validate and clamp a requested range against `today`.
///
/// Checks run in order: both dates parse, `end >= start`, `start <= today`.
/// The future check uses the original start, never a clamped one.
pub fn normalize(start: &str, end: &str, today: NaiveDate) -> Result<NormalizedRange, ToolError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;

    if end < start {
        return Err(ToolError::DateRangeOrder);
    }

    if start > today {
        return Err(ToolError::FutureRange);
    }

    let requested = DateRange { start, end };
    let resolved = DateRange {
        start,
        end: end.min(today),
    };

    Ok(NormalizedRange {
        requested,
        resolved,
    })
}

/// Today's date in UTC
#[must_use]
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
