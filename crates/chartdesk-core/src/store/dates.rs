//! Date parsing and age derivation.

use chrono::{NaiveDate, NaiveDateTime};

/// Storage format for every date column.
pub const DATE_FMT: &str = "%Y-%m-%d";

/// Date-only formats tried, in order, when inferring a visit date.
const INFERRED_DATE_FMTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Timestamp formats tried after the date-only ones; the time part is dropped.
const INFERRED_DATETIME_FMTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a date in the storage format only.
pub fn parse_strict(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FMT).ok()
}

/// Parse a date by trying each known format in turn.
pub fn parse_inferred(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    for fmt in INFERRED_DATE_FMTS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    for fmt in INFERRED_DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Age in whole years under the chart's 365-day-year convention:
/// `floor(days_between / 365)`. Not calendar-aware; a birthday adjacent to
/// `today` may be off by one relative to true calendar age. Euclidean
/// division keeps the floor semantics when the date of birth lies in the
/// future.
pub fn age_years(date_of_birth: NaiveDate, today: NaiveDate) -> i64 {
    (today - date_of_birth).num_days().div_euclid(365)
}
