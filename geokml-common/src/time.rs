//! Timestamp utilities

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;
use std::time::SystemTime;

/// Archive suffix format (`YYYYMMDD_HHMMSS`)
pub const ARCHIVE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Sortable stamp written into document metadata
pub const UPDATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a file modification time as an archive suffix, in local time
pub fn archive_stamp(modified: SystemTime) -> String {
    DateTime::<Local>::from(modified)
        .format(ARCHIVE_STAMP_FORMAT)
        .to_string()
}

/// Format a UTC instant for the `updated_at` document stamp
pub fn updated_at_stamp(at: DateTime<Utc>) -> String {
    at.format(UPDATED_AT_FORMAT).to_string()
}

/// Parse the ISO-like timestamps found in feed records
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC) and plain
/// `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// Order two timestamps chronologically when both parse, lexicographically otherwise
pub fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(left), Some(right)) => left.cmp(&right),
        _ => a.cmp(b),
    }
}

/// Return the earlier of two timestamps (the first one on a tie)
pub fn earliest<'a>(a: &'a str, b: &'a str) -> &'a str {
    match compare_timestamps(a, b) {
        Ordering::Greater => b,
        _ => a,
    }
}
