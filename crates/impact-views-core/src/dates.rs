//! Timestamp parsing and formatting for date-driven projections.
//!
//! Stored timestamps come from several writers over the years: RFC 3339 with
//! an offset, naive `isoformat()` output with microseconds, bare dates, and
//! bibliographic years. Naive values are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Published date used when nothing better is known.
pub const SENTINEL_PUBLISHED: &str = "1900-01-01T00:01:01.000Z";

/// [`SENTINEL_PUBLISHED`] as Unix seconds.
const SENTINEL_SECS: i64 = -2_208_988_739;

const MS_PER_DAY: i64 = 86_400_000;

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// The sentinel published date.
pub fn sentinel() -> DateTime<Utc> {
    DateTime::from_timestamp(SENTINEL_SECS, 0).unwrap_or_default()
}

/// Parse a stored timestamp. Returns `None` for anything unrecognised.
///
/// Accepted shapes:
///
/// - RFC 3339 (`2013-06-20T10:00:00Z`, `…+02:00`)
/// - naive date-time (`2013-06-20T10:00:00.123456`, `2013-06-20 10:00`)
/// - date (`2013-06-20`), year-month (`2013-06`), year (`2013`)
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }

    parse_partial_date(text)
}

/// `YYYY` or `YYYY-MM`, anchored to the first instant of the period.
fn parse_partial_date(text: &str) -> Option<DateTime<Utc>> {
    let mut parts = text.split('-');
    let year_part = parts.next()?;
    if year_part.len() != 4 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = year_part.parse::<i32>().ok()?;
    let month = match parts.next() {
        Some(m) if m.len() == 2 => m.parse::<u32>().ok()?,
        Some(_) => return None,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|n| n.and_utc())
}

/// The instant used for "published some time in `year`": one minute past
/// midnight on December 31st.
pub fn year_end(year: &str) -> Option<DateTime<Utc>> {
    let year = year.trim();
    if year.is_empty() || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    parse_timestamp(&format!("{}-12-31T00:01:01.000Z", year))
}

/// Millisecond-precision ISO 8601 with a `Z` suffix.
pub fn to_iso_millis(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Whole days from `earlier` to `later`, floored (negative if `later` is
/// actually earlier).
pub fn days_between(later: &DateTime<Utc>, earlier: &DateTime<Utc>) -> i64 {
    (*later - *earlier).num_milliseconds().div_euclid(MS_PER_DAY)
}
