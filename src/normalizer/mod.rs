//! Publication-date normalization.
//!
//! Feed publishers put almost anything into `<pubDate>`. This module tries a
//! fixed, ordered list of known layouts and returns the first successful
//! parse, so an ambiguous string always resolves the same way.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::app::{Result, TributaryError};

/// Layouts carrying an explicit numeric offset.
const OFFSET_LAYOUTS: &[&str] = &[
    // Ruby date: "Mon Jan 02 15:04:05 -0700 2006"
    "%a %b %d %H:%M:%S %z %Y",
];

/// Layouts without offset information; `%Z` consumes a named zone without
/// interpreting it, and the result is taken as UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    // RFC 850: "Sunday, 06-Nov-94 08:49:37 GMT"
    "%A, %d-%b-%y %H:%M:%S %Z",
    // ANSI C asctime: "Mon Jan  2 15:04:05 2006"
    "%a %b %e %H:%M:%S %Y",
    // Unix date: "Mon Jan  2 15:04:05 MST 2006"
    "%a %b %e %H:%M:%S %Z %Y",
    // Generic datetime: "2006-01-02 15:04:05"
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a publication-date string of unknown format into an absolute
/// point in time.
///
/// Attempt order: RFC 2822 (covers RFC 822 and RFC 1123, named or numeric
/// zone), RFC 3339, [`OFFSET_LAYOUTS`], [`NAIVE_LAYOUTS`], then date-only
/// (midnight UTC) and time-only (anchored to 1970-01-01).
pub fn normalize(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for layout in OFFSET_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(s, layout) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    if let Ok(time) = NaiveTime::parse_from_str(s, "%H:%M:%S") {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap_or_default()
            .and_time(time);
        return Ok(Utc.from_utc_datetime(&epoch));
    }

    Err(TributaryError::NoMatchingLayout(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(s: &str) -> DateTime<Utc> {
        normalize(s).unwrap()
    }

    #[test]
    fn test_rfc1123_numeric_zone() {
        let dt = utc("Mon, 02 Jan 2006 15:04:05 -0700");
        assert_eq!(dt.to_rfc3339(), "2006-01-02T22:04:05+00:00");
    }

    #[test]
    fn test_rfc1123_named_zone() {
        let dt = utc("Mon, 02 Jan 2006 15:04:05 GMT");
        assert_eq!(dt.to_rfc3339(), "2006-01-02T15:04:05+00:00");
    }

    #[test]
    fn test_rfc822_two_digit_year() {
        let dt = utc("02 Jan 06 15:04 +0000");
        assert_eq!(dt.to_rfc3339(), "2006-01-02T15:04:00+00:00");
    }

    #[test]
    fn test_rfc3339() {
        let dt = utc("2024-03-01T08:30:00+01:00");
        assert_eq!(dt.to_rfc3339(), "2024-03-01T07:30:00+00:00");
    }

    #[test]
    fn test_ruby_date() {
        let dt = utc("Mon Jan 02 15:04:05 -0700 2006");
        assert_eq!(dt.to_rfc3339(), "2006-01-02T22:04:05+00:00");
    }

    #[test]
    fn test_rfc850() {
        let dt = utc("Sunday, 06-Nov-94 08:49:37 GMT");
        assert_eq!(dt.to_rfc3339(), "1994-11-06T08:49:37+00:00");
    }

    #[test]
    fn test_ansi_c() {
        let dt = utc("Mon Jan  2 15:04:05 2006");
        assert_eq!(dt.to_rfc3339(), "2006-01-02T15:04:05+00:00");
    }

    #[test]
    fn test_unix_date() {
        let dt = utc("Mon Jan  2 15:04:05 MST 2006");
        assert_eq!(dt.to_rfc3339(), "2006-01-02T15:04:05+00:00");
    }

    #[test]
    fn test_generic_datetime() {
        let dt = utc("2024-06-15 12:00:30");
        assert_eq!(dt.to_rfc3339(), "2024-06-15T12:00:30+00:00");
    }

    #[test]
    fn test_date_only() {
        let dt = utc("2024-06-15");
        assert_eq!(dt.to_rfc3339(), "2024-06-15T00:00:00+00:00");
    }

    #[test]
    fn test_time_only() {
        let dt = utc("13:37:00");
        assert_eq!(dt.hour(), 13);
        assert_eq!(dt.minute(), 37);
    }

    #[test]
    fn test_surrounding_whitespace() {
        let dt = utc("  2024-06-15  ");
        assert_eq!(dt.to_rfc3339(), "2024-06-15T00:00:00+00:00");
    }

    #[test]
    fn test_same_instant_across_layouts() {
        let a = utc("Mon, 02 Jan 2006 22:04:05 +0000");
        let b = utc("2006-01-02T15:04:05-07:00");
        let c = utc("Mon Jan 02 15:04:05 -0700 2006");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_no_matching_layout() {
        for bad in ["", "not a date", "tomorrow-ish", "2024/99/99"] {
            match normalize(bad) {
                Err(TributaryError::NoMatchingLayout(s)) => assert_eq!(s, bad),
                other => panic!("expected NoMatchingLayout for {bad:?}, got {other:?}"),
            }
        }
    }
}
