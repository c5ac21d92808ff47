//! Lenient publication-date parsing.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAMED_ZONES: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UTC", 0),
    ("UT", 0),
    ("Z", 0),
    ("EST", -5),
    ("EDT", -4),
    ("CST", -6),
    ("CDT", -5),
    ("MST", -7),
    ("MDT", -6),
    ("PST", -8),
    ("PDT", -7),
    ("WET", 0),
    ("WEST", 1),
    ("BST", 1),
    ("CET", 1),
    ("CEST", 2),
    ("EET", 2),
    ("EEST", 3),
];

const OFFSET_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %e %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

/// Parses the date formats seen in RSS and Atom feeds. Returns `None` when
/// nothing matches.
pub fn parse_published(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_named_zone(s) {
        return Some(dt);
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// "Mon, 02 Jan 2006 15:04:05 PST" style dates; chrono's `%Z` cannot read these.
fn parse_named_zone(s: &str) -> Option<DateTime<Utc>> {
    let (rest, zone) = s.rsplit_once(' ')?;
    let hours = NAMED_ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(zone))
        .map(|(_, hours)| *hours)?;
    let offset = FixedOffset::east_opt(hours * 3600)?;

    NAIVE_FORMATS
        .iter()
        .chain(["%a, %e %b %Y %H:%M:%S", "%a, %d %b %Y %H:%M"].iter())
        .find_map(|fmt| NaiveDateTime::parse_from_str(rest, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            parse_published("Mon, 15 Jan 2024 10:00:00 +0000"),
            Some(utc("2024-01-15T10:00:00Z"))
        );
    }

    #[test]
    fn test_rfc2822_gmt() {
        assert_eq!(
            parse_published("Mon, 01 Jan 2024 00:00:00 GMT"),
            Some(utc("2024-01-01T00:00:00Z"))
        );
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_published("2024-01-15T10:00:00-03:00"),
            Some(utc("2024-01-15T13:00:00Z"))
        );
    }

    #[test]
    fn test_named_zone() {
        assert_eq!(
            parse_published("Tue, 16 Jan 2024 11:00:00 PST"),
            Some(utc("2024-01-16T19:00:00Z"))
        );
        assert_eq!(
            parse_published("Tue, 16 Jan 2024 11:00:00 CEST"),
            Some(utc("2024-01-16T09:00:00Z"))
        );
    }

    #[test]
    fn test_naive_and_date_only() {
        assert_eq!(
            parse_published("2024-01-15 08:30:00"),
            Some(utc("2024-01-15T08:30:00Z"))
        );
        assert_eq!(
            parse_published("2024-01-15"),
            Some(utc("2024-01-15T00:00:00Z"))
        );
    }

    #[test]
    fn test_unparsable_is_none() {
        assert_eq!(parse_published("yesterday-ish"), None);
        assert_eq!(parse_published("   "), None);
    }
}
