use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::consts::DATE_FORMAT;

/// Parse an ISO-8601 event timestamp. A trailing `Z` and explicit offsets are
/// both accepted; a timestamp without an offset is read as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Parse a `YYYY-MM-DD` day key, ignoring any time part that follows it.
pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    let head = raw.get(..10)?;
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

/// The `YYYY-MM-DD` head of an ISO timestamp, or the whole string when it is
/// shorter than that.
pub(crate) fn day_prefix(raw: &str) -> &str {
    raw.get(..10).unwrap_or(raw)
}

pub(crate) fn format_day(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_zulu_timestamp() {
        let dt = parse_timestamp("2026-01-01T10:00:00.123Z").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.offset().local_minus_utc(), 0);
    }

    #[test]
    fn parses_offset_timestamp() {
        let dt = parse_timestamp("2026-01-01T10:00:00+02:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn naive_timestamp_is_utc() {
        let dt = parse_timestamp("2026-01-01T10:00:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn day_key_ignores_time_suffix() {
        assert_eq!(
            parse_day("2026-03-04T23:59:00Z"),
            NaiveDate::from_ymd_opt(2026, 3, 4)
        );
        assert_eq!(parse_day("2026-3-4"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn day_prefix_truncates() {
        assert_eq!(day_prefix("2026-03-04T23:59:00Z"), "2026-03-04");
        assert_eq!(day_prefix("2026"), "2026");
    }
}
