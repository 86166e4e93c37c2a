use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// A log timestamp as written: either carrying its own UTC offset or a bare
/// wall-clock value whose zone the caller has to supply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedTimestamp {
    Offset(DateTime<Utc>),
    WallClock(NaiveDateTime),
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse the ISO-8601-ish timestamps that show up in log columns and filter
/// criteria. Accepts full RFC 3339, offset-less date-times with `T` or space,
/// and bare dates (midnight).
pub fn parse_timestamp(value: &str) -> Option<ParsedTimestamp> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(ParsedTimestamp::Offset(dt.with_timezone(&Utc)));
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ParsedTimestamp::WallClock(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(ParsedTimestamp::WallClock(date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Naive view of a timestamp for zone-less range comparisons: offset-aware
/// values compare by their UTC wall clock.
pub fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    Some(match parse_timestamp(value)? {
        ParsedTimestamp::Offset(dt) => dt.naive_utc(),
        ParsedTimestamp::WallClock(dt) => dt,
    })
}

/// Resolve a timestamp to an instant, interpreting offset-less values as wall
/// clock in `tz`. Returns `None` for unparseable values and for wall-clock
/// times that do not exist (or are ambiguous) in `tz`, e.g. inside a DST gap.
pub fn resolve_in_zone(value: &str, tz: Tz) -> Option<DateTime<Utc>> {
    match parse_timestamp(value)? {
        ParsedTimestamp::Offset(dt) => Some(dt),
        ParsedTimestamp::WallClock(dt) => tz
            .from_local_datetime(&dt)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_parses_rfc3339_with_offset() {
        let ts = parse_timestamp("2024-01-01T12:00:00+02:00").unwrap();
        match ts {
            ParsedTimestamp::Offset(dt) => {
                assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
            }
            other => panic!("expected offset timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_naive_variants() {
        for value in [
            "2024-06-01T08:30:00",
            "2024-06-01 08:30:00",
            "2024-06-01T08:30:00.123",
            "2024-06-01T08:30",
        ] {
            match parse_timestamp(value) {
                Some(ParsedTimestamp::WallClock(dt)) => {
                    assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
                }
                other => panic!("'{}' parsed as {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_bare_date_means_midnight() {
        let dt = parse_naive("2024-03-01").unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_timestamp("not a time").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2024-13-40").is_none());
    }

    #[test]
    fn test_wall_clock_resolution_in_named_zone() {
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        let instant = resolve_in_zone("2024-01-15T12:00:00", tz).unwrap();
        // Berlin is UTC+1 in January.
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_offset_timestamp_ignores_named_zone() {
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        let instant = resolve_in_zone("2024-01-15T12:00:00Z", tz).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_dst_gap_resolves_to_none() {
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        // 02:30 on the spring-forward night does not exist.
        assert!(resolve_in_zone("2024-03-31T02:30:00", tz).is_none());
    }
}
