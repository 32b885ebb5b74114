// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and day-boundary math.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
///
/// All stored timestamps go through this formatter so that range filters can
/// rely on lexicographic comparison.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// UTC instants bounding a calendar day at a fixed offset, inclusive.
///
/// The day spans `[00:00:00, 23:59:59]` local to `offset`; both the ingestion
/// worker and the feed query use this single definition, so counts do not
/// drift across midnight.
pub fn day_bounds(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let utc_shift = Duration::seconds(offset.local_minus_utc() as i64);
    let start = Utc.from_utc_datetime(&(date.and_time(NaiveTime::MIN) - utc_shift));
    let end = start + Duration::days(1) - Duration::seconds(1);
    (start, end)
}

/// Today's calendar date as seen at the given fixed offset.
pub fn today_at_offset(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_minus_5() -> FixedOffset {
        "-05:00".parse().unwrap()
    }

    #[test]
    fn test_day_bounds_at_minus_5() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (start, end) = day_bounds(date, offset_minus_5());

        assert_eq!(format_utc_rfc3339(start), "2024-01-01T05:00:00Z");
        assert_eq!(format_utc_rfc3339(end), "2024-01-02T04:59:59Z");
    }

    #[test]
    fn test_day_boundary_across_midnight() {
        // 2024-01-01T23:59:00 local (-05:00) is inside the day,
        // 2024-01-02T00:01:00 local is outside it.
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (start, end) = day_bounds(date, offset_minus_5());

        let inside: DateTime<Utc> = "2024-01-01T23:59:00-05:00".parse().unwrap();
        let outside: DateTime<Utc> = "2024-01-02T00:01:00-05:00".parse().unwrap();

        assert!(inside >= start && inside <= end);
        assert!(outside > end);
    }

    #[test]
    fn test_boundary_strings_compare_lexicographically() {
        // The store filters on formatted strings; ordering must match the
        // instant ordering.
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (start, end) = day_bounds(date, offset_minus_5());
        let (start_s, end_s) = (format_utc_rfc3339(start), format_utc_rfc3339(end));

        let inside: DateTime<Utc> = "2024-01-01T23:59:00-05:00".parse().unwrap();
        let inside_s = format_utc_rfc3339(inside);
        assert!(inside_s.as_str() >= start_s.as_str());
        assert!(inside_s.as_str() <= end_s.as_str());

        let outside: DateTime<Utc> = "2024-01-02T00:01:00-05:00".parse().unwrap();
        let outside_s = format_utc_rfc3339(outside);
        assert!(outside_s.as_str() > end_s.as_str());
    }

    #[test]
    fn test_day_bounds_utc_offset_zero() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let (start, end) = day_bounds(date, "+00:00".parse().unwrap());
        assert_eq!(format_utc_rfc3339(start), "2024-06-15T00:00:00Z");
        assert_eq!(format_utc_rfc3339(end), "2024-06-15T23:59:59Z");
    }
}
