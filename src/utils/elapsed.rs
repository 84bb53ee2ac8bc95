//! Elapsed time between a start instant and now, using fixed-length units.
//!
//! A year is always 365 days and a month always 30 days. Each unit is taken
//! from what the previous one left over, so months can reach 12 in the last
//! five days of a "year". The rendered page runs the same arithmetic in the
//! browser, see `templates/page.html`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

const SECOND_MS: i64 = 1000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const MONTH_MS: i64 = 30 * DAY_MS;
const YEAR_MS: i64 = 365 * DAY_MS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Elapsed {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Elapsed {
    /// Missing start, or a start in the future, yields all zeros
    pub fn between(start: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        let Some(start) = start else {
            return Self::default();
        };
        let diff = (now - start).num_milliseconds();
        if diff <= 0 {
            return Self::default();
        }
        Self::from_millis(diff)
    }

    pub fn from_millis(diff: i64) -> Self {
        let diff = diff.max(0);
        let years = diff / YEAR_MS;
        let rest = diff % YEAR_MS;
        let months = rest / MONTH_MS;
        let rest = rest % MONTH_MS;
        let days = rest / DAY_MS;
        let rest = rest % DAY_MS;
        let hours = rest / HOUR_MS;
        let rest = rest % HOUR_MS;
        let minutes = rest / MINUTE_MS;
        let seconds = (rest % MINUTE_MS) / SECOND_MS;

        Self {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Convenience for a stored start string, see [`parse_start`]
    pub fn since(start: Option<&str>, now: DateTime<Utc>) -> Self {
        Self::between(start.and_then(parse_start), now.naive_utc())
    }
}

/// Parses the start date-time as entered by the customer.
///
/// Accepts `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS`, a bare date (midnight)
/// and RFC 3339. Anything else is `None`.
pub fn parse_start(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Start value handed to the browser counter.
///
/// Zoned input is written as UTC with a trailing `Z`; zoneless input keeps
/// its wall-clock value so the browser reads it in the viewer's local time.
pub fn script_start(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Some(dt.naive_utc().format("%Y-%m-%dT%H:%M:%SZ").to_string());
    }
    parse_start(raw).map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_four_hundred_days() {
        let start = now() - Duration::days(400);
        let e = Elapsed::between(Some(start), now());
        assert_eq!((e.years, e.months, e.days), (1, 1, 5));
        assert_eq!((e.hours, e.minutes, e.seconds), (0, 0, 0));
    }

    #[test]
    fn test_months_can_reach_twelve() {
        let start = now() - Duration::days(364);
        let e = Elapsed::between(Some(start), now());
        assert_eq!((e.years, e.months, e.days), (0, 12, 4));
    }

    #[test]
    fn test_sub_day_components() {
        let start = now() - Duration::days(31) - Duration::hours(5) - Duration::minutes(7)
            - Duration::seconds(9)
            - Duration::milliseconds(999);
        let e = Elapsed::between(Some(start), now());
        assert_eq!(
            e,
            Elapsed {
                years: 0,
                months: 1,
                days: 1,
                hours: 5,
                minutes: 7,
                seconds: 9,
            }
        );
    }

    #[test]
    fn test_missing_start_is_zero() {
        assert_eq!(Elapsed::between(None, now()), Elapsed::default());
        assert_eq!(Elapsed::since(None, Utc::now()), Elapsed::default());
        assert_eq!(Elapsed::since(Some("not a date"), Utc::now()), Elapsed::default());
    }

    #[test]
    fn test_future_start_is_zero() {
        let start = now() + Duration::days(3);
        assert_eq!(Elapsed::between(Some(start), now()), Elapsed::default());
    }

    #[test]
    fn test_fields_never_negative() {
        for days in [0, 1, 29, 30, 31, 359, 360, 365, 366, 730, 3650] {
            let e = Elapsed::between(Some(now() - Duration::days(days)), now());
            for v in [e.years, e.months, e.days, e.hours, e.minutes, e.seconds] {
                assert!(v >= 0);
            }
        }
    }

    #[test]
    fn test_parse_start_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 2, 14)
            .unwrap()
            .and_hms_opt(20, 30, 0)
            .unwrap();
        assert_eq!(parse_start("2020-02-14T20:30"), Some(expected));
        assert_eq!(parse_start("2020-02-14T20:30:00"), Some(expected));
        assert_eq!(parse_start("2020-02-14T20:30:00Z"), Some(expected));
        assert_eq!(
            parse_start("2020-02-14"),
            NaiveDate::from_ymd_opt(2020, 2, 14).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_start(""), None);
        assert_eq!(parse_start("2020-13-01T00:00"), None);
    }

    #[test]
    fn test_script_start_keeps_zone() {
        assert_eq!(
            script_start("2020-02-14T20:30:00+01:00").as_deref(),
            Some("2020-02-14T19:30:00Z")
        );
        assert_eq!(
            script_start("2020-02-14T20:30").as_deref(),
            Some("2020-02-14T20:30:00")
        );
        assert_eq!(script_start("garbage"), None);
    }
}
