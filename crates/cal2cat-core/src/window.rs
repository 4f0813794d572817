//! Resolution of relative time-window boundaries such as `-1cw`.
//!
//! An offset is `<n><unit>` where `n` is a signed integer and `unit` is one of:
//!
//! | unit | meaning                                              |
//! |------|------------------------------------------------------|
//! | `d`  | days                                                 |
//! | `w`  | weeks (7 days)                                       |
//! | `cw` | calendar weeks, truncated to Monday 00:00            |
//! | `m`  | months (same day in another month)                   |
//! | `cm` | calendar months, truncated to the first of the month |
//! | `y`  | years (same day in another year)                     |
//! | `cy` | calendar years, truncated to January 1st             |

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use thiserror::Error;

static OFFSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+)(cw|cm|cy|d|w|m|y)$").unwrap());

/// Errors resolving a window boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("cannot parse time offset {offset:?}, expected <n><unit> (e.g. -1cw)")]
    Invalid { offset: String },

    #[error("time offset {offset:?} is out of range")]
    OutOfRange { offset: String },
}

/// Unit of a time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Week,
    CalendarWeek,
    Month,
    CalendarMonth,
    Year,
    CalendarYear,
}

impl Unit {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "d" => Self::Day,
            "w" => Self::Week,
            "cw" => Self::CalendarWeek,
            "m" => Self::Month,
            "cm" => Self::CalendarMonth,
            "y" => Self::Year,
            "cy" => Self::CalendarYear,
            _ => return None,
        })
    }
}

/// Returns `now` truncated to midnight UTC.
pub fn today(now: DateTime<Utc>) -> DateTime<Utc> {
    midnight(now.date_naive())
}

/// Adds the offset expression to `now`.
pub fn resolve(now: DateTime<Utc>, offset: &str) -> Result<DateTime<Utc>, WindowError> {
    let invalid = || WindowError::Invalid {
        offset: offset.to_string(),
    };
    let out_of_range = || WindowError::OutOfRange {
        offset: offset.to_string(),
    };

    let caps = OFFSET_RE.captures(offset.trim()).ok_or_else(invalid)?;
    let n: i64 = caps[1].parse().map_err(|_| invalid())?;
    let unit = Unit::parse(&caps[2]).ok_or_else(invalid)?;

    let resolved = match unit {
        Unit::Day => add_days(now, n),
        Unit::Week => n.checked_mul(7).and_then(|days| add_days(now, days)),
        Unit::CalendarWeek => n
            .checked_mul(7)
            .and_then(|days| add_days(now, days))
            .map(|t| {
                let date = t.date_naive();
                let since_monday = date.weekday().num_days_from_monday();
                midnight(date - Duration::days(i64::from(since_monday)))
            }),
        Unit::Month => add_months(now, n),
        Unit::CalendarMonth => now
            .date_naive()
            .with_day(1)
            .and_then(|first| add_months(midnight(first), n)),
        Unit::Year => n.checked_mul(12).and_then(|months| add_months(now, months)),
        Unit::CalendarYear => i32::try_from(n)
            .ok()
            .and_then(|n| now.year().checked_add(n))
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .map(midnight),
    };

    resolved.ok_or_else(out_of_range)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn add_days(t: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|d| t.checked_add_signed(d))
}

/// Shifts by whole months, clamping to the last day of shorter months.
fn add_months(t: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let abs = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months < 0 {
        t.checked_sub_months(abs)
    } else {
        t.checked_add_months(abs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 4, 10, 15, 4, 5).unwrap()
    }

    fn calc(offset: &str) -> String {
        resolve(now(), offset).unwrap().to_string()
    }

    #[test]
    fn days_and_weeks_keep_time_of_day() {
        assert_eq!(calc("-0d"), "2020-04-10 15:04:05 UTC");
        assert_eq!(calc("-3d"), "2020-04-07 15:04:05 UTC");
        assert_eq!(calc("3d"), "2020-04-13 15:04:05 UTC");

        assert_eq!(calc("-0w"), "2020-04-10 15:04:05 UTC");
        assert_eq!(calc("-2w"), "2020-03-27 15:04:05 UTC");
        assert_eq!(calc("2w"), "2020-04-24 15:04:05 UTC");
    }

    #[test]
    fn calendar_weeks_truncate_to_monday() {
        assert_eq!(calc("-0cw"), "2020-04-06 00:00:00 UTC");
        assert_eq!(calc("-2cw"), "2020-03-23 00:00:00 UTC");
        assert_eq!(calc("2cw"), "2020-04-20 00:00:00 UTC");
    }

    #[test]
    fn months() {
        assert_eq!(calc("-0m"), "2020-04-10 15:04:05 UTC");
        assert_eq!(calc("-2m"), "2020-02-10 15:04:05 UTC");
        assert_eq!(calc("2m"), "2020-06-10 15:04:05 UTC");

        assert_eq!(calc("-0cm"), "2020-04-01 00:00:00 UTC");
        assert_eq!(calc("-2cm"), "2020-02-01 00:00:00 UTC");
        assert_eq!(calc("2cm"), "2020-06-01 00:00:00 UTC");
    }

    #[test]
    fn month_arithmetic_clamps_to_month_end() {
        let end_of_march = Utc.with_ymd_and_hms(2021, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(
            resolve(end_of_march, "-1m").unwrap().to_string(),
            "2021-02-28 12:00:00 UTC"
        );
        assert_eq!(
            resolve(end_of_march, "-1cm").unwrap().to_string(),
            "2021-02-01 00:00:00 UTC"
        );
    }

    #[test]
    fn years() {
        assert_eq!(calc("-0y"), "2020-04-10 15:04:05 UTC");
        assert_eq!(calc("-2y"), "2018-04-10 15:04:05 UTC");
        assert_eq!(calc("2y"), "2022-04-10 15:04:05 UTC");

        assert_eq!(calc("-0cy"), "2020-01-01 00:00:00 UTC");
        assert_eq!(calc("-2cy"), "2018-01-01 00:00:00 UTC");
        assert_eq!(calc("2cy"), "2022-01-01 00:00:00 UTC");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(calc("  -1d "), "2020-04-09 15:04:05 UTC");
    }

    #[test]
    fn invalid_offsets_are_errors() {
        for offset in ["", "cw", "1", "1x", "--1d", "1 d", "1dd"] {
            assert_eq!(
                resolve(now(), offset),
                Err(WindowError::Invalid {
                    offset: offset.to_string()
                }),
                "{offset:?} should be rejected"
            );
        }
    }

    #[test]
    fn huge_offsets_are_out_of_range() {
        assert!(matches!(
            resolve(now(), "99999999999y"),
            Err(WindowError::OutOfRange { .. })
        ));
        assert!(matches!(
            resolve(now(), "99999999999999d"),
            Err(WindowError::OutOfRange { .. })
        ));
    }

    #[test]
    fn today_truncates_to_midnight() {
        assert_eq!(today(now()).to_string(), "2020-04-10 00:00:00 UTC");
    }
}
