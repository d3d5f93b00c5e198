//! Increment rounding and "all day" detection for from/to pairs.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;

use crate::granularity::Granularity;
use crate::value::GranularDate;
use crate::zone::localize;

static DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}) ((\d{2}):(\d{2}):(\d{2}))").expect("regex construction")
});

fn round_half_up(value: u32, increment: u32) -> u32 {
    (value + increment / 2) / increment * increment
}

/// Round seconds, then minutes, to the nearest multiple of `increment`.
///
/// A rounded field that reaches 60 carries into the next field, so
/// `23:59:53` at increment 15 becomes midnight of the following day.
/// Increments of 0 or 1 leave the value unchanged.
pub fn round_to_increment(dt: NaiveDateTime, increment: u32) -> NaiveDateTime {
    if increment <= 1 {
        return dt;
    }
    let mut second = round_half_up(dt.second(), increment);
    let mut minute = dt.minute();
    if second >= 60 {
        minute += 1;
        second -= 60;
    }
    minute = round_half_up(minute, increment);
    let mut hour = dt.hour();
    if minute >= 60 {
        hour += 1;
        minute -= 60;
    }
    let offset = i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second);
    dt.date().and_time(NaiveTime::MIN) + Duration::seconds(offset)
}

/// The largest multiple of `increment` below 60.
fn last_step(increment: u32) -> u32 {
    let increment = increment.max(1);
    59 - 59 % increment
}

fn split(s: &str) -> Option<(u32, u32, u32)> {
    let caps = DATETIME.captures(s)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    Some((field(3)?, field(4)?, field(5)?))
}

/// Whether a `Y-m-d H:i:s` from/to pair spans whole days at `granularity`.
///
/// The start must sit at midnight and the end either at midnight or at the
/// last step of the day for the given minute/second `increment` (for
/// example `23:45:00` at increment 15 and minute granularity). Only `hour`,
/// `minute` and `second` granularities can be all day.
pub fn is_all_day(from: &str, to: &str, granularity: Granularity, increment: u32) -> bool {
    if !matches!(
        granularity,
        Granularity::Hour | Granularity::Minute | Granularity::Second
    ) {
        return false;
    }
    let (Some((h1, m1, s1)), Some((h2, m2, s2))) = (split(from), split(to)) else {
        return false;
    };
    let last = last_step(increment);
    let end_midnight = (h2, m2, s2) == (0, 0, 0);

    let (starts, ends) = match granularity {
        Granularity::Hour => (h1 == 0, end_midnight || h2 == 23),
        Granularity::Minute => (
            (h1, m1) == (0, 0),
            end_midnight || (h2, m2) == (23, last),
        ),
        _ => (
            (h1, m1, s1) == (0, 0, 0),
            end_midnight || (h2, m2, s2) == (23, last, last),
        ),
    };
    starts && ends
}

impl GranularDate {
    /// Round this value's wall-clock minutes and seconds to `increment`.
    pub fn round_to_increment(&mut self, increment: u32) {
        let rounded = round_to_increment(self.naive_local(), increment);
        if rounded != self.naive_local() {
            self.instant = localize(&self.timezone(), &rounded);
        }
    }

    /// Whether this value and `to` form an all-day range.
    ///
    /// See [`is_all_day`]; both ends are compared by their wall-clock fields.
    pub fn is_all_day_until(&self, to: &GranularDate, granularity: Granularity, increment: u32) -> bool {
        is_all_day(
            &self.format("Y-m-d H:i:s", true),
            &to.format("Y-m-d H:i:s", true),
            granularity,
            increment,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_round_minutes_and_seconds() {
        assert_eq!(round_to_increment(dt(2024, 5, 1, 10, 7, 0), 15), dt(2024, 5, 1, 10, 0, 0));
        assert_eq!(round_to_increment(dt(2024, 5, 1, 10, 8, 0), 15), dt(2024, 5, 1, 10, 15, 0));
        assert_eq!(round_to_increment(dt(2024, 5, 1, 10, 8, 40), 5), dt(2024, 5, 1, 10, 10, 40));
    }

    #[test]
    fn test_round_carries_into_next_day() {
        assert_eq!(round_to_increment(dt(2024, 2, 29, 23, 59, 53), 15), dt(2024, 3, 1, 0, 0, 0));
        assert_eq!(round_to_increment(dt(2023, 12, 31, 23, 53, 0), 15), dt(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_increment_of_one_is_identity() {
        let value = dt(2024, 5, 1, 10, 7, 31);
        assert_eq!(round_to_increment(value, 1), value);
        assert_eq!(round_to_increment(value, 0), value);
    }

    #[test]
    fn test_round_value_in_zone() {
        let ctx = Context::fixed(Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap());
        let mut value =
            GranularDate::parse("2024-05-01 10:08:00", Some("Europe/Paris"), Some("Y-m-d H:i:s"), &ctx)
                .unwrap();
        value.round_to_increment(15);
        assert_eq!(value.format("Y-m-d H:i:s", false), "2024-05-01 10:15:00");
        assert_eq!(value.timezone_name(), "Europe/Paris");
    }

    #[test]
    fn test_all_day_at_each_granularity() {
        let from = "2024-05-01 00:00:00";
        assert!(is_all_day(from, "2024-05-01 23:59:59", Granularity::Second, 1));
        assert!(is_all_day(from, "2024-05-02 00:00:00", Granularity::Second, 1));
        assert!(is_all_day(from, "2024-05-01 23:45:00", Granularity::Minute, 15));
        assert!(!is_all_day(from, "2024-05-01 23:30:00", Granularity::Minute, 15));
        assert!(is_all_day(from, "2024-05-01 23:10:00", Granularity::Hour, 1));
        assert!(!is_all_day("2024-05-01 08:00:00", "2024-05-01 23:59:59", Granularity::Second, 1));
    }

    #[test]
    fn test_all_day_rejects_coarse_granularity_and_bad_input() {
        let (from, to) = ("2024-05-01 00:00:00", "2024-05-01 23:59:59");
        assert!(!is_all_day(from, to, Granularity::Day, 1));
        assert!(!is_all_day("", to, Granularity::Second, 1));
        assert!(!is_all_day("2024-05-01", to, Granularity::Second, 1));
    }

    #[test]
    fn test_all_day_between_values() {
        let ctx = Context::fixed(Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap());
        let parse = |s: &str| GranularDate::parse(s, Some("UTC"), Some("Y-m-d H:i"), &ctx).unwrap();
        let from = parse("2024-05-01 00:00");
        let to = parse("2024-05-01 23:55");
        assert!(from.is_all_day_until(&to, Granularity::Minute, 5));
        assert!(!from.is_all_day_until(&to, Granularity::Minute, 1));
    }
}
