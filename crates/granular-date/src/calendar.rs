//! Calendar arithmetic: leap years, month lengths, day-of-year and weeks.
//!
//! Pure functions over proleptic Gregorian dates. Nothing here knows about
//! timezones or granularity.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::config::ValidationConfig;

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Number of days in `month` of `year`, or `None` for an invalid month.
///
/// Anchored on the 15th so a valid month always yields a real date.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let anchor = NaiveDate::from_ymd_opt(year, month, 15)?;
    let first = anchor.with_day(1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Zero-based day of the year (January 1st is 0).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal0()
}

/// Day of the week with Sunday as 0.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// How many days `weekday` is from `first_day`.
pub fn days_from_week_start(weekday: Weekday, first_day: Weekday) -> u32 {
    (7 + weekday.num_days_from_monday() - first_day.num_days_from_monday()) % 7
}

/// The first day of the week containing `date`.
pub fn start_of_week(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    date - Duration::days(i64::from(days_from_week_start(date.weekday(), first_day)))
}

/// ISO 8601 `(week-year, week)` of `date`.
pub fn iso_week(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

/// Number of ISO weeks (52 or 53) in ISO year `year`.
///
/// December 28th always falls in the last ISO week of its year.
pub fn iso_weeks_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 28)
        .map(|d| d.iso_week().week())
        .unwrap_or(52)
}

/// Calendar week number: the week containing January 1st is week 1 and
/// weeks begin on `first_day`.
pub fn calendar_week(date: NaiveDate, first_day: Weekday) -> u32 {
    let offset = NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map(|jan1| days_from_week_start(jan1.weekday(), first_day))
        .unwrap_or(0);
    (date.ordinal0() + offset) / 7 + 1
}

/// Number of calendar weeks in `year`, counting partial weeks at both ends.
pub fn calendar_weeks_in_year(year: i32, first_day: Weekday) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .map(|dec31| calendar_week(dec31, first_day))
        .unwrap_or(53)
}

/// Week number of `date` under the configured week convention.
pub fn week_number(date: NaiveDate, config: &ValidationConfig) -> u32 {
    if config.use_iso_weeks {
        iso_week(date).1
    } else {
        calendar_week(date, config.first_day_of_week)
    }
}

/// Start (inclusive) and end (exclusive) of ISO week `week` in `year`.
pub fn iso_week_range(week: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
    Some((start, start + Duration::days(7)))
}

/// Start (inclusive) and end (exclusive) of calendar week `week` in `year`.
///
/// The first week is clamped so it never starts before January 1st.
pub fn week_range(week: u32, year: i32, config: &ValidationConfig) -> Option<(NaiveDate, NaiveDate)> {
    if config.use_iso_weeks {
        return iso_week_range(week, year);
    }
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let in_week = jan1 + Duration::days(7 * i64::from(week.saturating_sub(1)));
    let start = start_of_week(in_week, config.first_day_of_week);
    let end = start + Duration::days(7);
    let start = if start.year() != year { jan1 } else { start };
    Some((start, end))
}
