//! Turning text into [`GranularDate`]s.
//!
//! Two entry points. [`parse_with_format`] matches input against a `date()`
//! format and, when that fails, retries with the format limited to ever
//! coarser granularity (the degrade loop). [`parse_text`] recognises the
//! common unstructured shapes (ISO 8601, SQL, iCal, RFC 2822, written dates,
//! bare times) and infers granularity from the fields actually present.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use regex::{Captures, Regex};

use crate::context::{Context, MONTH_NAMES};
use crate::error::{FieldErrors, GranularError, Result};
use crate::format::limit_format;
use crate::fuzzy;
use crate::granularity::{Granularity, GranularitySet};
use crate::pattern::{CompiledPattern, Directive};
use crate::value::{civil_date, civil_time, now_in, DateParts, GranularDate};
use crate::zone::localize;

/// Taint recorded when a `Y` value has fewer than four digits.
pub const SHORT_YEAR_MESSAGE: &str =
    "The year is invalid. Please check that entry includes four digits.";

// ── Format-guided parsing ───────────────────────────────────────────────────

/// Parse `input` with `format`, degrading on failure.
///
/// The full format is tried first, then the format limited to
/// `{year..second}`, `{year..minute}`, and so on down to `{year}`. The first
/// attempt that matches wins; a limit that leaves the format unchanged is not
/// retried.
///
/// # Errors
///
/// Returns [`GranularError::ParseFailure`] when even the year-only format
/// does not match, or [`GranularError::InvalidDatetime`] when a `U` value is
/// out of range.
pub(crate) fn parse_with_format(
    input: &str,
    tz: Tz,
    explicit: bool,
    format: &str,
    ctx: &Context,
) -> Result<GranularDate> {
    let input = input.trim();
    let mut attempt = format.to_string();
    trace!("parsing '{}' with format '{}'", input, attempt);
    if let Some(value) = parse_once(input, tz, explicit, &attempt, ctx)? {
        return Ok(value);
    }

    for keep in (1..=Granularity::CIVIL.len()).rev() {
        let allowed: GranularitySet = Granularity::CIVIL[..keep].iter().copied().collect();
        let limited = limit_format(&attempt, &allowed);
        if limited == attempt {
            continue;
        }
        attempt = limited;
        debug!("degraded format to '{}' for '{}'", attempt, input);
        if let Some(value) = parse_once(input, tz, explicit, &attempt, ctx)? {
            return Ok(value);
        }
    }

    Err(GranularError::ParseFailure {
        input: input.to_string(),
        format: format.to_string(),
    })
}

/// The working record one attempt fills in, with its defaults.
struct Record {
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            year: 0,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl Record {
    fn to_parts(&self) -> DateParts {
        DateParts {
            year: Some(self.year),
            month: Some(self.month),
            day: Some(self.day),
            hour: Some(self.hour),
            minute: Some(self.minute),
            second: Some(self.second),
            timezone: None,
        }
    }
}

/// One attempt. `Ok(None)` means this format does not fit the input.
///
/// Only an out-of-bounds year is kept as non-fatal taint. Any other field
/// out of range (a 13th month, the 31st of April) is taken as a sign the
/// format read the input wrongly, so the attempt fails and the degrade loop
/// moves on to a shorter format.
fn parse_once(
    input: &str,
    tz: Tz,
    explicit: bool,
    format: &str,
    ctx: &Context,
) -> Result<Option<GranularDate>> {
    let Ok(pattern) = CompiledPattern::compile(format) else {
        return Ok(None);
    };
    let Some(pairs) = pattern.extract(input) else {
        return Ok(None);
    };

    let mut record = Record::default();
    let mut granularity = GranularitySet::empty();
    let mut errors = FieldErrors::new();
    let mut meridiem: Option<String> = None;
    let mut time_set = false;

    for (directive, value) in pairs {
        let number = || value.trim().parse::<i64>().ok();
        match directive {
            Directive::DayPadded | Directive::Day => {
                let Some(day) = number() else { return Ok(None) };
                record.day = day;
                granularity.insert(Granularity::Day);
            }
            Directive::MonthPadded | Directive::Month => {
                let Some(month) = number() else { return Ok(None) };
                record.month = month;
                granularity.insert(Granularity::Month);
            }
            Directive::MonthName | Directive::MonthAbbr => {
                let abbreviated = directive == Directive::MonthAbbr;
                let Some(month) = ctx.month_number(value, abbreviated) else {
                    debug!("'{}' is not a month name", value);
                    return Ok(None);
                };
                record.month = i64::from(month);
                granularity.insert(Granularity::Month);
            }
            Directive::Year => {
                let Some(year) = number() else { return Ok(None) };
                if value.trim_start_matches('-').len() < 4 {
                    errors.insert(Granularity::Year, SHORT_YEAR_MESSAGE);
                }
                record.year = year;
                granularity.insert(Granularity::Year);
            }
            Directive::YearShort => {
                let Some(year) = number() else { return Ok(None) };
                let century = i64::from(now_in(&tz, ctx).year()).div_euclid(100);
                record.year = century * 100 + year;
                granularity.insert(Granularity::Year);
            }
            Directive::MeridiemLower | Directive::MeridiemUpper => {
                meridiem = Some(value.to_ascii_lowercase());
            }
            Directive::Hour12
            | Directive::Hour24
            | Directive::Hour12Padded
            | Directive::Hour24Padded => {
                let Some(hour) = number() else { return Ok(None) };
                record.hour = hour;
                time_set = true;
                granularity.insert(Granularity::Hour);
            }
            Directive::Minute => {
                let Some(minute) = number() else { return Ok(None) };
                record.minute = minute;
                time_set = true;
                granularity.insert(Granularity::Minute);
            }
            Directive::Second => {
                let Some(second) = number() else { return Ok(None) };
                record.second = second;
                time_set = true;
                granularity.insert(Granularity::Second);
            }
            Directive::Timestamp => {
                let Some(seconds) = number() else { return Ok(None) };
                let utc = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
                    GranularError::InvalidDatetime(format!("timestamp {seconds} out of range"))
                })?;
                return Ok(Some(GranularDate::assemble(
                    utc.with_timezone(&tz),
                    GranularitySet::civil(),
                    false,
                    false,
                    FieldErrors::new(),
                )));
            }
            // Matched for shape only.
            _ => {}
        }
    }

    match meridiem.as_deref() {
        Some("pm") if record.hour < 12 => record.hour += 12,
        Some("am") if record.hour == 12 => record.hour = 0,
        _ => {}
    }

    // Out-of-bounds years are policy and stay as taint; any other range error
    // means this format read the input wrongly.
    let range_errors = fuzzy::array_errors(&record.to_parts(), ctx);
    if range_errors.iter().any(|(g, _)| g != Granularity::Year) {
        debug!("'{}' with '{}' is out of range: {}", input, format, range_errors);
        return Ok(None);
    }
    errors.extend(range_errors);

    if explicit {
        granularity.insert(Granularity::Timezone);
    }
    let time_only = !granularity.has_date();
    let date_only = !time_set;

    let base = now_in(&tz, ctx);
    let mut date = base.date_naive();
    if !time_only && !errors.has_date_errors() {
        match civil_date(record.year, record.month, record.day) {
            Some(d) => date = d,
            None => return Ok(None),
        }
    }
    let mut time = base.time();
    if !errors.has_time_errors() {
        match civil_time(record.hour, record.minute, record.second) {
            Some(t) => time = t,
            None => return Ok(None),
        }
    }

    Ok(Some(GranularDate::assemble(
        localize(&tz, &date.and_time(time)),
        granularity,
        time_only,
        date_only,
        errors,
    )))
}

// ── Unstructured parsing ────────────────────────────────────────────────────

static ISO_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-?\d{4})(?:-(\d{1,2})(?:-(\d{1,2})(?:(?:T|\s+)(\d{1,2}):(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?\s*(Z|[+-]\d{2}(?::?\d{2})?)?)?)?)?$",
    )
    .expect("regex construction")
});

static ICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:T(\d{2})(\d{2})(\d{2})?(Z)?)?$")
        .expect("regex construction")
});

/// `5 March 2024`, `Tue, 05 Mar 2024 14:07:09 +0000`.
static WRITTEN_DMY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z]+,?\s*)?(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]+)\.?,?\s+(-?\d{4})(?:,?\s+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*([AaPp]\.?[Mm]\.?)?)?\s*(UTC|UT|GMT|Z|[+-]\d{2}:?\d{2})?$",
    )
    .expect("regex construction")
});

/// `March 5, 2024`, `Mar 5 2024 10:30 pm`.
static WRITTEN_MDY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z]+,?\s+)?([A-Za-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(-?\d{4})(?:,?\s+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*([AaPp]\.?[Mm]\.?)?)?\s*(UTC|UT|GMT|Z|[+-]\d{2}:?\d{2})?$",
    )
    .expect("regex construction")
});

static BARE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?\s*([AaPp]\.?[Mm]\.?)?$")
        .expect("regex construction")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Utc,
    /// Seconds east of UTC.
    Offset(i32),
}

/// Fields found by one of the unstructured shapes.
#[derive(Debug, Default)]
struct Scanned {
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    hour: Option<i64>,
    minute: Option<i64>,
    second: Option<i64>,
    nanos: u32,
    meridiem: Option<char>,
    zone: Option<Zone>,
}

/// Parse text without a format.
///
/// `now` (any case) is the context clock with full civil granularity and
/// `@<seconds>` is an epoch in UTC. Input carrying its own zone (`Z`, `UTC`,
/// an offset) resolves to that instant and is expressed in UTC; otherwise
/// the wall clock is read in `tz`. A time given to the minute also grants
/// `second`.
///
/// # Errors
///
/// [`GranularError::ParseFailure`] for unrecognised text and
/// [`GranularError::InvalidDatetime`] for recognised text naming a date or
/// time that does not exist.
pub(crate) fn parse_text(
    input: &str,
    tz: Tz,
    explicit: bool,
    ctx: &Context,
) -> Result<GranularDate> {
    let text = input.trim().replace("GMT-", "-").replace("GMT+", "+");

    let mut zone_granularity = GranularitySet::empty();
    if explicit {
        zone_granularity.insert(Granularity::Timezone);
    }

    if text.eq_ignore_ascii_case("now") {
        let mut granularity = GranularitySet::civil();
        if explicit {
            granularity.insert(Granularity::Timezone);
        }
        return Ok(GranularDate::assemble(
            now_in(&tz, ctx),
            granularity,
            false,
            false,
            FieldErrors::new(),
        ));
    }

    if let Some(epoch) = text.strip_prefix('@') {
        let utc = epoch
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
            .ok_or_else(|| GranularError::InvalidDatetime(format!("'{input}'")))?;
        return Ok(GranularDate::assemble(
            utc.with_timezone(&Tz::UTC),
            GranularitySet::full(),
            false,
            false,
            FieldErrors::new(),
        ));
    }

    let scanned = scan_iso(&text)
        .or_else(|| scan_ical(&text))
        .or_else(|| scan_written(&text))
        .or_else(|| scan_time(&text));
    let Some(scanned) = scanned else {
        debug!("no unstructured shape matches '{}'", input);
        return Err(GranularError::ParseFailure {
            input: input.to_string(),
            format: String::new(),
        });
    };

    build(scanned, input, tz, zone_granularity, ctx)
}

fn build(
    scanned: Scanned,
    input: &str,
    tz: Tz,
    mut granularity: GranularitySet,
    ctx: &Context,
) -> Result<GranularDate> {
    let invalid = || GranularError::InvalidDatetime(format!("'{input}'"));

    let mut hour = scanned.hour.unwrap_or(0);
    match scanned.meridiem {
        Some('p') if hour < 12 => hour += 12,
        Some('a') if hour == 12 => hour = 0,
        _ => {}
    }

    let date = match scanned.year {
        Some(year) => civil_date(year, scanned.month.unwrap_or(1), scanned.day.unwrap_or(1))
            .ok_or_else(invalid)?,
        None => now_in(&tz, ctx).date_naive(),
    };
    let time = civil_time(hour, scanned.minute.unwrap_or(0), scanned.second.unwrap_or(0))
        .and_then(|t| t.with_nanosecond(scanned.nanos))
        .ok_or_else(invalid)?;
    let wall = date.and_time(time);

    let (year, month, day) = (scanned.year, scanned.month, scanned.day);
    for (g, present) in [
        (Granularity::Year, year.is_some()),
        (Granularity::Month, month.is_some()),
        (Granularity::Day, day.is_some()),
        (Granularity::Hour, scanned.hour.is_some()),
        (Granularity::Minute, scanned.hour.is_some()),
        (Granularity::Second, scanned.hour.is_some()),
    ] {
        if present {
            granularity.insert(g);
        }
    }

    let instant = match scanned.zone {
        None => localize(&tz, &wall),
        Some(zone) => {
            granularity.insert(Granularity::Timezone);
            let offset = match zone {
                Zone::Utc => 0,
                Zone::Offset(seconds) => seconds,
            };
            FixedOffset::east_opt(offset)
                .and_then(|fixed| fixed.from_local_datetime(&wall).single())
                .ok_or_else(invalid)?
                .with_timezone(&Tz::UTC)
        }
    };

    Ok(GranularDate::assemble(
        instant,
        granularity,
        year.is_none(),
        scanned.hour.is_none(),
        FieldErrors::new(),
    ))
}

fn int(caps: &Captures<'_>, i: usize) -> Option<i64> {
    caps.get(i).and_then(|m| m.as_str().parse().ok())
}

fn nanos(caps: &Captures<'_>, i: usize) -> u32 {
    caps.get(i)
        .map(|m| {
            let digits = m.as_str();
            let value: u32 = digits.parse().unwrap_or(0);
            value * 10u32.pow(9 - digits.len() as u32)
        })
        .unwrap_or(0)
}

fn zone(caps: &Captures<'_>, i: usize) -> Option<Zone> {
    let s = caps.get(i)?.as_str();
    match s {
        "Z" | "UTC" | "UT" | "GMT" => Some(Zone::Utc),
        _ => {
            let sign = if s.starts_with('-') { -1 } else { 1 };
            let digits: String = s[1..].chars().filter(char::is_ascii_digit).collect();
            let hours: i32 = digits.get(..2)?.parse().ok()?;
            let minutes: i32 = digits.get(2..).filter(|m| !m.is_empty()).map_or(Some(0), |m| m.parse().ok())?;
            Some(Zone::Offset(sign * (hours * 3600 + minutes * 60)))
        }
    }
}

fn meridiem(caps: &Captures<'_>, i: usize) -> Option<char> {
    caps.get(i)
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_lowercase())
}

/// English month names, any case, full or abbreviated to at least three
/// letters.
fn english_month(name: &str) -> Option<i64> {
    let lower = name.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|full| full.to_ascii_lowercase().starts_with(&lower))
        .map(|i| i as i64 + 1)
}

fn scan_iso(text: &str) -> Option<Scanned> {
    let caps = ISO_DATETIME.captures(text)?;
    Some(Scanned {
        year: int(&caps, 1),
        month: int(&caps, 2),
        day: int(&caps, 3),
        hour: int(&caps, 4),
        minute: int(&caps, 5),
        second: int(&caps, 6),
        nanos: nanos(&caps, 7),
        zone: zone(&caps, 8),
        ..Scanned::default()
    })
}

fn scan_ical(text: &str) -> Option<Scanned> {
    let caps = ICAL.captures(text)?;
    Some(Scanned {
        year: int(&caps, 1),
        month: int(&caps, 2),
        day: int(&caps, 3),
        hour: int(&caps, 4),
        minute: int(&caps, 5),
        second: int(&caps, 6),
        zone: caps.get(7).map(|_| Zone::Utc),
        ..Scanned::default()
    })
}

fn scan_written(text: &str) -> Option<Scanned> {
    let (caps, month_at, day_at) = match WRITTEN_DMY.captures(text) {
        Some(caps) => (caps, 2, 1),
        None => (WRITTEN_MDY.captures(text)?, 1, 2),
    };
    let month = english_month(caps.get(month_at)?.as_str())?;
    Some(Scanned {
        year: int(&caps, 3),
        month: Some(month),
        day: int(&caps, day_at),
        hour: int(&caps, 4),
        minute: int(&caps, 5),
        second: int(&caps, 6),
        meridiem: meridiem(&caps, 7),
        zone: zone(&caps, 8),
        ..Scanned::default()
    })
}

fn scan_time(text: &str) -> Option<Scanned> {
    let caps = BARE_TIME.captures(text)?;
    Some(Scanned {
        hour: int(&caps, 1),
        minute: int(&caps, 2),
        second: int(&caps, 3),
        nanos: nanos(&caps, 4),
        meridiem: meridiem(&caps, 5),
        ..Scanned::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MonthNames;

    fn ctx() -> Context {
        Context::fixed(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap())
    }

    fn parse(input: &str, format: Option<&str>) -> Result<GranularDate> {
        GranularDate::parse(input, None, format, &ctx())
    }

    fn set(elements: &[Granularity]) -> GranularitySet {
        elements.iter().copied().collect()
    }

    fn ymd(date: &GranularDate) -> (i32, u32, u32) {
        (date.year(), date.month(), date.day())
    }

    // ── format-guided ──

    #[test]
    fn test_day_month_year() {
        let date = parse("25/12/2024", Some("d/m/Y")).unwrap();
        assert_eq!(ymd(&date), (2024, 12, 25));
        assert_eq!(date.granularity(), GranularitySet::from_precision(Granularity::Day));
        assert!(date.is_date_only());
        assert!(!date.is_time_only());
        assert!(!date.has_errors());
        assert_eq!(date.hour(), 0);
    }

    #[test]
    fn test_impossible_month_is_parse_failure() {
        let err = parse("13/25/2024", Some("d/m/Y")).unwrap_err();
        assert!(matches!(err, GranularError::ParseFailure { .. }));
    }

    #[test]
    fn test_degrades_to_coarser_format() {
        let date = parse("2024-05", Some("Y-m-d")).unwrap();
        assert_eq!(date.granularity(), set(&[Granularity::Year, Granularity::Month]));
        assert_eq!(ymd(&date), (2024, 5, 1));
    }

    #[test]
    fn test_degrades_past_time() {
        let date = parse("2024-05-01", Some("Y-m-d H:i:s")).unwrap();
        assert_eq!(date.granularity(), GranularitySet::from_precision(Granularity::Day));
    }

    #[test]
    fn test_month_name_and_meridiem() {
        let date = parse("March 5, 2024 3:07 pm", Some("F j, Y g:i a")).unwrap();
        assert_eq!(ymd(&date), (2024, 3, 5));
        assert_eq!((date.hour(), date.minute()), (15, 7));
        assert!(!date.is_date_only());
        assert!(!date.has_granularity(Granularity::Second));
    }

    #[test]
    fn test_midnight_am() {
        let date = parse("12:15 AM", Some("h:i A")).unwrap();
        assert_eq!(date.hour(), 0);
        assert!(date.is_time_only());
        // The date half stays at the clock's date.
        assert_eq!(ymd(&date), (2026, 2, 18));
    }

    #[test]
    fn test_noon_pm_unchanged() {
        let date = parse("12:00 pm", Some("g:i a")).unwrap();
        assert_eq!(date.hour(), 12);
    }

    #[test]
    fn test_month_names_are_case_sensitive() {
        assert!(parse("march 2024", Some("F Y")).is_err());
        let date = parse("Mar 2024", Some("M Y")).unwrap();
        assert_eq!(date.month(), 3);
    }

    #[test]
    fn test_custom_month_names() {
        struct German;
        impl MonthNames for German {
            fn month_number(&self, name: &str, _abbreviated: bool) -> Option<u32> {
                match name {
                    "März" => Some(3),
                    "Mai" => Some(5),
                    _ => None,
                }
            }
        }
        let ctx = ctx().with_month_names(German);
        let date = GranularDate::parse("1. März 2024", None, Some("j. F Y"), &ctx).unwrap();
        assert_eq!(ymd(&date), (2024, 3, 1));
    }

    #[test]
    fn test_two_digit_year_takes_current_century() {
        let date = parse("05/01/24", Some("m/d/y")).unwrap();
        assert_eq!(ymd(&date), (2024, 5, 1));
    }

    #[test]
    fn test_short_four_digit_year_is_tainted() {
        let date = parse("5/1/24", Some("n/j/Y")).unwrap();
        assert_eq!(date.errors().get(Granularity::Year), Some(SHORT_YEAR_MESSAGE));
        assert!(date.has_granularity(Granularity::Year));
    }

    #[test]
    fn test_year_outside_bounds_is_tainted_not_fatal() {
        let date = parse("5000-01-01", Some("Y-m-d")).unwrap();
        assert_eq!(date.errors().get(Granularity::Year), Some("The year is invalid."));
    }

    #[test]
    fn test_timestamp_letter() {
        let date = parse("@1700000000", Some(r"\@U")).unwrap();
        assert_eq!(date.timestamp(), 1_700_000_000);
        assert_eq!(date.granularity(), GranularitySet::civil());
    }

    #[test]
    fn test_explicit_timezone_adds_granularity() {
        let date = GranularDate::parse("2024-05-01 10:00", Some("Europe/Paris"), Some("Y-m-d H:i"), &ctx()).unwrap();
        assert!(date.has_granularity(Granularity::Timezone));
        assert_eq!(date.hour(), 10);
        assert_eq!(date.timezone(), Tz::Europe__Paris);
    }

    #[test]
    fn test_escaped_letters_are_literal() {
        let date = parse("2024-05-01T10:30", Some(r"Y-m-d\TH:i")).unwrap();
        assert_eq!((date.hour(), date.minute()), (10, 30));
    }

    #[test]
    fn test_format_round_trip() {
        let original = GranularDate::from_timestamp(1_709_647_629, None, &ctx()).unwrap();
        let text = original.format("Y-m-d H:i:s", false);
        let back = parse(&text, Some("Y-m-d H:i:s")).unwrap();
        assert_eq!(back.instant(), original.instant());
    }

    // ── unstructured ──

    #[test]
    fn test_now() {
        let date = parse("now", None).unwrap();
        assert_eq!(date.timestamp(), ctx().now().timestamp());
        assert_eq!(date.granularity(), GranularitySet::civil());
    }

    #[test]
    fn test_epoch_text() {
        let date = parse("@0", None).unwrap();
        assert_eq!(date.year(), 1970);
        assert_eq!(date.timezone(), Tz::UTC);
    }

    #[test]
    fn test_iso_with_zulu() {
        let date = parse("2024-05-01T10:30:00Z", None).unwrap();
        assert_eq!(date.granularity(), GranularitySet::full());
        assert_eq!(date.hour(), 10);
        assert_eq!(date.timezone(), Tz::UTC);
    }

    #[test]
    fn test_offset_resolves_to_utc() {
        let date = parse("2024-05-01 10:30:00+02:00", None).unwrap();
        assert_eq!((date.hour(), date.minute()), (8, 30));
        assert_eq!(date.timezone(), Tz::UTC);
        let gmt = parse("2024-05-01 10:00 GMT+02:00", None).unwrap();
        assert_eq!(gmt.hour(), 8);
    }

    #[test]
    fn test_fractional_seconds() {
        let date = parse("2024-05-01T10:30:15.250Z", None).unwrap();
        assert_eq!(date.instant().nanosecond(), 250_000_000);
    }

    #[test]
    fn test_date_only_iso_in_named_zone() {
        let date = GranularDate::parse("2024-05-01", Some("America/New_York"), None, &ctx()).unwrap();
        assert_eq!(
            date.granularity(),
            GranularitySet::from_precision(Granularity::Day).with(Granularity::Timezone)
        );
        assert!(date.is_date_only());
        assert_eq!(date.hour(), 0);
        assert_eq!(date.timezone(), Tz::America__New_York);
    }

    #[test]
    fn test_partial_iso() {
        let date = parse("2024-05", None).unwrap();
        assert_eq!(date.granularity(), set(&[Granularity::Year, Granularity::Month]));
    }

    #[test]
    fn test_minute_time_grants_seconds() {
        let date = parse("2024-05-01 10:30", None).unwrap();
        assert_eq!(date.granularity(), GranularitySet::civil());
    }

    #[test]
    fn test_ical() {
        let date = parse("20240501T103000Z", None).unwrap();
        assert_eq!((date.day(), date.hour(), date.minute()), (1, 10, 30));
        assert!(date.has_granularity(Granularity::Timezone));
    }

    #[test]
    fn test_rfc2822() {
        let date = parse("Tue, 05 Mar 2024 14:07:09 +0000", None).unwrap();
        assert_eq!(date.timestamp(), 1_709_647_629);
    }

    #[test]
    fn test_written_dates() {
        let mdy = parse("March 5, 2024", None).unwrap();
        assert_eq!(ymd(&mdy), (2024, 3, 5));
        assert!(mdy.is_date_only());
        let dmy = parse("5th september 2024 10:30 pm", None).unwrap();
        assert_eq!(ymd(&dmy), (2024, 9, 5));
        assert_eq!(dmy.hour(), 22);
    }

    #[test]
    fn test_bare_time() {
        let date = parse("14:30", None).unwrap();
        assert!(date.is_time_only());
        assert_eq!(date.granularity(), set(&[Granularity::Hour, Granularity::Minute, Granularity::Second]));
        assert_eq!(ymd(&date), (2026, 2, 18));
        assert_eq!(parse("10:30 p.m.", None).unwrap().hour(), 22);
    }

    #[test]
    fn test_unrecognised_text() {
        assert!(matches!(parse("next blue moon", None), Err(GranularError::ParseFailure { .. })));
    }

    #[test]
    fn test_impossible_date_text() {
        assert!(matches!(parse("2024-02-30", None), Err(GranularError::InvalidDatetime(_))));
    }
}
