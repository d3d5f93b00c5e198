//! The granularity-aware date value.
//!
//! A [`GranularDate`] owns a concrete instant in a named timezone together with
//! the set of elements its input actually supplied. The instant always holds a
//! full date and time. Elements outside the granularity hold defaults and are
//! hidden by [`GranularDate::format`] and [`GranularDate::to_array`].

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::context::Context;
use crate::error::{FieldErrors, GranularError, Result};
use crate::format::DATE_FORMAT_DATETIME;
use crate::fuzzy;
use crate::granularity::{Granularity, GranularitySet};
use crate::parser;
use crate::zone::{localize, parse_timezone, resolve_timezone};

// ── Input shapes ────────────────────────────────────────────────────────────

/// A partial date record: any subset of the six civil fields plus a timezone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateParts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl DateParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ymd(year: i64, month: i64, day: i64) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
            ..Self::default()
        }
    }

    /// Set one civil field. A `timezone` part is ignored; use
    /// [`DateParts::with_timezone`].
    pub fn with(mut self, part: Granularity, value: i64) -> Self {
        self.set(part, Some(value));
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn get(&self, part: Granularity) -> Option<i64> {
        match part {
            Granularity::Year => self.year,
            Granularity::Month => self.month,
            Granularity::Day => self.day,
            Granularity::Hour => self.hour,
            Granularity::Minute => self.minute,
            Granularity::Second => self.second,
            Granularity::Timezone => None,
        }
    }

    pub fn set(&mut self, part: Granularity, value: Option<i64>) {
        match part {
            Granularity::Year => self.year = value,
            Granularity::Month => self.month = value,
            Granularity::Day => self.day = value,
            Granularity::Hour => self.hour = value,
            Granularity::Minute => self.minute = value,
            Granularity::Second => self.second = value,
            Granularity::Timezone => {}
        }
    }

    /// Render as an ISO 8601 string.
    ///
    /// With `full` every missing field is filled (`0000-01-01T00:00:00`
    /// defaults) so the result is always a complete datetime. Without it the
    /// string stops at the first missing field of each half: `{year: 2024}`
    /// gives `"2024"`, `{hour: 9, minute: 5}` gives `"09:05"`.
    pub fn to_iso(&self, full: bool) -> String {
        let fill = |value: Option<i64>, default: i64| if full { value.or(Some(default)) } else { value };
        let year = fill(self.year, 0);
        let month = fill(self.month, 1);
        let day = fill(self.day, 1);
        let hour = fill(self.hour, 0);
        let minute = fill(self.minute, 0);
        let second = fill(self.second, 0);

        let mut out = String::new();
        if let Some(year) = year {
            out.push_str(&format!("{year:04}"));
            if let Some(month) = month {
                out.push_str(&format!("-{month:02}"));
                if let Some(day) = day {
                    out.push_str(&format!("-{day:02}"));
                }
            }
        }
        if let Some(hour) = hour {
            if !out.is_empty() {
                out.push('T');
            }
            out.push_str(&format!("{hour:02}"));
            if let Some(minute) = minute {
                out.push_str(&format!(":{minute:02}"));
                if let Some(second) = second {
                    out.push_str(&format!(":{second:02}"));
                }
            }
        }
        out
    }

    fn has_any(&self, parts: &[Granularity]) -> bool {
        parts.iter().any(|g| self.get(*g).is_some())
    }
}

/// The three kinds of input a [`GranularDate`] is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Text(String),
    Parts(DateParts),
    /// Seconds since the Unix epoch.
    Timestamp(i64),
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

impl From<DateParts> for DateInput {
    fn from(parts: DateParts) -> Self {
        DateInput::Parts(parts)
    }
}

impl From<i64> for DateInput {
    fn from(seconds: i64) -> Self {
        DateInput::Timestamp(seconds)
    }
}

/// Text made only of an optional sign and digits is treated as a timestamp
/// when no format (or the `U` format) is given.
fn is_numeric(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

// ── The value ───────────────────────────────────────────────────────────────

/// A date and time that knows which of its parts are real.
#[derive(Debug, Clone, PartialEq)]
pub struct GranularDate {
    pub(crate) instant: DateTime<Tz>,
    pub(crate) granularity: GranularitySet,
    pub(crate) time_only: bool,
    pub(crate) date_only: bool,
    pub(crate) errors: FieldErrors,
}

/// The zone to build in and whether the caller named it.
pub(crate) fn choose_zone(timezone: Option<&str>, ctx: &Context) -> (Tz, bool) {
    match timezone.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => (resolve_timezone(name), true),
        None => (resolve_timezone(&ctx.default_timezone()), false),
    }
}

impl GranularDate {
    pub(crate) fn assemble(
        instant: DateTime<Tz>,
        granularity: GranularitySet,
        time_only: bool,
        date_only: bool,
        errors: FieldErrors,
    ) -> Self {
        Self {
            instant,
            granularity,
            time_only,
            date_only,
            errors,
        }
    }

    /// Build a value from any supported input.
    ///
    /// # Arguments
    ///
    /// * `input` - Text, a [`DateParts`] record, or an epoch timestamp
    /// * `timezone` - IANA identifier; `None` asks the context's provider
    /// * `format` - `date()`-style format guiding a text parse
    /// * `ctx` - The services and bounds to consult
    ///
    /// Numeric input without a format (or with `"U"`) is an epoch timestamp.
    /// Text with a format goes through the degrade loop; text without one goes
    /// through the unstructured parser. A timezone that is not a named zone is
    /// replaced by UTC.
    ///
    /// # Errors
    ///
    /// Returns [`GranularError::ParseFailure`] when no degraded form of the
    /// format matches, or [`GranularError::InvalidDatetime`] when the input
    /// names an instant that cannot exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use granular_date::{Context, Granularity, GranularDate};
    ///
    /// let ctx = Context::fixed(Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap());
    /// let date = GranularDate::new("25/12/2024", None, Some("d/m/Y"), &ctx).unwrap();
    /// assert!(date.has_granularity(Granularity::Day));
    /// assert!(!date.has_time());
    /// ```
    pub fn new(
        input: impl Into<DateInput>,
        timezone: Option<&str>,
        format: Option<&str>,
        ctx: &Context,
    ) -> Result<Self> {
        let format = format.filter(|f| !f.is_empty());
        let epoch_format = format.is_none() || format == Some("U");
        match input.into() {
            DateInput::Timestamp(seconds) if epoch_format => {
                Self::from_timestamp(seconds, timezone, ctx)
            }
            DateInput::Timestamp(seconds) => {
                Self::new(DateInput::Text(seconds.to_string()), timezone, format, ctx)
            }
            DateInput::Parts(parts) => Self::from_parts(&parts, timezone, ctx),
            DateInput::Text(text) if epoch_format && is_numeric(text.trim()) => {
                let seconds = text.trim().parse::<i64>().map_err(|_| {
                    GranularError::InvalidDatetime(format!("timestamp '{text}' out of range"))
                })?;
                Self::from_timestamp(seconds, timezone, ctx)
            }
            DateInput::Text(text) => {
                let (tz, explicit) = choose_zone(timezone, ctx);
                match format {
                    Some(format) => parser::parse_with_format(&text, tz, explicit, format, ctx),
                    None => parser::parse_text(&text, tz, explicit, ctx),
                }
            }
        }
    }

    /// Parse text, optionally guided by a format. See [`GranularDate::new`].
    pub fn parse(
        input: &str,
        timezone: Option<&str>,
        format: Option<&str>,
        ctx: &Context,
    ) -> Result<Self> {
        Self::new(input, timezone, format, ctx)
    }

    /// Build a value from a partial record.
    ///
    /// The granularity is exactly the set of civil parts supplied, plus
    /// `timezone` when one was named. Out-of-range parts are recorded in
    /// [`GranularDate::errors`]; the half (date or time) they belong to then
    /// keeps its `0000-01-01 00:00:00` default instead of slipping into a
    /// neighbouring month or day. A zero month or day counts as out of range
    /// here, so construction only fails if the default itself cannot be built.
    pub fn from_parts(parts: &DateParts, timezone: Option<&str>, ctx: &Context) -> Result<Self> {
        let named = timezone.or(parts.timezone.as_deref());
        let (tz, explicit) = choose_zone(named, ctx);

        let time_only = !parts.has_any(&Granularity::DATE);
        let date_only = !parts.has_any(&Granularity::TIME);
        let mut errors = fuzzy::array_errors(parts, ctx);

        let mut granularity: GranularitySet = Granularity::CIVIL
            .into_iter()
            .filter(|g| parts.get(*g).is_some())
            .collect();
        if explicit {
            granularity.insert(Granularity::Timezone);
        }

        let mut date = NaiveDate::from_ymd_opt(0, 1, 1)
            .ok_or_else(|| GranularError::InvalidDatetime("0000-01-01".to_string()))?;
        let mut time = NaiveTime::MIN;
        if !errors.has_date_errors() {
            let (year, month, day) = (
                parts.year.unwrap_or(0),
                parts.month.unwrap_or(1),
                parts.day.unwrap_or(1),
            );
            match civil_date(year, month, day) {
                Some(d) => date = d,
                None => {
                    let part = if i32::try_from(year).is_err() {
                        Granularity::Year
                    } else if !(1..=12).contains(&month) {
                        Granularity::Month
                    } else {
                        Granularity::Day
                    };
                    errors.insert(part, fuzzy::invalid_message(part));
                }
            }
        }
        if !errors.has_time_errors() {
            let (hour, minute, second) = (
                parts.hour.unwrap_or(0),
                parts.minute.unwrap_or(0),
                parts.second.unwrap_or(0),
            );
            match civil_time(hour, minute, second) {
                Some(t) => time = t,
                None => {
                    let part = if !(0..=23).contains(&hour) {
                        Granularity::Hour
                    } else if !(0..=59).contains(&minute) {
                        Granularity::Minute
                    } else {
                        Granularity::Second
                    };
                    errors.insert(part, fuzzy::invalid_message(part));
                }
            }
        }

        let instant = localize(&tz, &date.and_time(time));
        Ok(Self::assemble(instant, granularity, time_only, date_only, errors))
    }

    /// Build a value from seconds since the Unix epoch, rendered into the
    /// target zone with full date and time granularity.
    pub fn from_timestamp(seconds: i64, timezone: Option<&str>, ctx: &Context) -> Result<Self> {
        let (tz, explicit) = choose_zone(timezone, ctx);
        let utc = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
            GranularError::InvalidDatetime(format!("timestamp {seconds} out of range"))
        })?;
        let mut granularity = GranularitySet::civil();
        if explicit {
            granularity.insert(Granularity::Timezone);
        }
        Ok(Self::assemble(
            utc.with_timezone(&tz),
            granularity,
            false,
            false,
            FieldErrors::new(),
        ))
    }

    /// The context's current instant with full civil granularity.
    pub fn now(timezone: Option<&str>, ctx: &Context) -> Self {
        let (tz, explicit) = choose_zone(timezone, ctx);
        let mut granularity = GranularitySet::civil();
        if explicit {
            granularity.insert(Granularity::Timezone);
        }
        Self::assemble(
            ctx.now().with_timezone(&tz),
            granularity,
            false,
            false,
            FieldErrors::new(),
        )
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn instant(&self) -> &DateTime<Tz> {
        &self.instant
    }

    pub fn timezone(&self) -> Tz {
        self.instant.timezone()
    }

    pub fn timezone_name(&self) -> &'static str {
        self.instant.timezone().name()
    }

    pub fn granularity(&self) -> GranularitySet {
        self.granularity
    }

    /// Per-field validation problems. Non-empty means the value is tainted.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Only a time was supplied; the date fields are artificial.
    pub fn is_time_only(&self) -> bool {
        self.time_only
    }

    /// Only a date was supplied; the time fields are artificial.
    pub fn is_date_only(&self) -> bool {
        self.date_only
    }

    pub fn naive_local(&self) -> NaiveDateTime {
        self.instant.naive_local()
    }

    pub fn timestamp(&self) -> i64 {
        self.instant.timestamp()
    }

    pub fn year(&self) -> i32 {
        self.instant.year()
    }

    pub fn month(&self) -> u32 {
        self.instant.month()
    }

    pub fn day(&self) -> u32 {
        self.instant.day()
    }

    pub fn hour(&self) -> u32 {
        self.instant.hour()
    }

    pub fn minute(&self) -> u32 {
        self.instant.minute()
    }

    pub fn second(&self) -> u32 {
        self.instant.second()
    }

    /// The concrete value of one civil field, regardless of granularity.
    pub fn field(&self, part: Granularity) -> Option<i64> {
        match part {
            Granularity::Year => Some(i64::from(self.year())),
            Granularity::Month => Some(i64::from(self.month())),
            Granularity::Day => Some(i64::from(self.day())),
            Granularity::Hour => Some(i64::from(self.hour())),
            Granularity::Minute => Some(i64::from(self.minute())),
            Granularity::Second => Some(i64::from(self.second())),
            Granularity::Timezone => None,
        }
    }

    // ── Granularity ─────────────────────────────────────────────────────────

    pub fn has_granularity(&self, part: Granularity) -> bool {
        self.granularity.contains(part)
    }

    /// Whether every element of `parts` is present.
    pub fn has_all_granularity(&self, parts: &GranularitySet) -> bool {
        self.granularity.contains_all(parts)
    }

    /// The contiguity check: `year` is present and no finer civil element
    /// appears without all coarser ones. `timezone` is exempt.
    pub fn is_valid_granularity(&self) -> bool {
        self.granularity.is_contiguous()
    }

    /// Contiguous, and (unless `flexible`) carrying every element of
    /// `required`.
    pub fn valid_granularity(&self, required: Option<&GranularitySet>, flexible: bool) -> bool {
        self.is_valid_granularity()
            && match required {
                Some(required) if !flexible => self.has_all_granularity(required),
                _ => true,
            }
    }

    /// Whether an hour was supplied.
    pub fn has_time(&self) -> bool {
        self.has_granularity(Granularity::Hour)
    }

    pub fn add_granularity(&mut self, part: Granularity) {
        self.granularity.insert(part);
    }

    pub fn remove_granularity(&mut self, part: Granularity) {
        self.granularity.remove(part);
    }

    /// Drop every civil element outside `allowed`; `timezone` is kept.
    pub fn limit_granularity(&mut self, allowed: &GranularitySet) {
        self.granularity.limit_to(allowed);
    }

    // ── Timezone ────────────────────────────────────────────────────────────

    /// Move the value into `tz`.
    ///
    /// A value without time or without timezone granularity keeps its
    /// wall-clock fields and only changes the zone label; so does any value
    /// when `force` is set. Relabelling adds `timezone` granularity. A value
    /// with both time and timezone granularity converts: the instant stays and
    /// the wall clock moves.
    pub fn set_timezone(&mut self, tz: Tz, force: bool) {
        if !self.has_time() || !self.has_granularity(Granularity::Timezone) || force {
            let wall = self.instant.naive_local();
            self.instant = localize(&tz, &wall);
            self.granularity.insert(Granularity::Timezone);
        } else {
            self.instant = self.instant.with_timezone(&tz);
        }
    }

    /// [`GranularDate::set_timezone`] with an identifier; unknown names
    /// become UTC.
    pub fn set_timezone_name(&mut self, name: &str, force: bool) {
        self.set_timezone(resolve_timezone(name), force);
    }

    // ── Field updates ───────────────────────────────────────────────────────

    /// Replace the date half, keeping the time of day and the zone.
    pub(crate) fn set_date(&mut self, date: NaiveDate) {
        let wall = date.and_time(self.instant.time());
        self.instant = localize(&self.instant.timezone(), &wall);
    }

    /// Replace the time half, keeping the date and the zone.
    pub(crate) fn set_time(&mut self, time: NaiveTime) {
        let wall = self.instant.date_naive().and_time(time);
        self.instant = localize(&self.instant.timezone(), &wall);
    }

    // ── Export ──────────────────────────────────────────────────────────────

    /// The known fields as a record.
    ///
    /// Fields outside the granularity are `None` unless `force` is set, in
    /// which case every field (and the zone name) is filled from the instant.
    pub fn to_array(&self, force: bool) -> DateParts {
        let mut parts = DateParts::new();
        for g in Granularity::CIVIL {
            if force || self.has_granularity(g) {
                parts.set(g, self.field(g));
            }
        }
        if force || self.has_granularity(Granularity::Timezone) {
            parts.timezone = Some(self.timezone_name().to_string());
        }
        parts
    }

    /// An `(iso_8601, timezone_id)` pair from which the value can be rebuilt.
    pub fn to_portable(&self) -> (String, String) {
        (
            self.instant.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            self.timezone_name().to_string(),
        )
    }

    /// Rebuild a value from [`GranularDate::to_portable`] output with full
    /// granularity.
    ///
    /// # Errors
    ///
    /// Returns [`GranularError::InvalidDatetime`] if `iso` is not RFC 3339, or
    /// [`GranularError::InvalidTimezone`] if `timezone` is not a known zone.
    pub fn from_portable(iso: &str, timezone: &str) -> Result<Self> {
        let tz = parse_timezone(timezone)?;
        let parsed = DateTime::parse_from_rfc3339(iso)
            .map_err(|e| GranularError::InvalidDatetime(format!("'{iso}': {e}")))?;
        Ok(Self::assemble(
            parsed.with_timezone(&tz),
            GranularitySet::full(),
            false,
            false,
            FieldErrors::new(),
        ))
    }
}

/// A calendar date from loosely typed fields, `None` if it does not exist.
pub(crate) fn civil_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )
}

/// A time of day from loosely typed fields, `None` if out of range.
pub(crate) fn civil_time(hour: i64, minute: i64, second: i64) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(
        u32::try_from(hour).ok()?,
        u32::try_from(minute).ok()?,
        u32::try_from(second).ok()?,
    )
}

impl fmt::Display for GranularDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.format(DATE_FORMAT_DATETIME, true),
            self.timezone_name()
        )
    }
}

// ── Serialization ───────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct PortableDate {
    iso: String,
    timezone: String,
    #[serde(default = "GranularitySet::full")]
    granularity: GranularitySet,
}

impl Serialize for GranularDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let (iso, timezone) = self.to_portable();
        PortableDate {
            iso,
            timezone,
            granularity: self.granularity,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GranularDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let portable = PortableDate::deserialize(deserializer)?;
        let mut value = GranularDate::from_portable(&portable.iso, &portable.timezone)
            .map_err(serde::de::Error::custom)?;
        value.granularity = portable.granularity;
        Ok(value)
    }
}

/// Wall-clock time of `ctx`'s clock in `tz`.
pub(crate) fn now_in(tz: &Tz, ctx: &Context) -> DateTime<Tz> {
    tz.from_utc_datetime(&ctx.now().naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx() -> Context {
        Context::fixed(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap())
    }

    #[test]
    fn test_from_parts_year_only() {
        let parts = DateParts::new().with(Granularity::Year, 2024);
        let date = GranularDate::from_parts(&parts, None, &ctx()).unwrap();
        assert!(!date.is_time_only());
        assert!(date.is_date_only());
        assert_eq!(date.granularity(), GranularitySet::from([Granularity::Year]));
        assert_eq!(date.to_array(false).to_iso(false), "2024");
        assert_eq!(date.format("Y-m-d", false), "2024");
        assert!(date.is_valid_granularity());
    }

    #[test]
    fn test_from_parts_time_only() {
        let parts = DateParts::new()
            .with(Granularity::Hour, 10)
            .with(Granularity::Minute, 15);
        let date = GranularDate::from_parts(&parts, Some("UTC"), &ctx()).unwrap();
        assert!(date.is_time_only());
        assert!(!date.is_date_only());
        assert_eq!(date.hour(), 10);
        assert_eq!(date.minute(), 15);
        assert!(date.has_granularity(Granularity::Timezone));
        assert!(!date.is_valid_granularity());
    }

    #[test]
    fn test_from_parts_invalid_day_does_not_slip() {
        let parts = DateParts::ymd(2023, 2, 31).with(Granularity::Hour, 9);
        let date = GranularDate::from_parts(&parts, None, &ctx()).unwrap();
        assert_eq!(date.errors().get(Granularity::Day), Some("The day is invalid."));
        assert_eq!(date.year(), 0);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
        assert_eq!(date.hour(), 9);
    }

    #[test]
    fn test_from_parts_zero_day_is_tainted() {
        let date = GranularDate::from_parts(&DateParts::ymd(2024, 5, 0), None, &ctx()).unwrap();
        assert_eq!(date.errors().get(Granularity::Day), Some("The day is invalid."));
        assert_eq!((date.year(), date.month(), date.day()), (0, 1, 1));
        assert!(date.has_granularity(Granularity::Day));
    }

    #[test]
    fn test_from_parts_zero_month_is_tainted() {
        let parts = DateParts::new()
            .with(Granularity::Year, 2024)
            .with(Granularity::Month, 0);
        let date = GranularDate::from_parts(&parts, None, &ctx()).unwrap();
        assert_eq!(date.errors().get(Granularity::Month), Some("The month is invalid."));
        assert!(!date.errors().contains(Granularity::Day));
    }

    #[test]
    fn test_from_parts_out_of_range_time_keeps_date() {
        let parts = DateParts::ymd(2024, 5, 1)
            .with(Granularity::Hour, 25)
            .with(Granularity::Minute, 61);
        let date = GranularDate::from_parts(&parts, None, &ctx()).unwrap();
        assert!(date.errors().contains(Granularity::Hour));
        assert!(date.errors().contains(Granularity::Minute));
        assert_eq!((date.year(), date.month(), date.day()), (2024, 5, 1));
        assert_eq!((date.hour(), date.minute()), (0, 0));
    }

    #[test]
    fn test_from_parts_year_beyond_calendar_is_tainted() {
        let parts = DateParts::ymd(i64::MAX, 1, 1);
        let date = GranularDate::from_parts(&parts, None, &ctx()).unwrap();
        assert!(date.errors().contains(Granularity::Year));
        assert_eq!(date.year(), 0);
    }

    #[test]
    fn test_from_parts_uses_record_timezone() {
        let parts = DateParts::ymd(2024, 7, 4).with_timezone("America/Chicago");
        let date = GranularDate::from_parts(&parts, None, &ctx()).unwrap();
        assert_eq!(date.timezone(), Tz::America__Chicago);
        assert!(date.has_granularity(Granularity::Timezone));
    }

    #[test]
    fn test_numeric_text_is_timestamp() {
        let date = GranularDate::new("0", Some("UTC"), None, &ctx()).unwrap();
        assert_eq!(date.year(), 1970);
        assert_eq!(date.granularity(), GranularitySet::full());
    }

    #[test]
    fn test_timestamp_renders_into_zone() {
        let date = GranularDate::from_timestamp(0, Some("America/New_York"), &ctx()).unwrap();
        assert_eq!(date.year(), 1969);
        assert_eq!(date.day(), 31);
        assert_eq!(date.hour(), 19);
        assert_eq!(date.timestamp(), 0);
    }

    #[test]
    fn test_raw_offset_zone_becomes_utc() {
        let date = GranularDate::from_timestamp(0, Some("+05:00"), &ctx()).unwrap();
        assert_eq!(date.timezone(), Tz::UTC);
    }

    #[test]
    fn test_default_zone_comes_from_provider() {
        let ctx = ctx().with_default_timezone("Asia/Tokyo");
        let date = GranularDate::from_parts(&DateParts::ymd(2024, 1, 1), None, &ctx).unwrap();
        assert_eq!(date.timezone(), Tz::Asia__Tokyo);
        assert!(!date.has_granularity(Granularity::Timezone));
    }

    #[test]
    fn test_set_timezone_relabels_without_time() {
        let mut date = GranularDate::from_parts(&DateParts::ymd(2024, 5, 1), None, &ctx()).unwrap();
        date.set_timezone(Tz::Pacific__Auckland, false);
        assert_eq!(date.day(), 1);
        assert_eq!(date.hour(), 0);
        assert_eq!(date.timezone(), Tz::Pacific__Auckland);
        assert!(date.has_granularity(Granularity::Timezone));
    }

    #[test]
    fn test_set_timezone_converts_with_time_and_zone() {
        let mut date = GranularDate::from_timestamp(0, Some("UTC"), &ctx()).unwrap();
        date.set_timezone(Tz::Asia__Kolkata, false);
        assert_eq!(date.timestamp(), 0);
        assert_eq!(date.hour(), 5);
        assert_eq!(date.minute(), 30);
    }

    #[test]
    fn test_set_timezone_force_relabels() {
        let mut date = GranularDate::from_timestamp(0, Some("UTC"), &ctx()).unwrap();
        date.set_timezone(Tz::Asia__Kolkata, true);
        assert_eq!(date.hour(), 0);
        assert_eq!(date.timestamp(), -19800);
    }

    #[test]
    fn test_hour_without_date_is_not_valid_granularity() {
        let mut date = GranularDate::now(None, &ctx());
        date.limit_granularity(&GranularitySet::from([Granularity::Hour]));
        assert!(!date.is_valid_granularity());
        assert!(!date.valid_granularity(None, true));
    }

    #[test]
    fn test_valid_granularity_required_and_flexible() {
        let date = GranularDate::from_parts(&DateParts::ymd(2024, 5, 1), None, &ctx()).unwrap();
        let wanted = GranularitySet::from_precision(Granularity::Minute);
        assert!(!date.valid_granularity(Some(&wanted), false));
        assert!(date.valid_granularity(Some(&wanted), true));
        assert!(date.valid_granularity(None, false));
    }

    #[test]
    fn test_limit_granularity_keeps_timezone() {
        let mut date = GranularDate::from_timestamp(0, Some("UTC"), &ctx()).unwrap();
        date.limit_granularity(&GranularitySet::from_precision(Granularity::Day));
        assert_eq!(
            date.granularity(),
            GranularitySet::from_precision(Granularity::Day).with(Granularity::Timezone)
        );
    }

    #[test]
    fn test_to_array_respects_granularity() {
        let date = GranularDate::from_parts(&DateParts::ymd(2024, 5, 1), None, &ctx()).unwrap();
        let parts = date.to_array(false);
        assert_eq!(parts, DateParts::ymd(2024, 5, 1));
        let forced = date.to_array(true);
        assert_eq!(forced.hour, Some(0));
        assert_eq!(forced.timezone.as_deref(), Some("UTC"));
    }

    #[test]
    fn test_to_iso_partial_and_full() {
        let parts = DateParts::new()
            .with(Granularity::Hour, 9)
            .with(Granularity::Minute, 5);
        assert_eq!(parts.to_iso(false), "09:05");
        assert_eq!(parts.to_iso(true), "0000-01-01T09:05:00");
        assert_eq!(DateParts::ymd(2024, 5, 1).to_iso(false), "2024-05-01");
        assert_eq!(DateParts::new().to_iso(false), "");
    }

    #[test]
    fn test_portable_pair() {
        let date = GranularDate::from_timestamp(1_700_000_000, Some("Europe/Paris"), &ctx()).unwrap();
        let (iso, tz) = date.to_portable();
        assert_eq!(iso, "2023-11-14T23:13:20+01:00");
        assert_eq!(tz, "Europe/Paris");
        let back = GranularDate::from_portable(&iso, &tz).unwrap();
        assert_eq!(back.instant(), date.instant());
        assert_eq!(back.timezone(), Tz::Europe__Paris);
        assert!(GranularDate::from_portable(&iso, "Nowhere/Land").is_err());
    }

    #[test]
    fn test_serde_keeps_granularity() {
        let date = GranularDate::from_parts(&DateParts::ymd(2024, 5, 1), Some("UTC"), &ctx()).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        let back: GranularDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.granularity(), date.granularity());
        assert_eq!(back.instant(), date.instant());
    }

    #[test]
    fn test_display() {
        let date = GranularDate::from_timestamp(0, Some("UTC"), &ctx()).unwrap();
        assert_eq!(date.to_string(), "1970-01-01 00:00:00 UTC");
    }
}
