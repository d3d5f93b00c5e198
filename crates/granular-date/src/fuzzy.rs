//! Field validation and fuzzy completion.
//!
//! [`force_valid`] maps any value of one field into its valid range, falling
//! back to either the first valid value or the clock's current value.
//! [`array_errors`] uses it to detect out-of-range parts, and
//! [`GranularDate::set_fuzzy_date`] uses it to turn a partial input into a
//! concrete date and time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::calendar::days_in_month;
use crate::context::Context;
use crate::error::{FieldErrors, GranularError, Result};
use crate::granularity::Granularity;
use crate::value::{civil_date, civil_time, now_in, DateInput, DateParts, GranularDate};
use crate::zone::resolve_timezone;

/// What to substitute for a missing or invalid field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuzzyMode {
    /// The smallest valid value: January, the 1st, midnight.
    #[default]
    First,
    /// The clock's current value for that field.
    Current,
}

impl fmt::Display for FuzzyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FuzzyMode::First => "first",
            FuzzyMode::Current => "current",
        })
    }
}

impl FromStr for FuzzyMode {
    type Err = GranularError;

    /// `"first"` selects [`FuzzyMode::First`]; `"current"` and `"now"` select
    /// [`FuzzyMode::Current`].
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(FuzzyMode::First),
            "current" | "now" => Ok(FuzzyMode::Current),
            other => Err(GranularError::InvalidFormat(format!("fuzzy mode '{other}'"))),
        }
    }
}

fn fallback(part: Granularity, mode: FuzzyMode, now: &DateTime<Tz>) -> i64 {
    if part == Granularity::Year {
        return i64::from(now.year());
    }
    match mode {
        FuzzyMode::First => match part {
            Granularity::Month | Granularity::Day => 1,
            _ => 0,
        },
        FuzzyMode::Current => match part {
            Granularity::Month => i64::from(now.month()),
            Granularity::Day => i64::from(now.day()),
            Granularity::Hour => i64::from(now.hour()),
            Granularity::Minute => i64::from(now.minute()),
            Granularity::Second => i64::from(now.second()),
            _ => 0,
        },
    }
}

fn current(ctx: &Context) -> DateTime<Tz> {
    now_in(&resolve_timezone(&ctx.default_timezone()), ctx)
}

/// A valid value for `part`.
///
/// `value` is returned when it is in range; otherwise the fallback for
/// `mode`. Years must be non-zero and inside the configured bounds and always
/// fall back to the current year. Days are checked against the length of
/// `month` in `year` when both are given and valid, else against 31.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use granular_date::{force_valid, Context, FuzzyMode, Granularity};
///
/// let ctx = Context::fixed(Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap());
/// let day = force_valid(Granularity::Day, 31, FuzzyMode::First, Some(2), Some(2023), &ctx);
/// assert_eq!(day, 1);
/// ```
pub fn force_valid(
    part: Granularity,
    value: i64,
    mode: FuzzyMode,
    month: Option<i64>,
    year: Option<i64>,
    ctx: &Context,
) -> i64 {
    let valid = match part {
        Granularity::Year => value != 0 && ctx.config().year_in_range(value),
        Granularity::Month => (1..=12).contains(&value),
        Granularity::Day => {
            let max_day = match (year, month) {
                (Some(y), Some(m)) => i32::try_from(y)
                    .ok()
                    .zip(u32::try_from(m).ok())
                    .and_then(|(y, m)| days_in_month(y, m))
                    .unwrap_or(31),
                _ => 31,
            };
            value >= 1 && value <= i64::from(max_day)
        }
        Granularity::Hour => (0..=23).contains(&value),
        Granularity::Minute | Granularity::Second => (0..=59).contains(&value),
        Granularity::Timezone => true,
    };
    if valid {
        return value;
    }
    let forced = fallback(part, mode, &current(ctx));
    debug!("{} {} is out of range, using {}", part, value, forced);
    forced
}

pub(crate) fn invalid_message(part: Granularity) -> String {
    format!("The {} is invalid.", part.name())
}

/// Per-field errors for a record.
///
/// Every supplied, non-zero part is checked with [`force_valid`]; a part the
/// check would change gets a message such as `"The day is invalid."`. Days
/// are checked against the record's own month and year, or the clock's when
/// those are missing.
pub fn array_errors(parts: &DateParts, ctx: &Context) -> FieldErrors {
    let now = current(ctx);
    let month = parts
        .month
        .filter(|m| *m != 0)
        .unwrap_or_else(|| i64::from(now.month()));
    let year = parts
        .year
        .filter(|y| *y != 0)
        .unwrap_or_else(|| i64::from(now.year()));

    let mut errors = FieldErrors::new();
    for part in Granularity::CIVIL {
        let Some(value) = parts.get(part).filter(|v| *v != 0) else {
            continue;
        };
        let forced = force_valid(part, value, FuzzyMode::Current, Some(month), Some(year), ctx);
        if forced != value {
            errors.insert(part, invalid_message(part));
        }
    }
    errors
}

impl GranularDate {
    /// Force this value to a concrete, valid date and time built from
    /// `input`.
    ///
    /// `input` is parsed in this value's zone (with `format` if given). Every
    /// field the parsed input supplied and that is in range is kept; every
    /// other field takes the `mode` fallback. The resulting date and time
    /// replace this value's instant. Granularity is unchanged.
    ///
    /// # Errors
    ///
    /// Propagates any error from building the input value.
    pub fn set_fuzzy_date(
        &mut self,
        input: impl Into<DateInput>,
        format: Option<&str>,
        mode: FuzzyMode,
        ctx: &Context,
    ) -> Result<()> {
        let comp = GranularDate::new(input, Some(self.timezone_name()), format, ctx)?;
        let now = current(ctx);

        let supplied = |part: Granularity| {
            if comp.has_granularity(part) {
                comp.field(part)
            } else {
                None
            }
        };
        let pick = |part: Granularity, month: Option<i64>, year: Option<i64>| match supplied(part) {
            Some(value) => force_valid(part, value, mode, month, year, ctx),
            None => fallback(part, mode, &now),
        };

        let year = pick(Granularity::Year, None, None);
        let month = pick(Granularity::Month, None, None);
        let day = pick(Granularity::Day, Some(month), Some(year));
        let hour = pick(Granularity::Hour, None, None);
        let minute = pick(Granularity::Minute, None, None);
        let second = pick(Granularity::Second, None, None);

        trace!(
            "fuzzy {} completion gave {}-{}-{} {}:{}:{}",
            mode, year, month, day, hour, minute, second
        );

        let date = civil_date(year, month, day)
            .ok_or_else(|| GranularError::InvalidDatetime(format!("{year}-{month}-{day}")))?;
        let time = civil_time(hour, minute, second)
            .ok_or_else(|| GranularError::InvalidDatetime(format!("{hour}:{minute}:{second}")))?;
        self.set_date(date);
        self.set_time(time);
        Ok(())
    }
}
