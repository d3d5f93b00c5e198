//! Calendar-aware differences between two values.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::calendar::{day_of_year, days_in_year, iso_week, iso_weeks_in_year, start_of_week};
use crate::config::ValidationConfig;
use crate::error::GranularError;
use crate::value::GranularDate;

/// The measure a difference is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Unit {
    pub const ALL: [Unit; 7] = [
        Unit::Years,
        Unit::Months,
        Unit::Weeks,
        Unit::Days,
        Unit::Hours,
        Unit::Minutes,
        Unit::Seconds,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Unit::Years => "years",
            Unit::Months => "months",
            Unit::Weeks => "weeks",
            Unit::Days => "days",
            Unit::Hours => "hours",
            Unit::Minutes => "minutes",
            Unit::Seconds => "seconds",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = GranularError;

    /// Accepts the plural names and their singular forms, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Unit::ALL
            .into_iter()
            .find(|u| u.name() == lower || u.name().strip_suffix('s') == Some(lower.as_str()))
            .ok_or_else(|| GranularError::UnrecognizedUnit(s.to_string()))
    }
}

impl GranularDate {
    /// The non-negative distance between this value and `other` in `unit`.
    ///
    /// The operands are ordered by instant first, so the result does not
    /// depend on which side is the receiver. `seconds`, `minutes` and `hours`
    /// are elapsed time and may be fractional. `years`, `months`, `weeks` and
    /// `days` count calendar boundaries between wall-clock fields, with the
    /// later operand read in the earlier operand's zone.
    ///
    /// Weeks are ISO weeks when `config.use_iso_weeks` is set and otherwise
    /// calendar weeks starting on `config.first_day_of_week`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use granular_date::{Context, DateParts, GranularDate, Unit, ValidationConfig};
    ///
    /// let ctx = Context::fixed(Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap());
    /// let a = GranularDate::from_parts(&DateParts::ymd(2023, 1, 1), None, &ctx).unwrap();
    /// let b = GranularDate::from_parts(&DateParts::ymd(2024, 3, 1), None, &ctx).unwrap();
    /// assert_eq!(a.difference(&b, Unit::Months, &ValidationConfig::default()), 14.0);
    /// ```
    pub fn difference(&self, other: &GranularDate, unit: Unit, config: &ValidationConfig) -> f64 {
        let (earlier, later) = if other.instant() < self.instant() {
            (other, self)
        } else {
            (self, other)
        };
        let seconds = later.timestamp() - earlier.timestamp();
        if seconds == 0 {
            return 0.0;
        }

        let a = earlier.naive_local().date();
        let b = later
            .instant()
            .with_timezone(&earlier.timezone())
            .naive_local()
            .date();
        let years = i64::from(b.year()) - i64::from(a.year());

        match unit {
            Unit::Seconds => seconds as f64,
            Unit::Minutes => seconds as f64 / 60.0,
            Unit::Hours => seconds as f64 / 3600.0,
            Unit::Years => years as f64,
            Unit::Months => {
                let (m1, m2) = (i64::from(a.month()), i64::from(b.month()));
                if years == 0 {
                    (m2 - m1) as f64
                } else {
                    ((12 - m1) + (years - 1) * 12 + m2) as f64
                }
            }
            Unit::Days => {
                let (d1, d2) = (i64::from(day_of_year(a)), i64::from(day_of_year(b)));
                if years == 0 {
                    return (d2 - d1) as f64;
                }
                let spanned: i64 = (a.year() + 1..b.year())
                    .map(|y| i64::from(days_in_year(y)))
                    .sum();
                (i64::from(days_in_year(a.year())) - d1 + spanned + d2) as f64
            }
            Unit::Weeks if config.use_iso_weeks => {
                let (y1, w1) = iso_week(a);
                let (y2, w2) = iso_week(b);
                let spanned: i64 = (y1..y2).map(|y| i64::from(iso_weeks_in_year(y))).sum();
                (i64::from(w2) - i64::from(w1) + spanned) as f64
            }
            Unit::Weeks => {
                let first = config.first_day_of_week;
                let days = (start_of_week(b, first) - start_of_week(a, first)).num_days();
                (days / 7) as f64
            }
        }
    }

    /// [`difference`](Self::difference) with the unit given by name.
    ///
    /// Returns `None` when `unit` is not one of the known measures.
    pub fn difference_by_name(
        &self,
        other: &GranularDate,
        unit: &str,
        config: &ValidationConfig,
    ) -> Option<f64> {
        let unit = unit.parse::<Unit>().ok()?;
        Some(self.difference(other, unit, config))
    }
}
