//! Validation bounds and week conventions.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::GranularError;

/// Bounds and week conventions consulted by validation, fuzzy completion and
/// week arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Smallest year accepted as valid.
    pub min_year: i32,
    /// Largest year accepted as valid.
    pub max_year: i32,
    /// Which day begins a calendar week. Ignored in ISO mode.
    #[serde(with = "weekday_name")]
    pub first_day_of_week: Weekday,
    /// Count weeks as ISO 8601 weeks instead of calendar weeks.
    pub use_iso_weeks: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_year: 1,
            max_year: 4000,
            first_day_of_week: Weekday::Mon,
            use_iso_weeks: false,
        }
    }
}

impl ValidationConfig {
    pub fn year_in_range(&self, year: i64) -> bool {
        year >= i64::from(self.min_year) && year <= i64::from(self.max_year)
    }
}

mod weekday_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&day.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<Weekday>()
            .map_err(|_| serde::de::Error::custom(format!("invalid weekday '{s}'")))
    }
}

/// A min/max pair of years, usually expressed relative to the current year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    /// Parse a range such as `"-3:+3"`, `"0:+1"` or `"2008:2010"`.
    ///
    /// Four-digit parts are absolute years; signed parts are offsets from
    /// `this_year`; anything else means `this_year`. A reversed range is
    /// swapped. When `value_year` is given the range is widened to include it.
    ///
    /// # Errors
    ///
    /// Returns [`GranularError::InvalidYearRange`] if the string has no `:`
    /// or an offset moves a bound past the representable years.
    pub fn parse(s: &str, this_year: i32, value_year: Option<i32>) -> Result<Self, GranularError> {
        let (min_part, max_part) = s
            .split_once(':')
            .ok_or_else(|| GranularError::InvalidYearRange(s.to_string()))?;

        let resolve = |part: &str| {
            resolve_year_part(part, this_year)
                .ok_or_else(|| GranularError::InvalidYearRange(s.to_string()))
        };
        let mut min = resolve(min_part)?;
        let mut max = resolve(max_part)?;
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        if let Some(year) = value_year {
            min = min.min(year);
            max = max.max(year);
        }
        Ok(Self { min, max })
    }

    /// Whether `s` looks like a relative range (`-3:+3`).
    pub fn is_valid_relative(s: &str) -> bool {
        match s.split_once(':') {
            Some((min, max)) => {
                min.starts_with('-')
                    && min[1..].chars().all(|c| c.is_ascii_digit())
                    && (max.starts_with('+') || max.starts_with('-'))
                    && max[1..].chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        }
    }

    /// Render as offsets from `this_year`, e.g. `"-3:+1"`.
    pub fn to_relative_string(&self, this_year: i32) -> String {
        format!(
            "{}:{}",
            signed_offset(i64::from(self.min) - i64::from(this_year)),
            signed_offset(i64::from(self.max) - i64::from(this_year))
        )
    }
}

fn signed_offset(delta: i64) -> String {
    if delta < 0 {
        format!("-{}", delta.unsigned_abs())
    } else {
        format!("+{delta}")
    }
}

/// `None` when an offset overflows.
fn resolve_year_part(part: &str, this_year: i32) -> Option<i32> {
    let part = part.trim();
    if part.len() == 4 && part.chars().all(|c| c.is_ascii_digit()) {
        return Some(part.parse().unwrap_or(this_year));
    }
    let signed = part.starts_with('+') || part.starts_with('-');
    if signed && part.len() > 1 && part[1..].chars().all(|c| c.is_ascii_digit()) {
        return match part.parse::<i64>() {
            Ok(offset) => i32::try_from(offset).ok()?.checked_add(this_year),
            Err(_) => None,
        };
    }
    Some(this_year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let config = ValidationConfig::default();
        assert!(config.year_in_range(1));
        assert!(config.year_in_range(4000));
        assert!(!config.year_in_range(0));
        assert!(!config.year_in_range(4001));
    }

    #[test]
    fn test_config_from_json_with_defaults() {
        let config: ValidationConfig =
            serde_json::from_str(r#"{"max_year": 2100, "first_day_of_week": "Sun"}"#).unwrap();
        assert_eq!(config.max_year, 2100);
        assert_eq!(config.min_year, 1);
        assert_eq!(config.first_day_of_week, Weekday::Sun);
        assert!(!config.use_iso_weeks);
    }

    #[test]
    fn test_relative_year_range() {
        let range = YearRange::parse("-3:+3", 2026, None).unwrap();
        assert_eq!(range, YearRange { min: 2023, max: 2029 });
    }

    #[test]
    fn test_absolute_year_range() {
        let range = YearRange::parse("2008:2010", 2026, None).unwrap();
        assert_eq!(range, YearRange { min: 2008, max: 2010 });
    }

    #[test]
    fn test_reversed_range_is_swapped() {
        let range = YearRange::parse("+5:-5", 2026, None).unwrap();
        assert_eq!(range, YearRange { min: 2021, max: 2031 });
    }

    #[test]
    fn test_range_widened_by_value_year() {
        let range = YearRange::parse("-1:+1", 2026, Some(1999)).unwrap();
        assert_eq!(range, YearRange { min: 1999, max: 2027 });
    }

    #[test]
    fn test_range_without_colon_is_error() {
        assert!(YearRange::parse("2008", 2026, None).is_err());
    }

    #[test]
    fn test_relative_string() {
        let range = YearRange { min: 2023, max: 2027 };
        assert_eq!(range.to_relative_string(2026), "-3:+1");
        assert!(YearRange::is_valid_relative("-3:+1"));
        assert!(!YearRange::is_valid_relative("2008:2010"));
    }

    #[test]
    fn test_overflowing_offset_is_error() {
        assert_eq!(
            YearRange::parse("-3:+2147483647", 2026, None),
            Err(GranularError::InvalidYearRange("-3:+2147483647".to_string()))
        );
        assert!(YearRange::parse("+2147481622:+0", 2026, None).is_err());
        assert!(YearRange::parse("-3:+99999999999", 2026, None).is_err());
    }

    #[test]
    fn test_offsets_at_the_edge_of_i32() {
        let range = YearRange::parse("-0:+2147481621", 2026, None).unwrap();
        assert_eq!(range.max, i32::MAX);
        let range = YearRange::parse("-2147483648:+0", -1, None);
        assert!(range.is_err());
    }

    #[test]
    fn test_relative_string_at_i32_extremes() {
        let range = YearRange { min: i32::MIN, max: i32::MAX };
        assert_eq!(range.to_relative_string(2026), "-2147485674:+2147481621");
    }
}
