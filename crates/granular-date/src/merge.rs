//! Combining two partial values.

use chrono::Timelike;

use crate::calendar::days_in_month;
use crate::granularity::Granularity;
use crate::value::{civil_date, civil_time, GranularDate};
use crate::zone::localize;

impl GranularDate {
    /// Fill the fields this value lacks from `other`.
    ///
    /// The result keeps every element this value has and borrows, in
    /// `year..timezone` order, each element only `other` has. It lives in
    /// this value's zone when this value has `timezone` granularity or
    /// `other` does not; otherwise in `other`'s zone. `other` is read through
    /// a copy moved into that zone, so neither input changes.
    ///
    /// A borrowed day that does not exist in the combined month is clamped to
    /// the month's last day.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use granular_date::{Context, DateParts, Granularity, GranularDate};
    ///
    /// let ctx = Context::fixed(Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap());
    /// let day = GranularDate::from_parts(&DateParts::ymd(2024, 5, 1), None, &ctx).unwrap();
    /// let time = GranularDate::parse("09:30", None, Some("H:i"), &ctx).unwrap();
    /// let both = day.merge(&time);
    /// assert_eq!(both.format("Y-m-d H:i", false), "2024-05-01 09:30");
    /// ```
    pub fn merge(&self, other: &GranularDate) -> GranularDate {
        let use_tz = if self.has_granularity(Granularity::Timezone)
            || !other.has_granularity(Granularity::Timezone)
        {
            self.timezone()
        } else {
            other.timezone()
        };

        let mut merged = self.clone();
        if merged.timezone() != use_tz {
            merged.set_timezone(use_tz, false);
        }
        let mut theirs = other.clone();
        if theirs.timezone() != use_tz {
            theirs.set_timezone(use_tz, false);
        }

        let mut values = merged.to_array(true);
        let borrowed = theirs.to_array(false);
        for g in Granularity::ALL {
            if theirs.has_granularity(g) && !merged.has_granularity(g) {
                merged.add_granularity(g);
                values.set(g, borrowed.get(g));
            }
        }

        let year = values.year.unwrap_or(0);
        let month = values.month.unwrap_or(1);
        let mut day = values.day.unwrap_or(1);
        if let Some(last) = i32::try_from(year)
            .ok()
            .zip(u32::try_from(month).ok())
            .and_then(|(y, m)| days_in_month(y, m))
        {
            day = day.min(i64::from(last));
        }

        let date = civil_date(year, month, day);
        let time = civil_time(
            values.hour.unwrap_or(0),
            values.minute.unwrap_or(0),
            values.second.unwrap_or(0),
        );
        if let (Some(date), Some(time)) = (date, time) {
            let wall = date.and_time(time);
            let current = merged.naive_local();
            // Sub-second precision is not part of any granularity; keep it
            // when nothing else moved.
            if wall != current.with_nanosecond(0).unwrap_or(current) {
                merged.instant = localize(&use_tz, &wall);
            }
        }
        merged.errors.extend(other.errors.clone());
        merged
    }
}
