//! Timezone resolution and wall-clock placement.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::GranularError;

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz, GranularError> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| GranularError::InvalidTimezone(format!("'{}'", s)))
}

/// Resolve an identifier to a named zone, downgrading to UTC.
///
/// Empty identifiers, identifiers without any letter (raw offsets such as
/// `+02:00`) and names the timezone database does not know all become UTC.
pub fn resolve_timezone(s: &str) -> Tz {
    let name = s.trim();
    if name.is_empty() || !name.chars().any(|c| c.is_ascii_alphabetic()) {
        warn!("timezone '{}' is not a named zone, using UTC", name);
        return Tz::UTC;
    }
    parse_timezone(name).unwrap_or_else(|_| {
        warn!("unknown timezone '{}', using UTC", name);
        Tz::UTC
    })
}

/// Place a wall-clock reading in `tz`.
///
/// An ambiguous reading (DST fall-back) takes the earlier instant. A reading
/// inside a DST gap moves forward by an hour, as the clocks did.
pub fn localize(tz: &Tz, naive: &NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let shifted = *naive + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(naive))
        }
    }
}

/// Whether daylight saving time is in effect for `dt`.
///
/// Compares the current offset with the smaller of the January and July
/// offsets of the same year, which is the zone's standard offset in either
/// hemisphere.
pub fn is_dst_active(dt: &DateTime<Tz>) -> bool {
    let tz = dt.timezone();
    let utc = dt.with_timezone(&Utc);
    let year = utc.year();

    let offset_at = |month: u32| {
        Utc.with_ymd_and_hms(year, month, 1, 12, 0, 0)
            .single()
            .map(|probe| probe.with_timezone(&tz).offset().fix().local_minus_utc())
    };

    let current = dt.offset().fix().local_minus_utc();
    match (offset_at(1), offset_at(7)) {
        (Some(jan), Some(jul)) => current > jan.min(jul),
        _ => false,
    }
}

/// Seconds east of UTC for `dt`.
pub fn offset_seconds(dt: &DateTime<Tz>) -> i32 {
    dt.offset().fix().local_minus_utc()
}

/// Format the UTC offset as `+hh:mm` or `+hhmm`.
pub fn format_utc_offset(dt: &DateTime<Tz>, colon: bool) -> String {
    let offset_secs = offset_seconds(dt);
    let sign = if offset_secs >= 0 { "+" } else { "-" };
    let abs_secs = offset_secs.unsigned_abs();
    let hours = abs_secs / 3600;
    let minutes = (abs_secs % 3600) / 60;
    if colon {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}")
    }
}
