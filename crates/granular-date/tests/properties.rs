use chrono::{TimeZone, Utc};
use granular_date::calendar::days_in_month;
use granular_date::{
    force_valid, limit_format, Context, DateParts, FuzzyMode, Granularity, GranularDate,
    GranularitySet, Unit, ValidationConfig,
};
use proptest::prelude::*;

fn ctx() -> Context {
    Context::fixed(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap())
}

const PIECES: &[&str] = &[
    "Y", "y", "m", "n", "F", "M", "d", "j", "D", "l", "S", "H", "G", "h", "g", "i", "s", "a", "A",
    "e", "T", "O", "\\T", "\\a", "\\-", "-", "/", ":", ".", ",", " ", "(", ")", "[", "]", "|",
];

fn format_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(PIECES), 0..16).prop_map(|pieces| pieces.concat())
}

fn granularity_strategy() -> impl Strategy<Value = GranularitySet> {
    prop::collection::vec(any::<bool>(), 7).prop_map(|bits| {
        Granularity::ALL
            .into_iter()
            .zip(bits)
            .filter(|(_, on)| *on)
            .map(|(g, _)| g)
            .collect()
    })
}

fn zone_strategy() -> impl Strategy<Value = Option<&'static str>> {
    prop::sample::select(vec![
        None,
        Some("UTC"),
        Some("Asia/Tokyo"),
        Some("America/New_York"),
        Some("Europe/Berlin"),
    ])
}

fn parts_strategy() -> impl Strategy<Value = DateParts> {
    (
        prop::option::of(1i64..=3000),
        prop::option::of(1i64..=12),
        prop::option::of(1i64..=28),
        prop::option::of(1i64..=23),
        prop::option::of(1i64..=59),
        prop::option::of(1i64..=59),
    )
        .prop_map(|(year, month, day, hour, minute, second)| DateParts {
            year,
            month,
            day,
            hour,
            minute,
            second,
            timezone: None,
        })
}

proptest! {
    #[test]
    fn limit_format_is_idempotent(format in format_strategy(), set in granularity_strategy()) {
        let once = limit_format(&format, &set);
        prop_assert_eq!(limit_format(&once, &set), once);
    }

    #[test]
    fn difference_is_order_independent(
        a in 0i64..4_000_000_000,
        b in 0i64..4_000_000_000,
        za in zone_strategy(),
        zb in zone_strategy(),
        iso in any::<bool>(),
    ) {
        let ctx = ctx();
        let x = GranularDate::from_timestamp(a, za, &ctx).unwrap();
        let y = GranularDate::from_timestamp(b, zb, &ctx).unwrap();
        let config = ValidationConfig { use_iso_weeks: iso, ..ValidationConfig::default() };
        for unit in Unit::ALL {
            prop_assert_eq!(x.difference(&y, unit, &config), y.difference(&x, unit, &config));
        }
    }

    #[test]
    fn merge_with_self_is_identity(parts in parts_strategy(), zone in zone_strategy()) {
        let value = GranularDate::from_parts(&parts, zone, &ctx()).unwrap();
        prop_assert_eq!(value.merge(&value), value);
    }

    #[test]
    fn merge_with_self_is_identity_for_timestamps(seconds in 0i64..4_000_000_000, zone in zone_strategy()) {
        let value = GranularDate::from_timestamp(seconds, zone, &ctx()).unwrap();
        prop_assert_eq!(value.merge(&value), value);
    }

    #[test]
    fn merge_borrows_missing_month(year in 1i64..=3000, month in 1i64..=12, day in 1i64..=28) {
        let ctx = ctx();
        let a = GranularDate::from_parts(&DateParts::new().with(Granularity::Year, year), None, &ctx).unwrap();
        let b = GranularDate::from_parts(&DateParts::ymd(2000, month, day), None, &ctx).unwrap();
        let merged = a.merge(&b);
        prop_assert!(merged.has_granularity(Granularity::Month));
        prop_assert_eq!(i64::from(merged.month()), month);
        prop_assert_eq!(i64::from(merged.year()), year);
    }

    #[test]
    fn datetime_format_round_trips(seconds in 0i64..4_000_000_000, zone in prop::sample::select(vec!["UTC", "Asia/Tokyo"])) {
        let ctx = ctx();
        let value = GranularDate::from_timestamp(seconds, Some(zone), &ctx).unwrap();
        let text = value.format("Y-m-d H:i:s", false);
        let back = GranularDate::parse(&text, Some(zone), Some("Y-m-d H:i:s"), &ctx).unwrap();
        prop_assert_eq!(back.timestamp(), seconds);
        prop_assert!(!back.has_errors());
    }

    #[test]
    fn forced_day_fits_month(
        day in -5i64..=40,
        month in 1i64..=12,
        year in 1i64..=3000,
        current in any::<bool>(),
    ) {
        let mode = if current { FuzzyMode::Current } else { FuzzyMode::First };
        let forced = force_valid(Granularity::Day, day, mode, Some(month), Some(year), &ctx());
        let last = days_in_month(year as i32, month as u32).unwrap();
        prop_assert!(forced >= 1);
        prop_assert!(forced <= i64::from(last));
    }

    #[test]
    fn from_parts_never_fails(
        year in prop::option::of(-10i64..=5000),
        month in prop::option::of(-2i64..=14),
        day in prop::option::of(-2i64..=40),
        hour in prop::option::of(-1i64..=25),
        minute in prop::option::of(-1i64..=61),
    ) {
        let parts = DateParts { year, month, day, hour, minute, second: None, timezone: None };
        let value = GranularDate::from_parts(&parts, None, &ctx());
        prop_assert!(value.is_ok());
    }

    #[test]
    fn contiguity_matches_supplied_parts(parts in parts_strategy()) {
        let value = GranularDate::from_parts(&parts, None, &ctx()).unwrap();
        let supplied: Vec<bool> = Granularity::CIVIL.iter().map(|g| parts.get(*g).is_some()).collect();
        let contiguous = supplied[0] && supplied.windows(2).all(|w| w[0] || !w[1]);
        prop_assert_eq!(value.is_valid_granularity(), contiguous);
    }
}

#[test]
fn forced_february_day_in_common_year() {
    let forced = force_valid(Granularity::Day, 31, FuzzyMode::First, Some(2), Some(2023), &ctx());
    assert!(forced <= 28);
}
