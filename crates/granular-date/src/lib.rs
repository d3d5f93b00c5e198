//! # granular-date
//!
//! Date values that remember which of their parts were actually known.
//!
//! A [`GranularDate`] pairs a concrete instant with a granularity set
//! (`year`, `month`, `day`, `hour`, `minute`, `second`, `timezone`) so that
//! "May 2024" never turns into "May 1st 2024 at midnight" on the way out.
//! Values come from format-guided or free-form parsing, from loose parts, or
//! from timestamps, and can be formatted, merged, compared and completed
//! without fabricating precision.
//!
//! ## Modules
//!
//! - [`granularity`] — Granularity elements and the contiguity-checked set
//! - [`value`] — The value type, its constructors and granularity-aware mutators
//! - [`pattern`] — `date()`-style format directives and the pattern compiler
//! - [`parser`] — Format-guided parsing with degrade-on-failure, plus free-form parsing
//! - [`format`] — Rendering, named presets, relative intervals and granularity-limited format strings
//! - [`merge`] — Combining two partial values
//! - [`difference`] — Calendar-aware differences in years through seconds
//! - [`fuzzy`] — Field validation and fuzzy completion
//! - [`rounding`] — Increment rounding and all-day detection
//! - [`calendar`] — Leap years, month lengths, ISO and calendar weeks
//! - [`zone`] — Timezone resolution and wall-clock localization
//! - [`context`] — Injected timezone, month-name and clock services
//! - [`config`] — Validation bounds and year ranges
//! - [`error`] — Error types

#[macro_use]
mod logging;

pub mod calendar;
pub mod config;
pub mod context;
pub mod difference;
pub mod error;
pub mod format;
pub mod fuzzy;
pub mod granularity;
pub mod merge;
pub mod parser;
pub mod pattern;
pub mod rounding;
pub mod value;
pub mod zone;

pub use config::{ValidationConfig, YearRange};
pub use context::{
    Clock, Context, EnglishMonthNames, FixedClock, FixedTimezone, MonthNames, SystemClock,
    TimezoneProvider,
};
pub use difference::Unit;
pub use error::{FieldErrors, GranularError, Result};
pub use format::{
    format_duration, granularity_format, limit_format, FormatPreset, DATE_FORMAT_DATE,
    DATE_FORMAT_DATETIME, DATE_FORMAT_ICAL, DATE_FORMAT_ICAL_DATE, DATE_FORMAT_ISO,
    DATE_FORMAT_UNIX,
};
pub use fuzzy::{array_errors, force_valid, FuzzyMode};
pub use granularity::{Granularity, GranularitySet};
pub use pattern::{CompiledPattern, Directive};
pub use rounding::{is_all_day, round_to_increment};
pub use value::{DateInput, DateParts, GranularDate};
