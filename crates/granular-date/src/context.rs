//! The services the core consumes from its embedding application.
//!
//! Nothing in this crate reads ambient global state. Default timezone, month
//! names, the "current" instant and validation bounds all arrive through a
//! [`Context`] passed into each operation that needs them.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::ValidationConfig;

/// Supplies the site or user default timezone when none is given.
pub trait TimezoneProvider: Send + Sync {
    fn default_timezone(&self) -> String;
}

/// A provider that always answers with the same identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTimezone(pub String);

impl Default for FixedTimezone {
    fn default() -> Self {
        Self("UTC".to_string())
    }
}

impl TimezoneProvider for FixedTimezone {
    fn default_timezone(&self) -> String {
        self.0.clone()
    }
}

/// Locale-aware month name lookup used by the `F` and `M` format letters.
pub trait MonthNames: Send + Sync {
    /// The month number (1-12) for `name`, or `None` if it is not a month.
    fn month_number(&self, name: &str, abbreviated: bool) -> Option<u32>;
}

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English month names. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMonthNames;

impl MonthNames for EnglishMonthNames {
    fn month_number(&self, name: &str, abbreviated: bool) -> Option<u32> {
        MONTH_NAMES
            .iter()
            .position(|full| {
                if abbreviated {
                    full.get(..3) == Some(name)
                } else {
                    *full == name
                }
            })
            .map(|i| i as u32 + 1)
    }
}

/// The source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the OS clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Everything an operation may consult outside its own arguments.
#[derive(Clone)]
pub struct Context {
    timezones: Arc<dyn TimezoneProvider>,
    months: Arc<dyn MonthNames>,
    clock: Arc<dyn Clock>,
    config: ValidationConfig,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            timezones: Arc::new(FixedTimezone::default()),
            months: Arc::new(EnglishMonthNames),
            clock: Arc::new(SystemClock),
            config: ValidationConfig::default(),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("default_timezone", &self.timezones.default_timezone())
            .field("now", &self.clock.now())
            .field("config", &self.config)
            .finish()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose clock is frozen at `now`.
    pub fn fixed(now: DateTime<Utc>) -> Self {
        Self::default().with_clock(FixedClock(now))
    }

    pub fn with_timezone_provider(mut self, provider: impl TimezoneProvider + 'static) -> Self {
        self.timezones = Arc::new(provider);
        self
    }

    /// Shorthand for a [`FixedTimezone`] provider.
    pub fn with_default_timezone(self, timezone: impl Into<String>) -> Self {
        self.with_timezone_provider(FixedTimezone(timezone.into()))
    }

    pub fn with_month_names(mut self, months: impl MonthNames + 'static) -> Self {
        self.months = Arc::new(months);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_timezone(&self) -> String {
        self.timezones.default_timezone()
    }

    pub fn month_number(&self, name: &str, abbreviated: bool) -> Option<u32> {
        self.months.month_number(name, abbreviated)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}
