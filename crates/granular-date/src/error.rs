//! Error types for granular-date operations.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::granularity::Granularity;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GranularError {
    #[error("Cannot parse '{input}' with format '{format}'")]
    ParseFailure { input: String, format: String },

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Unrecognized unit: {0}")]
    UnrecognizedUnit(String),

    #[error("Invalid granularity: {0}")]
    InvalidGranularity(String),

    #[error("Invalid year range: {0}")]
    InvalidYearRange(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, GranularError>;

/// Non-fatal, per-field validation problems collected while a value is built.
///
/// A non-empty set marks the value as tainted: some of its concrete fields
/// may hold defaults rather than what the input said.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Granularity, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Record a message for `part`. The first message recorded for a part wins.
    pub fn insert(&mut self, part: Granularity, message: impl Into<String>) {
        self.0.entry(part).or_insert_with(|| message.into());
    }

    pub fn get(&self, part: Granularity) -> Option<&str> {
        self.0.get(&part).map(String::as_str)
    }

    pub fn contains(&self, part: Granularity) -> bool {
        self.0.contains_key(&part)
    }

    /// Whether any of the date parts (year, month, day) carry an error.
    pub fn has_date_errors(&self) -> bool {
        Granularity::DATE.iter().any(|g| self.contains(*g))
    }

    /// Whether any of the time parts (hour, minute, second) carry an error.
    pub fn has_time_errors(&self) -> bool {
        Granularity::TIME.iter().any(|g| self.contains(*g))
    }

    /// Merge `other` into `self`, keeping messages already present.
    pub fn extend(&mut self, other: FieldErrors) {
        for (part, message) in other.0 {
            self.insert(part, message);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Granularity, &str)> {
        self.0.iter().map(|(g, m)| (*g, m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join(" "))
    }
}
