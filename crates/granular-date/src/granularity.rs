//! Granularity elements and sets.
//!
//! A [`GranularitySet`] records which components of a date value were actually
//! supplied by its input. The civil elements form a chain from coarse to fine
//! (`year > month > day > hour > minute > second`); `timezone` sits outside the
//! chain and may be present or absent independently.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::GranularError;

/// One component of a date value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Timezone,
}

impl Granularity {
    /// Every element, in the fixed order used by merge and the degrade loop.
    pub const ALL: [Granularity; 7] = [
        Granularity::Year,
        Granularity::Month,
        Granularity::Day,
        Granularity::Hour,
        Granularity::Minute,
        Granularity::Second,
        Granularity::Timezone,
    ];

    /// The contiguity chain, coarse to fine.
    pub const CIVIL: [Granularity; 6] = [
        Granularity::Year,
        Granularity::Month,
        Granularity::Day,
        Granularity::Hour,
        Granularity::Minute,
        Granularity::Second,
    ];

    pub const DATE: [Granularity; 3] = [Granularity::Year, Granularity::Month, Granularity::Day];

    pub const TIME: [Granularity; 3] =
        [Granularity::Hour, Granularity::Minute, Granularity::Second];

    pub fn name(self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Month => "month",
            Granularity::Day => "day",
            Granularity::Hour => "hour",
            Granularity::Minute => "minute",
            Granularity::Second => "second",
            Granularity::Timezone => "timezone",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(self, Granularity::Year | Granularity::Month | Granularity::Day)
    }

    pub fn is_time(self) -> bool {
        matches!(
            self,
            Granularity::Hour | Granularity::Minute | Granularity::Second
        )
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Granularity {
    type Err = GranularError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Granularity::Year),
            "month" => Ok(Granularity::Month),
            "day" => Ok(Granularity::Day),
            "hour" => Ok(Granularity::Hour),
            "minute" => Ok(Granularity::Minute),
            "second" => Ok(Granularity::Second),
            "timezone" => Ok(Granularity::Timezone),
            other => Err(GranularError::InvalidGranularity(format!("'{other}'"))),
        }
    }
}

/// A set of [`Granularity`] elements.
///
/// Iteration always follows [`Granularity::ALL`] order, regardless of the
/// order elements were inserted in.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GranularitySet(u8);

impl GranularitySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// `year` through `second`, without `timezone`.
    pub fn civil() -> Self {
        Granularity::CIVIL.into_iter().collect()
    }

    /// Every element including `timezone`.
    pub fn full() -> Self {
        Granularity::ALL.into_iter().collect()
    }

    /// All civil elements from `year` down to and including `precision`.
    ///
    /// `from_precision(Granularity::Day)` is `{year, month, day}`. A
    /// `timezone` precision yields the full civil chain.
    pub fn from_precision(precision: Granularity) -> Self {
        Granularity::CIVIL
            .into_iter()
            .take_while(|g| *g <= precision)
            .collect()
    }

    pub fn insert(&mut self, g: Granularity) {
        self.0 |= g.bit();
    }

    pub fn remove(&mut self, g: Granularity) {
        self.0 &= !g.bit();
    }

    pub fn with(mut self, g: Granularity) -> Self {
        self.insert(g);
        self
    }

    pub fn without(mut self, g: Granularity) -> Self {
        self.remove(g);
        self
    }

    pub fn contains(&self, g: Granularity) -> bool {
        self.0 & g.bit() != 0
    }

    /// True when every element of `other` is present.
    pub fn contains_all(&self, other: &GranularitySet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Granularity> + '_ {
        Granularity::ALL.into_iter().filter(|g| self.contains(*g))
    }

    /// Whether any of hour, minute or second is present.
    pub fn has_time(&self) -> bool {
        Granularity::TIME.iter().any(|g| self.contains(*g))
    }

    /// Whether any of year, month or day is present.
    pub fn has_date(&self) -> bool {
        Granularity::DATE.iter().any(|g| self.contains(*g))
    }

    /// The contiguity check.
    ///
    /// Walking the civil chain coarse to fine, no element may be present once
    /// a coarser one was absent, and `year` must be present. `timezone` is
    /// ignored. `{year, hour}` fails: month and day were skipped.
    pub fn is_contiguous(&self) -> bool {
        let mut last = true;
        for g in Granularity::CIVIL {
            let present = self.contains(g);
            if present && !last {
                return false;
            }
            last = present;
        }
        self.contains(Granularity::Year)
    }

    /// Elements that are NOT in this set.
    pub fn missing(&self) -> GranularitySet {
        Self(!self.0 & GranularitySet::full().0)
    }

    /// The finest civil element present.
    pub fn precision(&self) -> Option<Granularity> {
        Granularity::CIVIL
            .into_iter()
            .rev()
            .find(|g| self.contains(*g))
    }

    /// Drop every civil element not in `allowed`. `timezone` is never removed.
    pub fn limit_to(&mut self, allowed: &GranularitySet) {
        for g in Granularity::CIVIL {
            if !allowed.contains(g) {
                self.remove(g);
            }
        }
    }

    /// The `Y-m-d H:i:s` prefix that covers this set's precision.
    ///
    /// `{year, month}` gives `Y-m`; an empty set gives the full format.
    pub fn datetime_format(&self) -> &'static str {
        match self.precision() {
            Some(Granularity::Year) => "Y",
            Some(Granularity::Month) => "Y-m",
            Some(Granularity::Day) => "Y-m-d",
            Some(Granularity::Hour) => "Y-m-d H",
            Some(Granularity::Minute) => "Y-m-d H:i",
            _ => "Y-m-d H:i:s",
        }
    }
}

impl FromIterator<Granularity> for GranularitySet {
    fn from_iter<I: IntoIterator<Item = Granularity>>(iter: I) -> Self {
        let mut set = GranularitySet::empty();
        for g in iter {
            set.insert(g);
        }
        set
    }
}

impl<const N: usize> From<[Granularity; N]> for GranularitySet {
    fn from(elements: [Granularity; N]) -> Self {
        elements.into_iter().collect()
    }
}

impl fmt::Debug for GranularitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for GranularitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Granularity::name).collect();
        f.write_str(&names.join(","))
    }
}

/// Parses a comma-separated list such as `"year,month,day"`.
impl FromStr for GranularitySet {
    type Err = GranularError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse::<Granularity>)
            .collect()
    }
}

impl Serialize for GranularitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for g in self.iter() {
            seq.serialize_element(&g)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for GranularitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = GranularitySet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of granularity names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut set = GranularitySet::empty();
                while let Some(g) = seq.next_element::<Granularity>()? {
                    set.insert(g);
                }
                Ok(set)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(SetVisitor)
    }
}
