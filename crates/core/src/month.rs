//! Calendar month keys and their arithmetic.

use core::fmt;
use core::str::FromStr;

use chrono::Month;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};

/// A calendar month, identified by `(year, month)`.
///
/// Ordering is chronological. The wire form is `"MM-YYYY"`, which is also the
/// key format used by the record store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    // Field order matters: the derived `Ord` compares year first.
    year: i32,
    month: u32,
}

impl MonthKey {
    pub const MIN_YEAR: i32 = 1;
    pub const MAX_YEAR: i32 = 9999;

    /// Build a key, rejecting months outside 1..=12 and years that do not fit
    /// the 4-digit wire form.
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::invalid_month(format!(
                "month must be within 1..=12, got {month}"
            )));
        }
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(DomainError::invalid_month(format!(
                "year must be within {}..={}, got {year}",
                Self::MIN_YEAR,
                Self::MAX_YEAR
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month; December rolls over into January of the next year.
    ///
    /// `None` past December of [`Self::MAX_YEAR`].
    pub fn succ(self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1).ok()
        } else {
            Some(Self {
                year: self.year,
                month: self.month + 1,
            })
        }
    }

    /// The preceding month; January rolls back into December of the previous year.
    ///
    /// `None` before January of [`Self::MIN_YEAR`].
    pub fn pred(self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year - 1, 12).ok()
        } else {
            Some(Self {
                year: self.year,
                month: self.month - 1,
            })
        }
    }

    /// Signed number of months from `self` to `other` (0 when equal).
    pub fn months_until(self, other: MonthKey) -> i64 {
        (i64::from(other.year) - i64::from(self.year)) * 12 + i64::from(other.month)
            - i64::from(self.month)
    }

    /// Walk forward from `start` to `end`, both inclusive.
    ///
    /// Yields nothing when `end < start`; callers that need to reject that
    /// case must check before iterating.
    pub fn range_inclusive(start: MonthKey, end: MonthKey) -> impl Iterator<Item = MonthKey> {
        let mut next = (start <= end).then_some(start);
        core::iter::from_fn(move || {
            let current = next?;
            next = (current < end).then(|| current.succ()).flatten();
            Some(current)
        })
    }

    /// Walk backward starting at `self` (inclusive), most recent first.
    ///
    /// Ends at January of [`Self::MIN_YEAR`].
    pub fn iter_back(self) -> impl Iterator<Item = MonthKey> {
        core::iter::successors(Some(self), |k| k.pred())
    }

    /// English month name, e.g. `"March"`.
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }

    /// Human-readable label, e.g. `"March 2024"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl FromStr for MonthKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, year) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| DomainError::invalid_month(format!("expected MM-YYYY, got {s:?}")))?;

        let month: u32 = month
            .parse()
            .map_err(|_| DomainError::invalid_month(format!("bad month in {s:?}")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| DomainError::invalid_month(format!("bad year in {s:?}")))?;

        Self::new(year, month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
