//! Calendar dates in the fixed-width `YYYYMMDD` encoding.
//!
//! A [`Date`] carries no time-of-day and no timezone. Every value is a real
//! Gregorian date with a four-digit year, so its textual form is always exactly
//! eight ASCII digits.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};

/// Largest year representable in the fixed-width encoding.
pub const MAX_YEAR: i32 = 9999;

/// A calendar date without time-of-day or zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Build a date from its components.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidDate` for impossible dates (Feb 30, month 13, ...)
    /// or years outside `0..=9999`.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(Self::from_naive)
            .ok_or_else(|| {
                EngineError::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day))
            })
    }

    /// Parse a `YYYYMMDD` string.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidDate` unless the input is exactly eight ASCII
    /// digits naming a real calendar day.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidDate(s.to_string());

        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        // All-digit input, so the slices are on char boundaries and parse cannot fail.
        let year: i32 = s[0..4].parse().map_err(|_| invalid())?;
        let month: u32 = s[4..6].parse().map_err(|_| invalid())?;
        let day: u32 = s[6..8].parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(Self::from_naive)
            .ok_or_else(invalid)
    }

    /// The current local calendar date.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Wrap a `NaiveDate`, rejecting years the encoding cannot hold.
    pub fn from_naive(date: NaiveDate) -> Option<Self> {
        (0..=MAX_YEAR).contains(&date.year()).then_some(Self(date))
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Weekday number with Monday = 1 and Sunday = 7.
    pub fn weekday_number(self) -> u32 {
        self.0.weekday().number_from_monday()
    }

    /// Add `days` days, or `None` if the result leaves the representable range.
    pub fn checked_add_days(self, days: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(days)).and_then(Self::from_naive)
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(self, other: Date) -> i64 {
        (other.0 - self.0).num_days()
    }
}

/// Whether `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Number of days in `month` (1-12) of `year`, or 0 for any other month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| {
            first
                .checked_add_months(Months::new(1))
                .map(|next| (next - first).num_days() as u32)
        })
        .unwrap_or(0)
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for Date {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s).map_err(de::Error::custom)
    }
}
