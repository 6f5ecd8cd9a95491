//! Calendar date without a time component, as used by the daily streak.
//!
//! Streak bookkeeping only cares about which calendar day something happened on,
//! so dates are stored as ISO `YYYY-MM-DD` strings rather than timestamps.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ISO_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid calendar date '{0}', expected YYYY-MM-DD")]
pub struct ParseDateError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// The day before this one. Saturates at the earliest representable date.
    pub fn yesterday(&self) -> Self {
        self.minus_days(1)
    }

    pub fn minus_days(&self, days: u64) -> Self {
        Self(self.0.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }

    pub fn plus_days(&self, days: u64) -> Self {
        Self(self.0.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX))
    }

    /// Absolute number of calendar days between two dates.
    pub fn days_between(&self, other: &CalendarDate) -> i64 {
        self.0.signed_duration_since(other.0).num_days().abs()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), ISO_FORMAT)
            .map(Self)
            .map_err(|_| ParseDateError(s.to_string()))
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = ParseDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}
