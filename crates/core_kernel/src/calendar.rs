//! Billing-month calendar arithmetic
//!
//! Rent is billed per calendar month. `BillingMonth` is the (year, month)
//! cursor the allocator walks forward; every date a billing period needs
//! (first day, last day, due date) is derived from it here so the
//! December -> January rollover and leap-year Februaries live in one place.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Earliest year a billing month may fall in
pub const MIN_YEAR: i32 = 1;
/// Latest year a billing month may fall in
pub const MAX_YEAR: i32 = 9999;

/// Errors related to calendar operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid year: {0} (expected {MIN_YEAR}-{MAX_YEAR})")]
    InvalidYear(i32),

    #[error("Invalid due day: {0} (expected 1-31)")]
    InvalidDueDay(u32),

    #[error("Cannot parse billing month from '{0}' (expected YYYY-MM)")]
    Unparseable(String),
}

/// A calendar month that rent is billed for
///
/// Ordering is chronological: fields are compared year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    /// Creates a billing month, validating both components
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// The billing month containing `date`
    pub fn from_date(date: NaiveDate) -> Result<Self, CalendarError> {
        Self::new(date.year(), date.month())
    }

    /// All twelve months of `year`, January first
    pub fn months_of_year(year: i32) -> Result<Vec<Self>, CalendarError> {
        (1..=12).map(|month| Self::new(year, month)).collect()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month; December rolls over to January of the next year
    pub fn next(&self) -> Result<Self, CalendarError> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Number of days in this month, accounting for leap years
    pub fn days_in_month(&self) -> u32 {
        match self.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ if is_leap_year(self.year) => 29,
            _ => 28,
        }
    }

    /// First calendar day of the month
    pub fn period_start(&self) -> NaiveDate {
        self.day(1)
    }

    /// Last calendar day of the month
    pub fn period_end(&self) -> NaiveDate {
        self.day(self.days_in_month())
    }

    /// Rent due date for this month: the configured day, clamped to the
    /// month's last day (a due day of 31 lands on Feb 28/29, Apr 30, ...)
    pub fn due_date(&self, due_day: u32) -> NaiveDate {
        self.day(due_day.clamp(1, self.days_in_month()))
    }

    /// Returns true if `date` falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    fn day(&self, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
            .expect("year, month and day are validated on construction")
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| CalendarError::Unparseable(s.to_string()))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| CalendarError::Unparseable(s.to_string()))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| CalendarError::Unparseable(s.to_string()))?;
        Self::new(year, month)
    }
}

/// Gregorian leap-year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Validates a configured due day-of-month
pub fn validate_due_day(due_day: u32) -> Result<u32, CalendarError> {
    if (1..=31).contains(&due_day) {
        Ok(due_day)
    } else {
        Err(CalendarError::InvalidDueDay(due_day))
    }
}

/// Timezone the ledger's "today" and receipt timestamps are reckoned in
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl FromStr for Timezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| format!("Invalid timezone: {}", s))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Local calendar date of the given instant
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        self.to_local(utc).date_naive()
    }

    /// Billing month the given instant falls in, in local time
    pub fn billing_month(&self, utc: DateTime<Utc>) -> Result<BillingMonth, CalendarError> {
        BillingMonth::from_date(self.local_date(utc))
    }

    /// Formats an instant as local `YYYY-MM-DD HH:MM:SS`
    pub fn format_local(&self, utc: DateTime<Utc>) -> String {
        self.to_local(utc).format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> BillingMonth {
        BillingMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_next_within_year() {
        assert_eq!(ym(2024, 1).next().unwrap(), ym(2024, 2));
        assert_eq!(ym(2024, 11).next().unwrap(), ym(2024, 12));
    }

    #[test]
    fn test_next_rolls_december_into_january() {
        assert_eq!(ym(2024, 12).next().unwrap(), ym(2025, 1));
    }

    #[test]
    fn test_next_past_max_year_fails() {
        assert_eq!(
            ym(MAX_YEAR, 12).next(),
            Err(CalendarError::InvalidYear(MAX_YEAR + 1))
        );
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert_eq!(BillingMonth::new(2024, 0), Err(CalendarError::InvalidMonth(0)));
        assert_eq!(BillingMonth::new(2024, 13), Err(CalendarError::InvalidMonth(13)));
    }

    #[test]
    fn test_february_bounds() {
        assert_eq!(ym(2024, 2).period_end(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(ym(2023, 2).period_end(), NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
        assert_eq!(ym(1900, 2).days_in_month(), 28);
        assert_eq!(ym(2000, 2).days_in_month(), 29);
    }

    #[test]
    fn test_due_date_clamped_to_month_end() {
        assert_eq!(ym(2024, 2).due_date(31), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(ym(2024, 4).due_date(31), NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert_eq!(ym(2024, 1).due_date(5), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_ordering_is_chronological() {
        assert!(ym(2023, 12) < ym(2024, 1));
        assert!(ym(2024, 2) < ym(2024, 10));
    }

    #[test]
    fn test_display_and_parse() {
        let month = ym(2024, 3);
        assert_eq!(month.to_string(), "2024-03");
        assert_eq!("2024-03".parse::<BillingMonth>().unwrap(), month);
        assert!("2024/03".parse::<BillingMonth>().is_err());
    }
}
