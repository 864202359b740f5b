//! Business calendar
//!
//! All due-date rules work on local calendar dates. Stored dates may arrive
//! either as bare `YYYY-MM-DD` strings or as full ISO timestamps; both are
//! normalized to a `NaiveDate` in the tenant's timezone before any
//! comparison so a time-of-day component can never shift a due date by one.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to calendar parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid reference month '{0}', expected MM/YYYY")]
    InvalidReferenceMonth(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Timezone wrapper for the tenant's business calendar
///
/// Wraps chrono_tz::Tz with string serialization.
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
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| CalendarError::UnknownTimezone(s.to_string()))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::America::Sao_Paulo)
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the local calendar date of a UTC instant
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Today's date, local to this timezone
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    /// Parses a stored date into a local calendar date.
    ///
    /// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (converted into this
    /// timezone first) and offset-less `YYYY-MM-DDTHH:MM:SS[.fff]` values,
    /// which are read as local wall-clock time.
    pub fn parse_date(&self, raw: &str) -> Result<NaiveDate, CalendarError> {
        let raw = raw.trim();

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(date);
        }

        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Ok(self.local_date(instant.with_timezone(&Utc)));
        }

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map(|local| {
                self.0
                    .from_local_datetime(&local)
                    .earliest()
                    .map(|dt| dt.date_naive())
                    .unwrap_or_else(|| local.date())
            })
            .map_err(|_| CalendarError::InvalidDate(raw.to_string()))
    }
}

/// Source of "today" for services and handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Wall clock in the given timezone
    System(Timezone),
    /// A pinned date, used by tests and batch reprocessing
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System(tz) => tz.today(),
            Clock::Fixed(date) => *date,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System(Timezone::default())
    }
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Last day-of-month number of the month containing `date`
pub fn last_day_of_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Adds calendar months, clamping to the end of shorter months
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// A billing reference month, written `MM/YYYY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceMonth {
    year: i32,
    month: u32,
}

impl ReferenceMonth {
    pub fn new(month: u32, year: i32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidReferenceMonth(format!("{:02}/{}", month, year)));
        }
        Ok(Self { year, month })
    }

    /// The reference month a date falls in
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for ReferenceMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

impl FromStr for ReferenceMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidReferenceMonth(s.to_string());
        let (month, year) = s.trim().split_once('/').ok_or_else(invalid)?;
        if month.len() != 2 || year.len() != 4 {
            return Err(invalid());
        }
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        Self::new(month, year).map_err(|_| invalid())
    }
}

impl Serialize for ReferenceMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReferenceMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_bare_date_is_not_shifted() {
        let tz = Timezone::default();
        assert_eq!(tz.parse_date("2024-03-01").unwrap(), date(2024, 3, 1));
    }

    #[test]
    fn test_parse_utc_midnight_lands_on_previous_local_day() {
        // 00:00 UTC is 21:00 of the previous day in São Paulo
        let tz = Timezone::default();
        assert_eq!(tz.parse_date("2024-03-01T00:00:00Z").unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn test_parse_local_timestamp_keeps_date() {
        let tz = Timezone::default();
        assert_eq!(tz.parse_date("2024-03-01T23:59:00").unwrap(), date(2024, 3, 1));
        assert_eq!(tz.parse_date("2024-03-01 08:15:00.123").unwrap(), date(2024, 3, 1));
    }

    #[test]
    fn test_parse_garbage_fails() {
        let tz = Timezone::default();
        assert!(matches!(tz.parse_date("01/03/2024"), Err(CalendarError::InvalidDate(_))));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(date(2024, 2, 10)), 29);
        assert_eq!(last_day_of_month(date(2023, 2, 10)), 28);
        assert_eq!(last_day_of_month(date(2024, 12, 31)), 31);
        assert_eq!(last_day_of_month(date(2024, 4, 1)), 30);
    }

    #[test]
    fn test_add_months_clamps() {
        assert_eq!(add_months(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(add_months(date(2024, 1, 15), 12), Some(date(2025, 1, 15)));
    }

    #[test]
    fn test_reference_month_round_trip() {
        let month: ReferenceMonth = "03/2024".parse().unwrap();
        assert_eq!(month.month(), 3);
        assert_eq!(month.year(), 2024);
        assert_eq!(month.to_string(), "03/2024");
        assert_eq!(month, ReferenceMonth::of(date(2024, 3, 17)));
    }

    #[test]
    fn test_reference_month_rejects_bad_input() {
        assert!("3/2024".parse::<ReferenceMonth>().is_err());
        assert!("13/2024".parse::<ReferenceMonth>().is_err());
        assert!("2024-03".parse::<ReferenceMonth>().is_err());
    }

    #[test]
    fn test_fixed_clock() {
        let clock = Clock::Fixed(date(2024, 3, 10));
        assert_eq!(clock.today(), date(2024, 3, 10));
    }
}
