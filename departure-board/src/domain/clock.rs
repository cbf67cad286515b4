//! Schedule clock times.
//!
//! GTFS stop times are written as "HH:MM:SS" relative to the start of the
//! service day, and the hour is allowed to run past 23 for trips that cross
//! midnight ("25:10:00" is 01:10 on the following calendar date). This module
//! keeps that value intact until it is placed on a concrete service day.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const SECS_PER_DAY: u32 = 24 * 60 * 60;

/// Error returned when parsing an invalid clock time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day measured from the start of a service day.
///
/// Unlike `NaiveTime`, values of 24:00:00 and beyond are valid.
///
/// # Examples
///
/// ```
/// use departure_board::domain::ClockTime;
///
/// let t = ClockTime::parse("09:15:00").unwrap();
/// assert_eq!(t.to_string(), "09:15:00");
///
/// let late = ClockTime::parse("25:10:00").unwrap();
/// assert!(late.is_next_day());
/// assert_eq!(late.to_string(), "25:10:00");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u32);

impl ClockTime {
    /// Build a clock time from components. Minutes and seconds must be below 60.
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Result<Self, TimeError> {
        if minutes > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if seconds > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .map(Self)
            .ok_or_else(|| TimeError::new("hour out of range"))
    }

    /// Parse "H:MM:SS" or "HH:MM:SS". Hours are not capped at 23.
    ///
    /// ```
    /// use departure_board::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse("7:05:00").is_ok());
    /// assert!(ClockTime::parse("30:00:00").is_ok());
    ///
    /// assert!(ClockTime::parse("09:15").is_err());
    /// assert!(ClockTime::parse("09:60:00").is_err());
    /// assert!(ClockTime::parse("ab:cd:ef").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if h.is_empty() || h.len() > 3 {
            return Err(TimeError::new("expected 1-3 hour digits"));
        }
        let hours = parse_digits(h).ok_or_else(|| TimeError::new("invalid hour digits"))?;

        if m.len() != 2 {
            return Err(TimeError::new("expected 2 minute digits"));
        }
        let minutes = parse_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;

        if sec.len() != 2 {
            return Err(TimeError::new("expected 2 second digits"));
        }
        let seconds = parse_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?;

        Self::from_hms(hours, minutes, seconds)
    }

    /// Seconds since the start of the service day.
    pub fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn hours(&self) -> u32 {
        self.0 / 3600
    }

    pub fn minutes(&self) -> u32 {
        (self.0 / 60) % 60
    }

    pub fn seconds(&self) -> u32 {
        self.0 % 60
    }

    /// True when the time falls on the calendar day after its service day.
    pub fn is_next_day(&self) -> bool {
        self.0 >= SECS_PER_DAY
    }

    /// Place this clock time on a service day.
    ///
    /// Times past 24:00 roll into the following calendar date.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use departure_board::domain::ClockTime;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
    /// let t = ClockTime::parse("24:30:00").unwrap();
    /// let instant = t.on(day).unwrap();
    /// assert_eq!(instant.date(), NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
    /// ```
    pub fn on(&self, service_day: NaiveDate) -> Option<NaiveDateTime> {
        service_day
            .and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::seconds(i64::from(self.0)))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({self})")
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
