//! Julian-date time model shared by every crate in the workspace.
//!
//! All instants are Julian Dates on a single scale (UTC as supplied by the
//! caller). No barycentric correction is performed anywhere; mission time
//! systems are reduced to plain JD through a fixed additive offset. The only
//! other scale is the Terrestrial Time handed to the SOFA ephemerides, taken
//! as UTC plus a fixed offset.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    K2_TIME_OFFSET, MJD_ZERO_JD, SECONDS_PER_DAY, TESS_TIME_OFFSET, TT_MINUS_UTC_SECONDS,
    UNIX_EPOCH_JD,
};

/// Canonical textual representation used in reports and CSV output.
pub const ISO_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const MILLIS_PER_DAY: f64 = SECONDS_PER_DAY * 1_000.0;

/// Errors raised while parsing calendar input.
#[derive(Debug, Error, PartialEq)]
pub enum TimeError {
    #[error("invalid date `{0}` (expected YYYY-MM-DD)")]
    Date(String),
    #[error("invalid time of day `{0}` (expected HH:MM or HH:MM:SS)")]
    TimeOfDay(String),
    #[error("instant `{0}` is outside the supported calendar range")]
    OutOfRange(String),
    #[error("unknown time system `{0}` (expected bjd, tbjd, or bkjd)")]
    UnknownSystem(String),
}

/// A Julian Date in days.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JulianDate(f64);

impl JulianDate {
    /// Wrap a raw Julian Date.
    #[inline]
    pub const fn new(days: f64) -> Self {
        Self(days)
    }

    /// Raw Julian Date in days.
    #[inline]
    pub const fn days(self) -> f64 {
        self.0
    }

    /// Two-part `(2400000.5, MJD)` split, the form SOFA routines take.
    /// Treated as UT1; the UT1-UTC difference stays below a second.
    #[inline]
    pub fn two_part(self) -> (f64, f64) {
        (MJD_ZERO_JD, self.0 - MJD_ZERO_JD)
    }

    /// The same instant on Terrestrial Time, as a two-part date.
    #[inline]
    pub fn two_part_tt(self) -> (f64, f64) {
        (
            MJD_ZERO_JD,
            self.0 - MJD_ZERO_JD + TT_MINUS_UTC_SECONDS / SECONDS_PER_DAY,
        )
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(UNIX_EPOCH_JD + datetime.timestamp_millis() as f64 / MILLIS_PER_DAY)
    }

    pub fn from_naive_utc(datetime: NaiveDateTime) -> Self {
        Self::from_datetime(datetime.and_utc())
    }

    /// Convert to a UTC calendar instant, rounded to the millisecond.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if !self.0.is_finite() {
            return None;
        }
        let millis = ((self.0 - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp_millis(millis as i64)
    }

    /// Format as `YYYY-MM-DD HH:MM:SS.sss`, falling back to the raw JD.
    pub fn format_iso(self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.format(ISO_FORMAT).to_string(),
            None => format!("JD {:.6}", self.0),
        }
    }

    /// Build an instant from a `YYYY-MM-DD` date and an optional `HH:MM[:SS]` time.
    pub fn parse_date_time(date: &str, time: Option<&str>) -> Result<Self, TimeError> {
        let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| TimeError::Date(date.to_string()))?;
        let clock = match time {
            Some(text) => parse_time_of_day(text)?,
            None => NaiveTime::MIN,
        };
        Ok(Self::from_naive_utc(day.and_time(clock)))
    }
}

impl fmt::Display for JulianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Add<f64> for JulianDate {
    type Output = JulianDate;

    fn add(self, days: f64) -> JulianDate {
        JulianDate(self.0 + days)
    }
}

impl Sub<f64> for JulianDate {
    type Output = JulianDate;

    fn sub(self, days: f64) -> JulianDate {
        JulianDate(self.0 - days)
    }
}

impl Sub for JulianDate {
    type Output = f64;

    fn sub(self, other: JulianDate) -> f64 {
        self.0 - other.0
    }
}

impl FromStr for JulianDate {
    type Err = TimeError;

    /// Accepts a raw Julian Date, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`, or RFC 3339.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Ok(days) = text.parse::<f64>() {
            return Ok(Self(days));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::from_datetime(dt.with_timezone(&Utc)));
        }
        let normalized = text.replacen('T', " ", 1);
        match normalized.split_once(' ') {
            Some((date, time)) => Self::parse_date_time(date, Some(time)),
            None => Self::parse_date_time(&normalized, None),
        }
    }
}

/// Parse `HH:MM` or `HH:MM:SS[.fff]` into a wall-clock time.
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, TimeError> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| TimeError::TimeOfDay(text.to_string()))
}

/// Mission-specific barycentric day counts reduced to plain BJD by an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSystem {
    /// Full barycentric Julian Date.
    #[default]
    Bjd,
    /// TESS BJD: BJD - 2457000.
    Tbjd,
    /// Kepler/K2 BJD: BJD - 2454833.
    Bkjd,
}

impl TimeSystem {
    /// Additive offset that converts a value in this system to BJD.
    pub fn offset(self) -> f64 {
        match self {
            TimeSystem::Bjd => 0.0,
            TimeSystem::Tbjd => TESS_TIME_OFFSET,
            TimeSystem::Bkjd => K2_TIME_OFFSET,
        }
    }

    /// Convert a value expressed in this system to a Julian Date.
    pub fn to_julian_date(self, value: f64) -> JulianDate {
        JulianDate(value + self.offset())
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeSystem::Bjd => "BJD",
            TimeSystem::Tbjd => "TBJD",
            TimeSystem::Bkjd => "BKJD",
        }
    }
}

impl FromStr for TimeSystem {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bjd" | "jd" => Ok(TimeSystem::Bjd),
            "tbjd" => Ok(TimeSystem::Tbjd),
            "bkjd" => Ok(TimeSystem::Bkjd),
            _ => Err(TimeError::UnknownSystem(s.to_string())),
        }
    }
}
