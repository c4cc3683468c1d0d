//! Linear transit ephemeris and lazy event generation.

use std::fmt;
use std::iter::FusedIterator;

use thiserror::Error;
use transit_core::JulianDate;

/// Which ephemeris parameter failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EphemerisParam {
    Epoch,
    Period,
    Duration,
}

impl fmt::Display for EphemerisParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EphemerisParam::Epoch => "reference epoch",
            EphemerisParam::Period => "period",
            EphemerisParam::Duration => "transit duration",
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EphemerisError {
    #[error("{0} is missing")]
    Missing(EphemerisParam),
    #[error("{0} is not a finite number")]
    NotANumber(EphemerisParam),
    #[error("{0} is zero")]
    Zero(EphemerisParam),
    #[error("{param} must be positive (got {value})")]
    Negative { param: EphemerisParam, value: f64 },
    #[error("transit duration {duration} d is not shorter than the period {period} d")]
    DurationNotShorterThanPeriod { duration: f64, period: f64 },
}

/// How an event is probed against constraints and bounded by the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverageMode {
    /// Ingress and egress must both be observable; the window bound is egress.
    Full,
    /// Only the midpoint is probed; partially covered transits are accepted.
    #[default]
    Midpoint,
}

impl CoverageMode {
    pub fn from_exclude_partial(exclude_partial: bool) -> Self {
        if exclude_partial {
            CoverageMode::Full
        } else {
            CoverageMode::Midpoint
        }
    }

    /// Noun used in report lines.
    pub fn noun(self) -> &'static str {
        match self {
            CoverageMode::Full => "full transit",
            CoverageMode::Midpoint => "transit midpoint",
        }
    }
}

/// One predicted transit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Cycle number counted from the reference epoch.
    pub cycle: i64,
    pub ingress: JulianDate,
    pub midpoint: JulianDate,
    pub egress: JulianDate,
}

impl Event {
    /// Instant compared against the window end: egress for full coverage, else midpoint.
    pub fn bound(&self, mode: CoverageMode) -> JulianDate {
        match mode {
            CoverageMode::Full => self.egress,
            CoverageMode::Midpoint => self.midpoint,
        }
    }

    pub fn duration_days(&self) -> f64 {
        self.egress - self.ingress
    }
}

/// Immutable timing law `T(k) = T0 + k·P` with a fixed transit duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Ephemeris {
    label: String,
    reference_epoch: JulianDate,
    period_days: f64,
    duration_days: f64,
}

impl Ephemeris {
    pub fn new(
        label: impl Into<String>,
        reference_epoch: f64,
        period_days: f64,
        duration_days: f64,
    ) -> Result<Self, EphemerisError> {
        Self::from_params(
            label,
            Some(reference_epoch),
            Some(period_days),
            Some(duration_days),
        )
    }

    /// Validate an optional parameter triple, as produced by files or catalog rows.
    pub fn from_params(
        label: impl Into<String>,
        reference_epoch: Option<f64>,
        period_days: Option<f64>,
        duration_days: Option<f64>,
    ) -> Result<Self, EphemerisError> {
        let epoch = check(EphemerisParam::Epoch, reference_epoch)?;
        let period = check(EphemerisParam::Period, period_days)?;
        let duration = check(EphemerisParam::Duration, duration_days)?;
        for (param, value) in [
            (EphemerisParam::Period, period),
            (EphemerisParam::Duration, duration),
        ] {
            if value < 0.0 {
                return Err(EphemerisError::Negative { param, value });
            }
        }
        if duration >= period {
            return Err(EphemerisError::DurationNotShorterThanPeriod { duration, period });
        }
        Ok(Self {
            label: label.into(),
            reference_epoch: JulianDate::new(epoch),
            period_days: period,
            duration_days: duration,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reference_epoch(&self) -> JulianDate {
        self.reference_epoch
    }

    pub fn period_days(&self) -> f64 {
        self.period_days
    }

    pub fn duration_days(&self) -> f64 {
        self.duration_days
    }

    /// Event for cycle `k`, computed directly from the epoch (no accumulated drift).
    pub fn event(&self, cycle: i64) -> Event {
        make_event(
            self.reference_epoch,
            self.period_days,
            self.duration_days / 2.0,
            cycle,
        )
    }

    /// First cycle whose bound for `mode` is at or after `start`.
    pub fn first_cycle(&self, start: JulianDate, mode: CoverageMode) -> i64 {
        let offset = match mode {
            CoverageMode::Full => self.duration_days / 2.0,
            CoverageMode::Midpoint => 0.0,
        };
        let mut cycle = ((start - self.reference_epoch - offset) / self.period_days).ceil() as i64;
        // ceil() can land one cycle off when the quotient sits on an integer.
        while self.event(cycle).bound(mode) < start {
            cycle += 1;
        }
        while self.event(cycle - 1).bound(mode) >= start {
            cycle -= 1;
        }
        cycle
    }

    /// The next `count` events at or after `start`, produced lazily.
    pub fn next_events(&self, start: JulianDate, count: usize, mode: CoverageMode) -> EventIter {
        EventIter {
            reference_epoch: self.reference_epoch,
            period_days: self.period_days,
            half_duration: self.duration_days / 2.0,
            next_cycle: self.first_cycle(start, mode),
            remaining: count,
        }
    }
}

fn check(param: EphemerisParam, value: Option<f64>) -> Result<f64, EphemerisError> {
    let value = value.ok_or(EphemerisError::Missing(param))?;
    if !value.is_finite() {
        return Err(EphemerisError::NotANumber(param));
    }
    if value == 0.0 {
        return Err(EphemerisError::Zero(param));
    }
    Ok(value)
}

fn make_event(epoch: JulianDate, period: f64, half_duration: f64, cycle: i64) -> Event {
    let midpoint = epoch + cycle as f64 * period;
    Event {
        cycle,
        ingress: midpoint - half_duration,
        midpoint,
        egress: midpoint + half_duration,
    }
}

/// Finite, restartable event sequence; clone it to iterate again from the start.
#[derive(Debug, Clone)]
pub struct EventIter {
    reference_epoch: JulianDate,
    period_days: f64,
    half_duration: f64,
    next_cycle: i64,
    remaining: usize,
}

impl Iterator for EventIter {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.remaining == 0 {
            return None;
        }
        let event = make_event(
            self.reference_epoch,
            self.period_days,
            self.half_duration,
            self.next_cycle,
        );
        self.next_cycle += 1;
        self.remaining -= 1;
        Some(event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for EventIter {}

impl FusedIterator for EventIter {}
