//! Observability constraints and their conjunction.

use std::fmt;

use chrono::NaiveTime;
use thiserror::Error;
use transit_config::{ConstraintConfig, ScanSettings, TwilightConfig};
use transit_core::JulianDate;
use transit_core::time::{TimeError, parse_time_of_day};
use transit_sky::Horizon;

use crate::ephemeris::{CoverageMode, Event};
use crate::observer::Observer;
use crate::target::Target;

const NIGHT_START: NaiveTime = NaiveTime::from_hms_opt(19, 0, 0).expect("19:00 is a valid clock time");
const NIGHT_END: NaiveTime = NaiveTime::from_hms_opt(7, 0, 0).expect("07:00 is a valid clock time");

#[derive(Debug, Error, PartialEq)]
pub enum ConstraintError {
    #[error("unsupported constraint type in settings")]
    Unsupported,
    #[error("invalid local-time bound: {0}")]
    Clock(#[from] TimeError),
    #[error("{name} threshold {value}° is outside [{min}, {max}]")]
    Threshold {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// What a constraint is checked against: one instant, or both ends of a transit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe {
    At(JulianDate),
    Span {
        ingress: JulianDate,
        egress: JulianDate,
    },
}

impl Probe {
    /// Instants of `event` that a coverage mode must clear.
    pub fn for_event(event: &Event, mode: CoverageMode) -> Self {
        match mode {
            CoverageMode::Full => Probe::Span {
                ingress: event.ingress,
                egress: event.egress,
            },
            CoverageMode::Midpoint => Probe::At(event.midpoint),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Sun's centre below the horizon's reference altitude.
    NightOnly { horizon: Horizon },
    /// Target altitude at or above `min_deg`.
    MinAltitude { min_deg: f64 },
    /// Site wall-clock time in `[start, end)`, wrapping midnight when `start > end`.
    /// `start == end` places no restriction.
    LocalClockWindow { start: NaiveTime, end: NaiveTime },
    /// Moon–target separation at or above `min_deg`.
    MinMoonSeparation { min_deg: f64 },
}

impl Constraint {
    /// Night-only with civil twilight (Sun below −6°).
    pub fn night_only() -> Self {
        Constraint::NightOnly {
            horizon: Horizon::Civil,
        }
    }

    pub fn min_altitude(min_deg: f64) -> Result<Self, ConstraintError> {
        check_threshold("altitude", min_deg, -90.0, 90.0)?;
        Ok(Constraint::MinAltitude { min_deg })
    }

    pub fn local_clock_window(start: NaiveTime, end: NaiveTime) -> Self {
        Constraint::LocalClockWindow { start, end }
    }

    pub fn min_moon_separation(min_deg: f64) -> Result<Self, ConstraintError> {
        check_threshold("moon separation", min_deg, 0.0, 180.0)?;
        Ok(Constraint::MinMoonSeparation { min_deg })
    }

    pub fn from_config(config: &ConstraintConfig) -> Result<Self, ConstraintError> {
        match config {
            ConstraintConfig::Night { twilight } => Ok(Constraint::NightOnly {
                horizon: horizon_from_config(*twilight),
            }),
            ConstraintConfig::Altitude { min_deg } => Self::min_altitude(*min_deg),
            ConstraintConfig::LocalTime { start, end } => Ok(Self::local_clock_window(
                parse_time_of_day(start)?,
                parse_time_of_day(end)?,
            )),
            ConstraintConfig::MoonSeparation { min_deg } => Self::min_moon_separation(*min_deg),
            ConstraintConfig::Unsupported => Err(ConstraintError::Unsupported),
        }
    }

    /// Whether the constraint holds at a single instant.
    pub fn holds_at(&self, observer: &Observer, target: &Target, t: JulianDate) -> bool {
        match *self {
            Constraint::NightOnly { horizon } => {
                matches!(observer.sun_altitude(t), Ok(altitude) if altitude < horizon.altitude_deg())
            }
            Constraint::MinAltitude { min_deg } => observer.altitude(target, t) >= min_deg,
            Constraint::LocalClockWindow { start, end } => observer
                .local_time(t)
                .map(|clock| clock_in_band(clock, start, end))
                .unwrap_or(false),
            Constraint::MinMoonSeparation { min_deg } => {
                observer.moon_separation(target, t) >= min_deg
            }
        }
    }

    /// A span passes only when both of its ends pass.
    pub fn evaluate(&self, observer: &Observer, target: &Target, probe: Probe) -> bool {
        match probe {
            Probe::At(t) => self.holds_at(observer, target, t),
            Probe::Span { ingress, egress } => {
                self.holds_at(observer, target, ingress) && self.holds_at(observer, target, egress)
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::NightOnly { horizon } => write!(
                f,
                "night ({} twilight, Sun < {:.1}°)",
                horizon.label(),
                horizon.altitude_deg()
            ),
            Constraint::MinAltitude { min_deg } => write!(f, "altitude >= {min_deg:.1}°"),
            Constraint::LocalClockWindow { start, end } => {
                write!(f, "local time {} to {}", start.format("%H:%M"), end.format("%H:%M"))
            }
            Constraint::MinMoonSeparation { min_deg } => {
                write!(f, "moon separation >= {min_deg:.1}°")
            }
        }
    }
}

fn check_threshold(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConstraintError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConstraintError::Threshold {
            name,
            value,
            min,
            max,
        })
    }
}

fn horizon_from_config(twilight: TwilightConfig) -> Horizon {
    match twilight {
        TwilightConfig::Geometric => Horizon::Geometric,
        TwilightConfig::Sunrise => Horizon::Sunrise,
        TwilightConfig::Civil => Horizon::Civil,
        TwilightConfig::Nautical => Horizon::Nautical,
        TwilightConfig::Astronomical => Horizon::Astronomical,
    }
}

/// `[start, end)` membership on a 24-hour clock.
pub fn clock_in_band(clock: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start == end {
        true
    } else if start < end {
        start <= clock && clock < end
    } else {
        clock >= start || clock < end
    }
}

/// Civil-night, altitude, 19:00–07:00 local time, and moon-separation constraints.
pub fn stock(altitude_limit_deg: f64, moon_separation_deg: f64) -> Result<Vec<Constraint>, ConstraintError> {
    Ok(vec![
        Constraint::night_only(),
        Constraint::min_altitude(altitude_limit_deg)?,
        Constraint::local_clock_window(NIGHT_START, NIGHT_END),
        Constraint::min_moon_separation(moon_separation_deg)?,
    ])
}

/// Constraint list described by a settings document.
pub fn from_settings(settings: &ScanSettings) -> Result<Vec<Constraint>, ConstraintError> {
    settings
        .constraint_configs()
        .iter()
        .map(Constraint::from_config)
        .collect()
}

/// True iff every constraint holds at `checked`. An empty list always holds.
pub fn all_hold(constraints: &[Constraint], observer: &Observer, target: &Target, checked: Probe) -> bool {
    constraints
        .iter()
        .all(|c| c.evaluate(observer, target, checked))
}

/// One flag per probe: true iff every constraint holds.
pub fn is_observable(
    constraints: &[Constraint],
    observer: &Observer,
    target: &Target,
    probes: &[Probe],
) -> Vec<bool> {
    probes
        .iter()
        .map(|probe| all_hold(constraints, observer, target, *probe))
        .collect()
}
