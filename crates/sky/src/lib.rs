//! Geometric sky model for a ground observer.
//!
//! Frame rotations and the Sun and Moon ephemerides come from SOFA via
//! `sofars`. UT1 is taken equal to UTC, and altitudes are geometric (no
//! refraction).

use thiserror::Error;
use transit_core::JulianDate;

pub mod horizon;
pub mod moon;
pub mod riseset;
pub mod sun;

pub use horizon::{Equatorial, GeoLocation, Horizon, Horizontal, LocationError};
pub use riseset::Crossing;

/// First Julian date covered by the solar ephemeris (1900-01-01).
pub const EPHEMERIS_START_JD: f64 = 2_415_020.5;
/// Last Julian date covered by the solar ephemeris (2100-12-31).
pub const EPHEMERIS_END_JD: f64 = 2_488_433.5;

#[derive(Debug, Error, PartialEq)]
pub enum SkyError {
    #[error("{0} is outside the solar ephemeris span (1900-2100)")]
    OutsideEphemeris(JulianDate),
}

/// Whether `jd` lies inside the span served by the solar ephemeris.
pub fn within_ephemeris(jd: JulianDate) -> bool {
    (EPHEMERIS_START_JD..=EPHEMERIS_END_JD).contains(&jd.days())
}
