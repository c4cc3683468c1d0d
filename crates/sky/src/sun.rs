//! Solar position from the SOFA `epv00` Earth ephemeris.
//!
//! `epv00` covers 1900-2100; outside that span the Sun's altitude is an
//! error rather than an extrapolation.

use sofars::eph::epv00;
use transit_core::JulianDate;

use crate::horizon::{Equatorial, GeoLocation, to_horizontal};
use crate::{SkyError, within_ephemeris};

/// Geocentric GCRS position of the Sun in au.
pub fn geocentric_position_au(jd: JulianDate) -> Result<[f64; 3], SkyError> {
    if !within_ephemeris(jd) {
        return Err(SkyError::OutsideEphemeris(jd));
    }
    let (tt_a, tt_b) = jd.two_part_tt();
    let (heliocentric, _barycentric) = epv00(tt_a, tt_b).ok_or(SkyError::OutsideEphemeris(jd))?;
    let earth = heliocentric[0];
    Ok([-earth[0], -earth[1], -earth[2]])
}

/// Geocentric right ascension and declination of the Sun (GCRS).
pub fn equatorial(jd: JulianDate) -> Result<Equatorial, SkyError> {
    geocentric_position_au(jd).map(|p| Equatorial::from_vector(&p))
}

/// Geometric altitude of the Sun's centre for a site, in degrees.
pub fn altitude_deg(location: &GeoLocation, jd: JulianDate) -> Result<f64, SkyError> {
    let position = geocentric_position_au(jd)?;
    Ok(to_horizontal(&position, location, jd).altitude_deg)
}
