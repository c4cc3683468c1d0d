//! Lunar position from the SOFA `moon98` series, with topocentric parallax.

use sofars::eph::moon98;
use transit_core::JulianDate;

use crate::horizon::{Equatorial, GeoLocation, Horizontal, to_horizontal, topocentric};

/// Geocentric GCRS position of the Moon in au.
pub fn geocentric_position_au(jd: JulianDate) -> [f64; 3] {
    let (tt_a, tt_b) = jd.two_part_tt();
    moon98(tt_a, tt_b)[0]
}

/// Geocentric right ascension and declination of the Moon (GCRS).
pub fn equatorial(jd: JulianDate) -> Equatorial {
    Equatorial::from_vector(&geocentric_position_au(jd))
}

/// Topocentric altitude/azimuth of the Moon for a site.
pub fn horizontal(location: &GeoLocation, jd: JulianDate) -> Horizontal {
    let position = geocentric_position_au(jd);
    let distance = (position[0] * position[0] + position[1] * position[1] + position[2] * position[2]).sqrt();
    topocentric(to_horizontal(&position, location, jd), distance, location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sofars::pnp::pmat06;
    use transit_core::constants::{AU_M, SECONDS_PER_DAY, TT_MINUS_UTC_SECONDS};

    fn utc_for_tt(tt_jd: f64) -> JulianDate {
        JulianDate::new(tt_jd - TT_MINUS_UTC_SECONDS / SECONDS_PER_DAY)
    }

    #[test]
    fn meeus_example_position() {
        // Meeus, Astronomical Algorithms, Example 47.a: 1992-04-12 0h TD,
        // Δ = 368409.7 km, α = 134.688470°, δ = 13.768368° (of date).
        let jd = utc_for_tt(2_448_724.5);
        let p = geocentric_position_au(jd);
        let km = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt() * AU_M / 1000.0;
        assert!((km - 368_409.7).abs() < 100.0, "distance = {km} km");

        let (tt_a, tt_b) = jd.two_part_tt();
        let r = pmat06(tt_a, tt_b);
        let of_date: Vec<f64> = r.iter().map(|row| row[0] * p[0] + row[1] * p[1] + row[2] * p[2]).collect();
        let eq = Equatorial::from_vector(&[of_date[0], of_date[1], of_date[2]]);
        assert!((eq.ra_deg - 134.688470).abs() < 0.05, "ra = {}", eq.ra_deg);
        assert!((eq.dec_deg - 13.768368).abs() < 0.05, "dec = {}", eq.dec_deg);
    }

    #[test]
    fn parallax_lowers_the_moon() {
        let site = GeoLocation::new(28.7606, -17.8816, 2332.0).unwrap();
        for hour in 0..24 {
            let jd = JulianDate::new(2_460_000.5 + hour as f64 / 24.0);
            let geo = to_horizontal(&geocentric_position_au(jd), &site, jd);
            let topo = horizontal(&site, jd);
            let drop = geo.altitude_deg - topo.altitude_deg;
            // Horizontal parallax stays between 0.9° and 1.03°.
            assert!(drop > 0.0 && drop < 1.05, "drop = {drop}");
        }
    }

    #[test]
    fn moon_stays_near_the_ecliptic() {
        for day in 0..60 {
            let eq = equatorial(JulianDate::new(2_460_000.5 + day as f64));
            assert!(eq.dec_deg.abs() < 29.0, "dec = {}", eq.dec_deg);
        }
    }
}
