//! Angle normalisation, separation, and sexagesimal parsing.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AngleError {
    #[error("invalid angle `{0}`")]
    Invalid(String),
    #[error("sexagesimal field out of range in `{0}`")]
    FieldRange(String),
}

/// Wrap an angle into [0, 360).
#[inline]
pub fn normalize_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Wrap an angle into [-180, 180).
#[inline]
pub fn wrap_180_deg(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Great-circle separation between two equatorial positions, all in degrees.
///
/// Uses the Vincenty form, which stays accurate for both tiny and
/// near-antipodal separations.
pub fn angular_separation_deg(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let (sin_d1, cos_d1) = dec1_deg.to_radians().sin_cos();
    let (sin_d2, cos_d2) = dec2_deg.to_radians().sin_cos();
    let (sin_dra, cos_dra) = (ra2_deg - ra1_deg).to_radians().sin_cos();

    let num1 = cos_d2 * sin_dra;
    let num2 = cos_d1 * sin_d2 - sin_d1 * cos_d2 * cos_dra;
    let denominator = sin_d1 * sin_d2 + cos_d1 * cos_d2 * cos_dra;
    num1.hypot(num2).atan2(denominator).to_degrees()
}

/// Hours, minutes, seconds to degrees.
#[inline]
pub fn hms_to_deg(h: f64, m: f64, s: f64) -> f64 {
    (h + m / 60.0 + s / 3600.0) * 15.0
}

/// Degrees, arcminutes, arcseconds to degrees; the sign is taken from `negative`.
#[inline]
pub fn dms_to_deg(negative: bool, d: f64, m: f64, s: f64) -> f64 {
    let magnitude = d.abs() + m / 60.0 + s / 3600.0;
    if negative { -magnitude } else { magnitude }
}

/// Parse a right ascension given either as decimal degrees or as `hh:mm:ss.s`.
pub fn parse_ra_deg(text: &str) -> Result<f64, AngleError> {
    let trimmed = text.trim();
    if !is_sexagesimal(trimmed) {
        return parse_decimal(trimmed).map(normalize_deg);
    }
    let (negative, fields) = split_fields(trimmed)?;
    if negative || fields[0] >= 24.0 {
        return Err(AngleError::FieldRange(text.to_string()));
    }
    Ok(hms_to_deg(fields[0], fields[1], fields[2]))
}

/// Parse a declination given either as decimal degrees or as `±dd:mm:ss.s`.
pub fn parse_dec_deg(text: &str) -> Result<f64, AngleError> {
    let trimmed = text.trim();
    let deg = if is_sexagesimal(trimmed) {
        let (negative, fields) = split_fields(trimmed)?;
        dms_to_deg(negative, fields[0], fields[1], fields[2])
    } else {
        parse_decimal(trimmed)?
    };
    if !(-90.0..=90.0).contains(&deg) {
        return Err(AngleError::FieldRange(text.to_string()));
    }
    Ok(deg)
}

fn is_sexagesimal(text: &str) -> bool {
    text.contains(':') || text.trim_start_matches(['+', '-']).contains(' ')
}

fn parse_decimal(text: &str) -> Result<f64, AngleError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AngleError::Invalid(text.to_string()))
}

fn split_fields(text: &str) -> Result<(bool, [f64; 3]), AngleError> {
    let negative = text.starts_with('-');
    let body = text.trim_start_matches(['+', '-']);
    let parts: Vec<&str> = body
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(AngleError::Invalid(text.to_string()));
    }
    let mut fields = [0.0; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        *slot = parse_decimal(part).map_err(|_| AngleError::Invalid(text.to_string()))?;
        if *slot < 0.0 {
            return Err(AngleError::Invalid(text.to_string()));
        }
    }
    if fields[1] >= 60.0 || fields[2] >= 60.0 {
        return Err(AngleError::FieldRange(text.to_string()));
    }
    Ok((negative, fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_sexagesimal_coordinates() {
        let ra = parse_ra_deg("05:34:31.94").unwrap();
        assert!((ra - 83.633_083).abs() < 1e-5);
        let dec = parse_dec_deg("+22:00:52.2").unwrap();
        assert!((dec - 22.014_5).abs() < 1e-5);
    }

    #[test]
    fn keeps_sign_for_small_negative_declinations() {
        let dec = parse_dec_deg("-00:30:00").unwrap();
        assert!((dec + 0.5).abs() < 1e-12);
    }

    #[test]
    fn decimal_inputs_pass_through() {
        assert_eq!(parse_ra_deg("370.0").unwrap(), 10.0);
        assert_eq!(parse_dec_deg("-45.5").unwrap(), -45.5);
        assert!(parse_dec_deg("91").is_err());
        assert!(parse_ra_deg("abc").is_err());
        assert!(parse_ra_deg("12:61:00").is_err());
    }

    #[test]
    fn separation_matches_simple_cases() {
        assert!((angular_separation_deg(0.0, 0.0, 90.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((angular_separation_deg(10.0, 89.0, 190.0, 89.0) - 2.0).abs() < 1e-9);
        assert!(angular_separation_deg(42.0, -13.0, 42.0, -13.0).abs() < 1e-12);
    }

    #[test]
    fn wrap_180_covers_half_open_range() {
        assert_eq!(wrap_180_deg(180.0), -180.0);
        assert!((wrap_180_deg(343.5033) + 16.4967).abs() < 1e-9);
        assert!((wrap_180_deg(-104.02) + 104.02).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn separation_is_symmetric(
            ra1 in 0.0f64..360.0, dec1 in -90.0f64..90.0,
            ra2 in 0.0f64..360.0, dec2 in -90.0f64..90.0,
        ) {
            let a = angular_separation_deg(ra1, dec1, ra2, dec2);
            let b = angular_separation_deg(ra2, dec2, ra1, dec1);
            prop_assert!((a - b).abs() < 1e-9);
            prop_assert!((0.0..=180.0 + 1e-9).contains(&a));
        }
    }
}
