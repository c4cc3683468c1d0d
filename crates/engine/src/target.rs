//! Fixed sidereal target.

use thiserror::Error;
use transit_sky::Equatorial;

#[derive(Debug, Error, PartialEq)]
pub enum TargetError {
    #[error("right ascension {0}° is not a finite number")]
    RightAscension(f64),
    #[error("declination {0}° is outside [-90, 90]")]
    Declination(f64),
    #[error("distance {0} pc must be positive")]
    Distance(f64),
}

/// A star with ICRS/J2000 coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    name: String,
    position: Equatorial,
    distance_pc: Option<f64>,
}

impl Target {
    pub fn new(name: impl Into<String>, ra_deg: f64, dec_deg: f64) -> Result<Self, TargetError> {
        if !ra_deg.is_finite() {
            return Err(TargetError::RightAscension(ra_deg));
        }
        if !dec_deg.is_finite() || !(-90.0..=90.0).contains(&dec_deg) {
            return Err(TargetError::Declination(dec_deg));
        }
        Ok(Self {
            name: name.into(),
            position: Equatorial::new(ra_deg, dec_deg),
            distance_pc: None,
        })
    }

    pub fn with_distance(mut self, distance_pc: f64) -> Result<Self, TargetError> {
        if !distance_pc.is_finite() || distance_pc <= 0.0 {
            return Err(TargetError::Distance(distance_pc));
        }
        self.distance_pc = Some(distance_pc);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ra_deg(&self) -> f64 {
        self.position.ra_deg
    }

    pub fn dec_deg(&self) -> f64 {
        self.position.dec_deg
    }

    pub fn distance_pc(&self) -> Option<f64> {
        self.distance_pc
    }

    /// ICRS (J2000) position.
    pub fn position(&self) -> Equatorial {
        self.position
    }

    /// `"ra, dec"` in decimal degrees, used when no display name is known.
    pub fn coordinate_label(&self) -> String {
        format!("{:.5}, {:+.5}", self.ra_deg(), self.dec_deg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_coordinates_and_distance() {
        assert!(Target::new("a", f64::NAN, 0.0).is_err());
        assert_eq!(
            Target::new("a", 10.0, 95.0),
            Err(TargetError::Declination(95.0))
        );
        let t = Target::new("a", -10.0, 5.0).unwrap();
        assert_eq!(t.ra_deg(), 350.0);
        assert!(t.clone().with_distance(0.0).is_err());
        assert_eq!(t.with_distance(42.0).unwrap().distance_pc(), Some(42.0));
    }

    #[test]
    fn coordinate_label_is_signed() {
        let t = Target::new("", 83.633083, -5.391111).unwrap();
        assert_eq!(t.coordinate_label(), "83.63308, -5.39111");
    }
}
