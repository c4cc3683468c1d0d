//! Observer location, coordinate types, and the GCRS → horizontal transform.
//!
//! Precession and sidereal time come from SOFA (`pmat06`, `gmst06`) and the
//! hour-angle to azimuth/elevation step from `hd2ae`. Altitudes are geometric:
//! no refraction, nutation, or aberration is applied.

use sofars::coords::hd2ae;
use sofars::erst::gmst06;
use sofars::pnp::pmat06;
use thiserror::Error;
use transit_core::JulianDate;
use transit_core::angle::{angular_separation_deg, normalize_deg, wrap_180_deg};
use transit_core::constants::{AU_M, EARTH_RADIUS_M};

/// Errors raised when a geodetic position is outside its valid range.
#[derive(Debug, Error, PartialEq)]
pub enum LocationError {
    #[error("latitude {0}° is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0}° is outside [-180, 360)")]
    Longitude(f64),
    #[error("elevation {0} m must be finite and non-negative")]
    Elevation(f64),
}

/// Geographic location on Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    /// Geodetic latitude in degrees, north positive.
    pub latitude_deg: f64,
    /// Geodetic longitude in degrees, east positive, normalised to [-180, 180).
    pub longitude_deg: f64,
    /// Height above mean sea level in metres.
    pub elevation_m: f64,
}

impl GeoLocation {
    /// Validate and build a location. Longitudes in [180, 360) are folded
    /// into the western hemisphere.
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Result<Self, LocationError> {
        if !latitude_deg.is_finite() || !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(LocationError::Latitude(latitude_deg));
        }
        if !longitude_deg.is_finite() || !(-180.0..360.0).contains(&longitude_deg) {
            return Err(LocationError::Longitude(longitude_deg));
        }
        if !elevation_m.is_finite() || elevation_m < 0.0 {
            return Err(LocationError::Elevation(elevation_m));
        }
        Ok(Self {
            latitude_deg,
            longitude_deg: wrap_180_deg(longitude_deg),
            elevation_m,
        })
    }

    /// Distance from the geocentre in au, on a spherical Earth.
    pub fn geocentric_radius_au(&self) -> f64 {
        (EARTH_RADIUS_M + self.elevation_m) / AU_M
    }
}

/// Equatorial position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    /// Right ascension in [0, 360).
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl Equatorial {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self {
            ra_deg: normalize_deg(ra_deg),
            dec_deg,
        }
    }

    /// Direction of a position vector.
    pub fn from_vector(v: &[f64; 3]) -> Self {
        let (lon, lat) = spherical(v);
        Self::new(lon.to_degrees(), lat.to_degrees())
    }

    pub fn unit_vector(&self) -> [f64; 3] {
        unit_vector(self.ra_deg.to_radians(), self.dec_deg.to_radians())
    }

    /// Angular distance to another position in degrees.
    pub fn separation_deg(&self, other: &Equatorial) -> f64 {
        angular_separation_deg(self.ra_deg, self.dec_deg, other.ra_deg, other.dec_deg)
    }
}

/// Horizontal position in degrees. Azimuth runs from north through east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

impl Horizontal {
    /// Direction of a vector in the (north, east, up) frame.
    pub fn from_vector(v: &[f64; 3]) -> Self {
        let (az, alt) = spherical(v);
        Self {
            altitude_deg: alt.to_degrees(),
            azimuth_deg: normalize_deg(az.to_degrees()),
        }
    }

    /// Unit vector in the (north, east, up) frame.
    pub fn unit_vector(&self) -> [f64; 3] {
        unit_vector(self.azimuth_deg.to_radians(), self.altitude_deg.to_radians())
    }

    /// Angular distance to another horizontal position in degrees.
    pub fn separation_deg(&self, other: &Horizontal) -> f64 {
        angular_separation_deg(
            self.azimuth_deg,
            self.altitude_deg,
            other.azimuth_deg,
            other.altitude_deg,
        )
    }

    /// Plane-parallel airmass, `None` at or below the horizon.
    pub fn airmass(&self) -> Option<f64> {
        (self.altitude_deg > 0.0).then(|| 1.0 / self.altitude_deg.to_radians().sin())
    }
}

/// Convert a geocentric GCRS direction (any length) to altitude/azimuth at `jd`.
pub fn to_horizontal(gcrs: &[f64; 3], location: &GeoLocation, jd: JulianDate) -> Horizontal {
    let (ut_a, ut_b) = jd.two_part();
    let (tt_a, tt_b) = jd.two_part_tt();
    let of_date = rotate(&pmat06(tt_a, tt_b), gcrs);
    let (ra, dec) = spherical(&of_date);
    let hour_angle = gmst06(ut_a, ut_b, tt_a, tt_b) + location.longitude_deg.to_radians() - ra;
    let [az, el] = hd2ae(hour_angle, dec, location.latitude_deg.to_radians());
    Horizontal {
        altitude_deg: el.to_degrees(),
        azimuth_deg: normalize_deg(az.to_degrees()),
    }
}

/// Horizontal position of a fixed ICRS source.
pub fn observe(position: Equatorial, location: &GeoLocation, jd: JulianDate) -> Horizontal {
    to_horizontal(&position.unit_vector(), location, jd)
}

/// Move a geocentric horizontal position of a body `distance_au` away to the
/// observer's position on the surface.
pub fn topocentric(geocentric: Horizontal, distance_au: f64, location: &GeoLocation) -> Horizontal {
    let mut v = geocentric.unit_vector().map(|c| c * distance_au);
    v[2] -= location.geocentric_radius_au();
    Horizontal::from_vector(&v)
}

fn unit_vector(lon_rad: f64, lat_rad: f64) -> [f64; 3] {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();
    [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat]
}

/// Longitude and latitude of a vector in radians.
fn spherical(v: &[f64; 3]) -> (f64, f64) {
    let lon = v[1].atan2(v[0]);
    let lat = v[2].atan2(v[0].hypot(v[1]));
    (lon, lat)
}

fn rotate(r: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    [
        r[0][0] * v[0] + r[0][1] * v[1] + r[0][2] * v[2],
        r[1][0] * v[0] + r[1][1] * v[1] + r[1][2] * v[2],
        r[2][0] * v[0] + r[2][1] * v[1] + r[2][2] * v[2],
    ]
}

/// Reference altitude of the Sun's centre for rise/set and twilight searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Horizon {
    /// 0°.
    #[default]
    Geometric,
    /// −0°50′: refraction plus semi-diameter.
    Sunrise,
    /// −6°.
    Civil,
    /// −12°.
    Nautical,
    /// −18°.
    Astronomical,
}

impl Horizon {
    /// Altitude threshold of the Sun's centre in degrees.
    pub fn altitude_deg(self) -> f64 {
        match self {
            Horizon::Geometric => 0.0,
            Horizon::Sunrise => -50.0 / 60.0,
            Horizon::Civil => -6.0,
            Horizon::Nautical => -12.0,
            Horizon::Astronomical => -18.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Horizon::Geometric => "geometric",
            Horizon::Sunrise => "sunrise",
            Horizon::Civil => "civil",
            Horizon::Nautical => "nautical",
            Horizon::Astronomical => "astronomical",
        }
    }
}
