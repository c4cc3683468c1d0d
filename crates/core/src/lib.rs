//! Core units, constants, and shared primitives for the transit planner workspace.

pub mod angle;
pub mod time;

pub use time::{JulianDate, TimeSystem};

/// Astronomical constants used across crates.
pub mod constants {
    /// Julian Date of the J2000.0 epoch (2000-01-01 12:00 TT).
    pub const J2000_JD: f64 = 2_451_545.0;
    /// Julian Date of the Unix epoch (1970-01-01 00:00 UTC).
    pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
    /// Julian Date of the Modified Julian Date origin.
    pub const MJD_ZERO_JD: f64 = 2_400_000.5;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// TT - UTC in seconds: 32.184 s plus the 37 leap seconds in force since 2017.
    pub const TT_MINUS_UTC_SECONDS: f64 = 69.184;
    /// WGS84 equatorial radius in metres.
    pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
    /// Astronomical unit in metres (IAU 2012).
    pub const AU_M: f64 = 149_597_870_700.0;
    /// Hours per day.
    pub const HOURS_PER_DAY: f64 = 24.0;
    /// TESS BJD offset: TBJD = BJD - 2457000.
    pub const TESS_TIME_OFFSET: f64 = 2_457_000.0;
    /// Kepler/K2 BJD offset: BKJD = BJD - 2454833.
    pub const K2_TIME_OFFSET: f64 = 2_454_833.0;
    /// Jupiter equatorial radius in Earth radii.
    pub const JUPITER_RADIUS_IN_EARTH: f64 = 11.209;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::HOURS_PER_DAY;

    /// Convert hours to days.
    #[inline]
    pub fn hours_to_days(v: f64) -> f64 {
        v / HOURS_PER_DAY
    }
}
