//! Ground observer: site parameters plus the geometric queries the
//! constraints need.

use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;
use thiserror::Error;
use transit_config::SiteConfig;
use transit_core::JulianDate;
use transit_sky::horizon::observe;
use transit_sky::{GeoLocation, Horizon, Horizontal, LocationError, SkyError, moon, riseset, sun};

use crate::target::Target;

#[derive(Debug, Error, PartialEq)]
pub enum SiteError {
    #[error("invalid site location: {0}")]
    Location(#[from] LocationError),
    #[error("unknown time zone `{0}`")]
    UnknownTimezone(String),
    #[error("unknown site `{code}` (known sites: {known})")]
    UnknownSite { code: String, known: String },
    #[error("custom site is missing its {0}; give a known site code or all of latitude, longitude, elevation and time zone")]
    Incomplete(&'static str),
}

/// Parse an IANA time zone name.
pub fn parse_timezone(name: &str) -> Result<Tz, SiteError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| SiteError::UnknownTimezone(name.to_string()))
}

/// A ground site with its clock.
///
/// The Sun crossing queries search [`riseset::SEARCH_SPAN_DAYS`] (2 days)
/// from the reference instant. `None` means the Sun does not cross the
/// requested horizon in that span, as in polar day or polar night.
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    name: String,
    location: GeoLocation,
    timezone: Tz,
}

impl Observer {
    pub fn new(
        name: impl Into<String>,
        latitude_deg: f64,
        longitude_deg: f64,
        elevation_m: f64,
        timezone: &str,
    ) -> Result<Self, SiteError> {
        let location = GeoLocation::new(latitude_deg, longitude_deg, elevation_m)?;
        Ok(Self {
            name: name.into(),
            location,
            timezone: parse_timezone(timezone)?,
        })
    }

    pub fn from_site(site: &SiteConfig) -> Result<Self, SiteError> {
        Self::new(
            site.code.clone(),
            site.latitude_deg,
            site.longitude_deg,
            site.elevation_m,
            &site.timezone,
        )
    }

    /// Same site, different clock for local-time constraints.
    pub fn with_timezone(mut self, timezone: &str) -> Result<Self, SiteError> {
        self.timezone = parse_timezone(timezone)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &GeoLocation {
        &self.location
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Next time the Sun's centre sets through `horizon` strictly after `after`.
    pub fn sun_set_time(&self, after: JulianDate, horizon: Horizon) -> Option<JulianDate> {
        riseset::sun_set_after(&self.location, after, horizon)
    }

    /// Next time the Sun's centre rises through `horizon` strictly after `after`.
    pub fn sun_rise_time(&self, after: JulianDate, horizon: Horizon) -> Option<JulianDate> {
        riseset::sun_rise_after(&self.location, after, horizon)
    }

    /// Most recent sunset strictly before `before`.
    pub fn previous_sun_set_time(&self, before: JulianDate, horizon: Horizon) -> Option<JulianDate> {
        riseset::sun_set_before(&self.location, before, horizon)
    }

    /// Errors outside the 1900-2100 span of the solar ephemeris.
    pub fn sun_altitude(&self, t: JulianDate) -> Result<f64, SkyError> {
        sun::altitude_deg(&self.location, t)
    }

    pub fn horizontal(&self, target: &Target, t: JulianDate) -> Horizontal {
        observe(target.position(), &self.location, t)
    }

    /// Geometric altitude of `target` in degrees.
    pub fn altitude(&self, target: &Target, t: JulianDate) -> f64 {
        self.horizontal(target, t).altitude_deg
    }

    /// Topocentric position of the Moon.
    pub fn moon_horizontal(&self, t: JulianDate) -> Horizontal {
        moon::horizontal(&self.location, t)
    }

    /// Moon–target separation as seen from the site, in degrees.
    pub fn moon_separation(&self, target: &Target, t: JulianDate) -> f64 {
        self.moon_horizontal(t).separation_deg(&self.horizontal(target, t))
    }

    pub fn local_datetime(&self, t: JulianDate) -> Option<DateTime<Tz>> {
        t.to_datetime().map(|utc| utc.with_timezone(&self.timezone))
    }

    /// Wall-clock time at the site.
    pub fn local_time(&self, t: JulianDate) -> Option<NaiveTime> {
        self.local_datetime(t).map(|dt| dt.time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn rejects_bad_location_and_time_zone() {
        assert!(matches!(
            Observer::new("x", 95.0, 0.0, 0.0, "UTC"),
            Err(SiteError::Location(LocationError::Latitude(_)))
        ));
        assert_eq!(
            Observer::new("x", 10.0, 0.0, 0.0, "Mars/Olympus"),
            Err(SiteError::UnknownTimezone("Mars/Olympus".into()))
        );
    }

    #[test]
    fn local_time_follows_site_zone() {
        let oao = Observer::new("OAO", 34.5761, 133.5941, 343.0, "Asia/Tokyo").unwrap();
        // 2019-12-24 12:00 UTC is 21:00 in Tokyo.
        let local = oao.local_time(JulianDate::new(2_458_842.0)).unwrap();
        assert_eq!(local.hour(), 21);
        let utc = oao.with_timezone("UTC").unwrap();
        assert_eq!(utc.local_time(JulianDate::new(2_458_842.0)).unwrap().hour(), 12);
    }

    #[test]
    fn builtin_registry_sites_all_resolve() {
        let registry = transit_config::SiteRegistry::builtin();
        for site in registry.iter() {
            let observer = Observer::from_site(site);
            assert!(observer.is_ok(), "{}: {:?}", site.code, observer.err());
        }
    }

    #[test]
    fn polaris_altitude_tracks_latitude() {
        let site = Observer::new("x", 40.0, -75.0, 10.0, "America/New_York").unwrap();
        let polaris = Target::new("Polaris", 37.95456, 89.264109).unwrap();
        for offset in [0.0, 0.3, 0.6] {
            let alt = site.altitude(&polaris, JulianDate::new(2_460_000.0 + offset));
            assert!((alt - 40.0).abs() < 1.0, "alt = {alt}");
        }
    }

    #[test]
    fn sunset_precedes_sunrise() {
        let site = Observer::new("x", -30.1675, -70.8047, 2198.0, "America/Santiago").unwrap();
        let start = JulianDate::new(2_459_500.5);
        let set = site.sun_set_time(start, Horizon::Civil).unwrap();
        let rise = site.sun_rise_time(set, Horizon::Civil).unwrap();
        assert!(rise > set && rise - set < 1.0);
        assert!(site.sun_altitude(set + (rise - set) / 2.0).unwrap() < -6.0);
    }

    #[test]
    fn polar_day_has_no_sunset_within_the_search_span() {
        let svalbard = Observer::new("LYR", 78.2232, 15.6267, 10.0, "Arctic/Longyearbyen").unwrap();
        // 2021-06-21 00:00 UTC
        let start = JulianDate::new(2_459_386.5);
        assert!(svalbard.sun_set_time(start, Horizon::Geometric).is_none());
        assert!(svalbard.sun_altitude(start).unwrap() > 0.0);
    }

    #[test]
    fn moon_separation_uses_the_site_view() {
        let site = Observer::new("x", 28.7606, -17.8816, 2332.0, "Atlantic/Canary").unwrap();
        let t = JulianDate::new(2_460_000.5);
        let moon = moon::equatorial(t);
        let target = Target::new("moon", moon.ra_deg, moon.dec_deg).unwrap();
        // Parallax displaces the Moon from its geocentric direction by about 1°.
        let separation = site.moon_separation(&target, t);
        assert!(separation < 1.1, "separation = {separation}");
    }
}
