//! Sun rise/set and twilight instants by sweep-and-bisect.
//!
//! A coarse sweep brackets the first threshold crossing, then bisection
//! refines it. Returns `None` when the Sun never crosses the requested
//! altitude inside the search span (polar day or night), or when the
//! altitude is undefined somewhere along the sweep.

use transit_core::JulianDate;
use transit_core::constants::SECONDS_PER_DAY;

use crate::horizon::{GeoLocation, Horizon};
use crate::sun;

/// Search horizon for a single rise/set query, in days.
pub const SEARCH_SPAN_DAYS: f64 = 2.0;
/// Coarse sweep step: 10 minutes.
pub const SWEEP_STEP_DAYS: f64 = 10.0 / 1_440.0;
const TOLERANCE_DAYS: f64 = 0.5 / SECONDS_PER_DAY;
/// Crossings closer than this to the reference instant are the reference itself.
const GUARD_DAYS: f64 = 60.0 / SECONDS_PER_DAY;

/// Direction of a threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Rising,
    Setting,
}

impl Crossing {
    fn matches(self, before: f64, after: f64) -> bool {
        match self {
            Crossing::Rising => before < 0.0 && after >= 0.0,
            Crossing::Setting => before >= 0.0 && after < 0.0,
        }
    }
}

/// First crossing of `threshold` by `f` strictly after `after`.
pub fn next_crossing<F>(
    f: F,
    after: JulianDate,
    threshold: f64,
    crossing: Crossing,
    span_days: f64,
) -> Option<JulianDate>
where
    F: Fn(JulianDate) -> Option<f64>,
{
    let steps = (span_days / SWEEP_STEP_DAYS).ceil() as usize;
    let mut t0 = after + GUARD_DAYS;
    let mut v0 = f(t0)? - threshold;
    for _ in 0..steps {
        let t1 = t0 + SWEEP_STEP_DAYS;
        let v1 = f(t1)? - threshold;
        if crossing.matches(v0, v1) {
            return bisect(&f, threshold, t0, t1);
        }
        t0 = t1;
        v0 = v1;
    }
    None
}

/// Last crossing of `threshold` by `f` strictly before `before`.
pub fn previous_crossing<F>(
    f: F,
    before: JulianDate,
    threshold: f64,
    crossing: Crossing,
    span_days: f64,
) -> Option<JulianDate>
where
    F: Fn(JulianDate) -> Option<f64>,
{
    let steps = (span_days / SWEEP_STEP_DAYS).ceil() as usize;
    let mut t1 = before - GUARD_DAYS;
    let mut v1 = f(t1)? - threshold;
    for _ in 0..steps {
        let t0 = t1 - SWEEP_STEP_DAYS;
        let v0 = f(t0)? - threshold;
        if crossing.matches(v0, v1) {
            return bisect(&f, threshold, t0, t1);
        }
        t1 = t0;
        v1 = v0;
    }
    None
}

fn bisect<F>(f: &F, threshold: f64, mut lo: JulianDate, mut hi: JulianDate) -> Option<JulianDate>
where
    F: Fn(JulianDate) -> Option<f64>,
{
    let lo_above = f(lo)? >= threshold;
    while hi - lo > TOLERANCE_DAYS {
        let mid = lo + (hi - lo) / 2.0;
        if (f(mid)? >= threshold) == lo_above {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(lo + (hi - lo) / 2.0)
}

/// Next sunset (Sun's centre descending through `horizon`) after `after`.
pub fn sun_set_after(location: &GeoLocation, after: JulianDate, horizon: Horizon) -> Option<JulianDate> {
    next_crossing(
        |t| sun::altitude_deg(location, t).ok(),
        after,
        horizon.altitude_deg(),
        Crossing::Setting,
        SEARCH_SPAN_DAYS,
    )
}

/// Next sunrise (Sun's centre ascending through `horizon`) after `after`.
pub fn sun_rise_after(location: &GeoLocation, after: JulianDate, horizon: Horizon) -> Option<JulianDate> {
    next_crossing(
        |t| sun::altitude_deg(location, t).ok(),
        after,
        horizon.altitude_deg(),
        Crossing::Rising,
        SEARCH_SPAN_DAYS,
    )
}

/// Most recent sunset before `before`.
pub fn sun_set_before(location: &GeoLocation, before: JulianDate, horizon: Horizon) -> Option<JulianDate> {
    previous_crossing(
        |t| sun::altitude_deg(location, t).ok(),
        before,
        horizon.altitude_deg(),
        Crossing::Setting,
        SEARCH_SPAN_DAYS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greenwich() -> GeoLocation {
        GeoLocation::new(51.4769, 0.0, 46.0).unwrap()
    }

    #[test]
    fn equinox_sunset_is_near_eighteen_hours() {
        // 2021-03-20 00:00 UTC
        let start = JulianDate::new(2_459_293.5);
        let set = sun_set_after(&greenwich(), start, Horizon::Geometric).unwrap();
        let hours = (set - start) * 24.0;
        assert!((hours - 18.1).abs() < 0.25, "sunset at {hours} h UTC");
    }

    #[test]
    fn rise_follows_set_and_twilight_is_darker() {
        let start = JulianDate::new(2_459_293.5);
        let site = greenwich();
        let set = sun_set_after(&site, start, Horizon::Geometric).unwrap();
        let rise = sun_rise_after(&site, set, Horizon::Geometric).unwrap();
        assert!(rise > set);
        assert!((rise - set) > 0.45 && (rise - set) < 0.55);

        let civil = sun_set_after(&site, start, Horizon::Civil).unwrap();
        assert!(civil > set);
        assert!((sun::altitude_deg(&site, civil).unwrap() + 6.0).abs() < 5e-3);
    }

    #[test]
    fn previous_sunset_precedes_reference() {
        let site = greenwich();
        let reference = JulianDate::new(2_459_294.0);
        let set = sun_set_before(&site, reference, Horizon::Geometric).unwrap();
        assert!(set < reference);
        let next = sun_set_after(&site, set, Horizon::Geometric).unwrap();
        assert!(next > reference);
    }

    #[test]
    fn polar_summer_has_no_sunset() {
        let svalbard = GeoLocation::new(78.2232, 15.6267, 0.0).unwrap();
        // 2021-06-21 00:00 UTC
        assert!(sun_set_after(&svalbard, JulianDate::new(2_459_386.5), Horizon::Geometric).is_none());
    }

    #[test]
    fn sweep_stops_where_the_ephemeris_ends() {
        let late = JulianDate::new(crate::EPHEMERIS_END_JD - 0.5);
        assert!(sun_set_after(&greenwich(), late, Horizon::Geometric).is_none());
    }
}
