//! Re-exported APIs for consumers of the engine crate.

pub use crate::constraints::{Constraint, ConstraintError, Probe, all_hold, is_observable};
pub use crate::ephemeris::{CoverageMode, Ephemeris, EphemerisError, Event, EventIter};
pub use crate::error::InputError;
pub use crate::observer::{Observer, SiteError};
pub use crate::scan::{
    ObservationWindow, ScanOptions, ScanOutcome, ScanRequest, ScanResult, WindowError, scan,
};
pub use crate::target::{Target, TargetError};
pub use transit_core::{JulianDate, TimeSystem};

pub mod site {
    use transit_config::SiteRegistry;

    use crate::observer::{Observer, SiteError};

    /// Site as requested on the command line: a registry code, a fully custom
    /// location, or a registry code with a different clock.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SiteRequest {
        pub code: Option<String>,
        pub latitude_deg: Option<f64>,
        pub longitude_deg: Option<f64>,
        pub elevation_m: Option<f64>,
        pub timezone: Option<String>,
    }

    impl SiteRequest {
        pub fn code(code: impl Into<String>) -> Self {
            Self {
                code: Some(code.into()),
                ..Self::default()
            }
        }
    }

    /// Resolve a request against the registry.
    ///
    /// A known code wins, with `timezone` overriding the site's own zone. An
    /// unknown or absent code needs every custom field.
    pub fn resolve(registry: &SiteRegistry, request: &SiteRequest) -> Result<Observer, SiteError> {
        if let Some(site) = request.code.as_deref().and_then(|code| registry.get(code)) {
            let observer = Observer::from_site(site)?;
            return match request.timezone.as_deref() {
                Some(tz) => observer.with_timezone(tz),
                None => Ok(observer),
            };
        }

        match (
            request.latitude_deg,
            request.longitude_deg,
            request.elevation_m,
            request.timezone.as_deref(),
        ) {
            (Some(lat), Some(lon), Some(elev), Some(tz)) => Observer::new(
                request.code.as_deref().unwrap_or("custom"),
                lat,
                lon,
                elev,
                tz,
            ),
            _ => match &request.code {
                Some(code) => Err(SiteError::UnknownSite {
                    code: code.clone(),
                    known: registry.codes().collect::<Vec<_>>().join(", "),
                }),
                None => Err(SiteError::Incomplete(first_missing(request))),
            },
        }
    }

    fn first_missing(request: &SiteRequest) -> &'static str {
        if request.latitude_deg.is_none() {
            "latitude"
        } else if request.longitude_deg.is_none() {
            "longitude"
        } else if request.elevation_m.is_none() {
            "elevation"
        } else {
            "time zone"
        }
    }
}

pub mod records {
    use transit_config::{EphemerisRecord, ScanSettings};

    use crate::constraints::{self, Constraint};
    use crate::ephemeris::{CoverageMode, Ephemeris, EphemerisError};
    use crate::error::InputError;
    use crate::scan::ScanOptions;

    /// Build a runtime ephemeris from a stored record, falling back to
    /// `default_label` for unnamed records.
    pub fn ephemeris_from_record(
        record: &EphemerisRecord,
        default_label: &str,
    ) -> Result<Ephemeris, EphemerisError> {
        Ephemeris::from_params(
            record.name.clone().unwrap_or_else(|| default_label.to_string()),
            record.epoch_jd(),
            record.period,
            record.duration_days(),
        )
    }

    /// Constraints and scan options described by a settings document.
    pub fn from_settings(settings: &ScanSettings) -> Result<(Vec<Constraint>, ScanOptions), InputError> {
        let constraints = constraints::from_settings(settings)?;
        let options = ScanOptions::new(
            settings.n_events,
            CoverageMode::from_exclude_partial(settings.exclude_partial_transit),
        )?;
        Ok((constraints, options))
    }
}
