//! Input-validation errors surfaced before a scan starts.

use thiserror::Error;

use crate::constraints::ConstraintError;
use crate::ephemeris::EphemerisError;
use crate::observer::SiteError;
use crate::scan::WindowError;
use crate::target::TargetError;

/// Any invalid scan input. Computational outcomes such as "nothing
/// observable" are reported through `ScanOutcome`, never through this type.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("invalid ephemeris: {0}")]
    Ephemeris(#[from] EphemerisError),
    #[error("invalid site: {0}")]
    Site(#[from] SiteError),
    #[error("invalid target: {0}")]
    Target(#[from] TargetError),
    #[error("invalid observation window: {0}")]
    Window(#[from] WindowError),
    #[error("invalid constraint: {0}")]
    Constraint(#[from] ConstraintError),
    #[error("number of events must be at least 1")]
    EventCount,
    #[error("no target coordinates or name given")]
    MissingTarget,
}
