use std::path::PathBuf;

use thiserror::Error;
use transit_core::angle::AngleError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{catalog} table has no `{column}` column")]
    MissingColumn {
        catalog: &'static str,
        column: String,
    },
    #[error("{0} not found in the catalog")]
    NotFound(String),
    #[error("`{0}` has no catalog ephemeris; give the epoch, period, and duration explicitly")]
    EphemerisUnavailable(String),
    #[error("could not resolve `{0}` to coordinates")]
    Unresolved(String),
    #[error("invalid coordinates for {target}: {source}")]
    Coordinates {
        target: String,
        #[source]
        source: AngleError,
    },
    #[error("downloaded {catalog} table has only {rows} rows; refusing to cache a truncated file")]
    Truncated { catalog: &'static str, rows: usize },
    #[error("cached catalog {0} is missing; fetch it first")]
    NotCached(PathBuf),
    #[error("invalid resolver URL: {0}")]
    InvalidUrl(String),
    #[error("invalid target identifier `{0}`")]
    InvalidId(String),
    #[error("invalid row condition `{0}`")]
    InvalidCondition(String),
    #[error("unknown filter preset `{0}`")]
    UnknownPreset(String),
}
