//! Transit visibility planner.
//!
//! Predicts which transits of an exoplanet candidate can be observed from a
//! ground site inside an observation window. The work is split across the
//! member crates re-exported here so that front-ends (the CLI binaries, tests)
//! depend on a single package.

pub use transit_config as config;
pub use transit_core as core;
pub use transit_engine as engine;
pub use transit_export as export;
pub use transit_importer as importer;
pub use transit_sky as sky;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
