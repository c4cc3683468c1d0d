//! Catalog import utilities: ExoFOP-TESS candidate tables, identifier
//! parsing, catalog lookups, and name resolution.

pub mod catalog;
mod error;
pub mod filters;
pub mod lookup;
pub mod resolve;
pub mod target_id;

pub use catalog::{CatalogKind, CatalogRow, CatalogSource, CatalogTable, ExofopClient, FetchStatus, LocalCatalog};
pub use error::ImportError;
pub use filters::{Condition, Preset};
pub use lookup::{EphemerisParams, StarPosition, ephemeris_for, position_for};
pub use resolve::{NameResolver, SesameResolver};
pub use target_id::{CandidateId, TargetId};
