//! Transit visibility engine: ephemerides, observers, constraints, and the
//! window scan tying them together.

pub mod constraints;
pub mod ephemeris;
pub mod error;
pub mod observer;
pub mod scan;
pub mod target;

pub use facade::*;
pub use transit_sky as sky;

mod facade;
