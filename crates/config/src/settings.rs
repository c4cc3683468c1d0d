//! Scan settings: event count, coverage mode, and observability constraints.

use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Sun altitude used for the night-only constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TwilightConfig {
    Geometric,
    Sunrise,
    #[default]
    Civil,
    Nautical,
    Astronomical,
}

/// Constraint entry in a settings file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ConstraintConfig {
    #[serde(rename = "night")]
    Night {
        #[serde(default)]
        twilight: TwilightConfig,
    },
    #[serde(rename = "altitude")]
    Altitude { min_deg: f64 },
    #[serde(rename = "local_time")]
    LocalTime { start: String, end: String },
    #[serde(rename = "moon_separation")]
    MoonSeparation { min_deg: f64 },
    #[serde(other)]
    Unsupported,
}

/// Scan options. Missing keys fall back to the stock defaults.
///
/// When `constraints` is empty the stock constraint set is built from the
/// scalar fields; otherwise the list is used as given.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub n_events: usize,
    pub exclude_partial_transit: bool,
    pub altitude_limit_deg: f64,
    pub moon_separation_deg: f64,
    pub local_time_start: String,
    pub local_time_end: String,
    pub twilight: TwilightConfig,
    pub constraints: Vec<ConstraintConfig>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            n_events: 100,
            exclude_partial_transit: false,
            altitude_limit_deg: 30.0,
            moon_separation_deg: 10.0,
            local_time_start: "19:00".to_string(),
            local_time_end: "07:00".to_string(),
            twilight: TwilightConfig::Civil,
            constraints: Vec::new(),
        }
    }
}

impl ScanSettings {
    /// Explicit constraint list, or the stock set derived from the scalar fields.
    pub fn constraint_configs(&self) -> Vec<ConstraintConfig> {
        if !self.constraints.is_empty() {
            return self.constraints.clone();
        }
        vec![
            ConstraintConfig::Night {
                twilight: self.twilight,
            },
            ConstraintConfig::Altitude {
                min_deg: self.altitude_limit_deg,
            },
            ConstraintConfig::LocalTime {
                start: self.local_time_start.clone(),
                end: self.local_time_end.clone(),
            },
            ConstraintConfig::MoonSeparation {
                min_deg: self.moon_separation_deg,
            },
        ]
    }
}

/// Load scan settings from a single TOML, JSON, or YAML document.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<ScanSettings, ConfigError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(path)?)?),
        Some("json") => Ok(serde_json::from_reader(File::open(path)?)?),
        _ => Ok(serde_yaml::from_reader(File::open(path)?)?),
    }
}
