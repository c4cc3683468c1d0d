//! Configuration models and loaders for the transit planner.
//!
//! Records load from a YAML list, a single TOML or JSON document, or a
//! directory of `.toml` files (one record each, read in name order).

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use transit_core::TimeSystem;
use transit_core::units::hours_to_days;

pub mod settings;
pub mod sites;

pub use settings::{ConstraintConfig, ScanSettings, TwilightConfig, load_settings};
pub use sites::{SiteConfig, SiteRegistry, load_sites};

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no records found in {0}")]
    Empty(PathBuf),
}

/// Unit of the `duration` field in an ephemeris record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Days,
    Hours,
}

/// Transit ephemeris as stored on disk. Fields stay optional so that
/// incomplete records surface as ephemeris validation errors downstream.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EphemerisRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub t0: Option<f64>,
    #[serde(default)]
    pub period: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub duration_unit: DurationUnit,
    #[serde(default)]
    pub time_system: TimeSystem,
}

impl EphemerisRecord {
    /// Reference epoch as a Julian Date, with the mission offset applied.
    pub fn epoch_jd(&self) -> Option<f64> {
        self.t0
            .map(|value| self.time_system.to_julian_date(value).days())
    }

    pub fn duration_days(&self) -> Option<f64> {
        self.duration.map(|d| match self.duration_unit {
            DurationUnit::Days => d,
            DurationUnit::Hours => hours_to_days(d),
        })
    }
}

/// Load every ephemeris record found at `path`.
pub fn load_ephemerides<P: AsRef<Path>>(path: P) -> Result<Vec<EphemerisRecord>, ConfigError> {
    load_records(path)
}

/// Load the first ephemeris record found at `path`.
pub fn load_ephemeris<P: AsRef<Path>>(path: P) -> Result<EphemerisRecord, ConfigError> {
    let path = path.as_ref();
    load_records(path)?
        .into_iter()
        .next()
        .ok_or_else(|| ConfigError::Empty(path.to_path_buf()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

pub(crate) fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if has_extension(path, "toml") {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else if has_extension(path, "json") {
        let reader = File::open(path)?;
        Ok(match serde_json::from_reader(reader)? {
            OneOrMany::Many(records) => records,
            OneOrMany::One(record) => vec![record],
        })
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| has_extension(path, "toml"))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn toml_record_applies_tess_offset_and_hours() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toi.toml");
        fs::write(
            &path,
            "name = \"TOI-1234.01\"\nt0 = 1842.0\nperiod = 3.5\nduration = 2.4\nduration_unit = \"hours\"\ntime_system = \"tbjd\"\n",
        )
        .unwrap();

        let record = load_ephemeris(&path).unwrap();
        assert_eq!(record.epoch_jd(), Some(2_458_842.0));
        let duration = record.duration_days().unwrap();
        assert!((duration - 0.1).abs() < 1e-12);
        assert_eq!(record.period, Some(3.5));
    }

    #[test]
    fn json_accepts_single_object_or_list() {
        let dir = tempfile::tempdir().unwrap();
        let single = dir.path().join("one.json");
        fs::write(&single, r#"{"t0": 2458842.0, "period": 3.5}"#).unwrap();
        let records = load_ephemerides(&single).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration, None);

        let many = dir.path().join("many.json");
        fs::write(&many, r#"[{"t0": 1.0}, {"t0": 2.0}]"#).unwrap();
        assert_eq!(load_ephemerides(&many).unwrap().len(), 2);
    }

    #[test]
    fn directory_records_are_read_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.toml"), "t0 = 2.0\n").unwrap();
        fs::write(dir.path().join("a.toml"), "t0 = 1.0\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let records = load_ephemerides(dir.path()).unwrap();
        let epochs: Vec<_> = records.iter().map(|r| r.t0).collect();
        assert_eq!(epochs, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn empty_directory_has_no_first_record() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_ephemeris(dir.path()), Err(ConfigError::Empty(_))));
    }
}
