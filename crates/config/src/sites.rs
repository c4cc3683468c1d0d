//! Observatory site registry.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, load_records};

/// A named observing site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub code: String,
    pub latitude_deg: f64,
    /// East-positive longitude; values in [180, 360) are accepted.
    pub longitude_deg: f64,
    pub elevation_m: f64,
    /// IANA time zone name used for local-clock constraints.
    pub timezone: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// (code, latitude°, longitude°, elevation m, time zone, description)
const BUILTIN_SITES: &[(&str, f64, f64, f64, &str, &str)] = &[
    ("OAO", 34.5761, 133.5941, 343.0, "Asia/Tokyo", "Okayama Astrophysical Observatory"),
    ("ALI", 32.3167, 80.0167, 5100.0, "Etc/GMT+8", "Ali Observatory, Tibet"),
    ("MCDO", 30.67, -104.02, 2070.0, "UCT", "McDonald Observatory, Texas"),
    ("WISE", 30.5958, 34.76333, 875.0, "Asia/Jerusalem", "Wise Observatory"),
    ("OT", 28.291, 343.5033, 2395.0, "UTC", "Teide Observatory"),
    ("TCS", 28.291, 343.5033, 2395.0, "UTC", "Carlos Sanchez Telescope, Teide"),
    ("ALS", 24.1776, 54.6862, 100.0, "Etc/GMT+4", "Al Sadeem Observatory"),
    ("HLK", 20.7075, -156.2561, 3055.0, "Pacific/Honolulu", "Haleakala Observatory"),
    ("TNO", 18.59056, 98.48656, 2457.0, "Asia/Bangkok", "Thai National Observatory"),
    ("CTIO", -30.1675, -70.8047, 2198.0, "America/Santiago", "Cerro Tololo"),
    ("TRO", -30.1692, -70.805, 2286.0, "America/Santiago", "Cerro Tololo (PROMPT-8)"),
    ("SBO", -31.2733, 149.0617, 1145.0, "Australia/Brisbane", "Springbrook Observatory"),
    ("SSO", -31.2754, 149.067, 1164.0, "Australia/NSW", "Siding Spring Observatory"),
    ("AAO", -31.2754, 149.067, 1164.0, "Australia/NSW", "Anglo-Australian Observatory"),
    ("SAAO", -32.3760, 20.8107, 1798.0, "Africa/Johannesburg", "South African Astronomical Observatory"),
];

/// Site lookup table keyed by case-insensitive code.
///
/// Passed explicitly to whatever resolves an observer; there is no global
/// registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteRegistry {
    sites: Vec<SiteConfig>,
}

impl SiteRegistry {
    /// The stock set of observatories.
    pub fn builtin() -> Self {
        let sites = BUILTIN_SITES
            .iter()
            .map(|&(code, lat, lon, elev, tz, description)| SiteConfig {
                code: code.to_string(),
                latitude_deg: lat,
                longitude_deg: lon,
                elevation_m: elev,
                timezone: tz.to_string(),
                description: Some(description.to_string()),
            })
            .collect();
        Self { sites }
    }

    /// Build a registry from records; later records replace earlier ones with the same code.
    pub fn from_configs<I: IntoIterator<Item = SiteConfig>>(configs: I) -> Self {
        let mut registry = Self::default();
        registry.extend(configs);
        registry
    }

    /// Insert or replace a site, returning the replaced entry.
    pub fn insert(&mut self, site: SiteConfig) -> Option<SiteConfig> {
        match self
            .sites
            .iter_mut()
            .find(|s| s.code.eq_ignore_ascii_case(&site.code))
        {
            Some(existing) => Some(std::mem::replace(existing, site)),
            None => {
                self.sites.push(site);
                None
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = SiteConfig>>(&mut self, configs: I) {
        for site in configs {
            self.insert(site);
        }
    }

    pub fn get(&self, code: &str) -> Option<&SiteConfig> {
        self.sites
            .iter()
            .find(|s| s.code.eq_ignore_ascii_case(code.trim()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteConfig> {
        self.sites.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.sites.iter().map(|s| s.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Load site records from a YAML list, TOML/JSON file, or directory.
pub fn load_sites<P: AsRef<Path>>(path: P) -> Result<Vec<SiteConfig>, ConfigError> {
    load_records(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn builtin_registry_is_case_insensitive() {
        let registry = SiteRegistry::builtin();
        let oao = registry.get("oao").expect("OAO present");
        assert_eq!(oao.timezone, "Asia/Tokyo");
        assert!(registry.get("SAAO").is_some());
        assert!(registry.get("XYZ").is_none());
        assert_eq!(registry.len(), BUILTIN_SITES.len());
    }

    #[test]
    fn later_records_replace_earlier_codes() {
        let mut registry = SiteRegistry::builtin();
        let before = registry.len();
        let replaced = registry.insert(SiteConfig {
            code: "oao".into(),
            latitude_deg: 34.0,
            longitude_deg: 133.0,
            elevation_m: 0.0,
            timezone: "Asia/Tokyo".into(),
            description: None,
        });
        assert!(replaced.is_some());
        assert_eq!(registry.len(), before);
        assert_eq!(registry.get("OAO").unwrap().latitude_deg, 34.0);
    }

    #[test]
    fn yaml_site_list_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.yaml");
        fs::write(
            &path,
            "- code: LCO\n  latitude_deg: -29.0146\n  longitude_deg: -70.6926\n  elevation_m: 2380\n  timezone: America/Santiago\n",
        )
        .unwrap();
        let sites = load_sites(&path).unwrap();
        let registry = SiteRegistry::from_configs(sites);
        assert_eq!(registry.codes().collect::<Vec<_>>(), vec!["LCO"]);
        assert_eq!(registry.get("lco").unwrap().elevation_m, 2380.0);
    }
}
