//! Target identifiers as typed on the command line.

use std::fmt;
use std::str::FromStr;

use transit_core::angle::{parse_dec_deg, parse_ra_deg};

use crate::ImportError;

/// `host.planet` id shared by TOI and CTOI numbering, e.g. `1234.01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId {
    pub host: u64,
    pub planet: u32,
}

impl CandidateId {
    pub fn new(host: u64, planet: u32) -> Self {
        Self { host, planet }
    }
}

impl FromStr for CandidateId {
    type Err = ImportError;

    /// Ids are decimal numbers, so `.1` is planet 10 and a bare host is planet 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ImportError::InvalidId(s.to_string());
        let text = s.trim();
        let (host, fraction) = match text.split_once('.') {
            Some((host, fraction)) => (host, Some(fraction)),
            None => (text, None),
        };
        let host = host.parse::<u64>().map_err(|_| invalid())?;
        let planet = match fraction {
            None => 1,
            Some(f) if (1..=2).contains(&f.len()) && f.bytes().all(|b| b.is_ascii_digit()) => {
                format!("{f:0<2}").parse::<u32>().map_err(|_| invalid())?
            }
            Some(_) => return Err(invalid()),
        };
        Ok(Self { host, planet })
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.host, self.planet)
    }
}

/// What the user asked to observe.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetId {
    /// Explicit `ra,dec`.
    Coordinates { ra_deg: f64, dec_deg: f64 },
    Toi(CandidateId),
    Ctoi(CandidateId),
    /// TIC number with an optional 1-based candidate index.
    Tic { tic: u64, candidate: Option<u32> },
    /// Anything else; resolved by name.
    Name(String),
}

impl TargetId {
    /// Short label used in report lines and output file names.
    pub fn label(&self) -> String {
        match self {
            TargetId::Coordinates { ra_deg, dec_deg } => format!("{ra_deg:.5}, {dec_deg:+.5}"),
            TargetId::Toi(id) => format!("TOI-{id}"),
            TargetId::Ctoi(id) => format!("CTOI-{id}"),
            TargetId::Tic { tic, candidate: None } => format!("TIC {tic}"),
            TargetId::Tic {
                tic,
                candidate: Some(n),
            } => format!("TIC {tic}.{n:02}"),
            TargetId::Name(name) => name.clone(),
        }
    }

    /// Label safe to use as a file name prefix: lowercase, no spaces or commas.
    pub fn file_stem(&self) -> String {
        self.label()
            .to_ascii_lowercase()
            .chars()
            .filter_map(|c| match c {
                ' ' | '-' => None,
                ',' | '/' => Some('_'),
                c => Some(c),
            })
            .collect()
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for TargetId {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ImportError::InvalidId(s.to_string()));
        }
        if let Some((ra, dec)) = text.split_once(',') {
            let coordinates = |source| ImportError::Coordinates {
                target: text.to_string(),
                source,
            };
            return Ok(TargetId::Coordinates {
                ra_deg: parse_ra_deg(ra).map_err(coordinates)?,
                dec_deg: parse_dec_deg(dec).map_err(coordinates)?,
            });
        }

        let lower = text.to_ascii_lowercase();
        if let Some(rest) = strip_prefix(&lower, "ctoi") {
            if let Ok(id) = rest.parse() {
                return Ok(TargetId::Ctoi(id));
            }
        }
        if let Some(rest) = strip_prefix(&lower, "toi") {
            if let Ok(id) = rest.parse() {
                return Ok(TargetId::Toi(id));
            }
        }
        if let Some(rest) = strip_prefix(&lower, "tic") {
            let (tic, candidate) = match rest.split_once('.') {
                Some((tic, n)) => (tic, Some(n)),
                None => (rest, None),
            };
            if let Ok(tic) = tic.parse::<u64>() {
                let candidate = match candidate {
                    None => None,
                    Some(n) => Some(
                        n.parse::<u32>()
                            .ok()
                            .filter(|n| *n > 0)
                            .ok_or_else(|| ImportError::InvalidId(s.to_string()))?,
                    ),
                };
                return Ok(TargetId::Tic { tic, candidate });
            }
        }
        Ok(TargetId::Name(text.to_string()))
    }
}

fn strip_prefix<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.strip_prefix(prefix)
        .map(|rest| rest.trim_start_matches([' ', '-', '_']))
        .filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_ids_default_to_first_planet() {
        assert_eq!("1234".parse::<CandidateId>().unwrap(), CandidateId::new(1234, 1));
        assert_eq!("1234.02".parse::<CandidateId>().unwrap(), CandidateId::new(1234, 2));
        assert_eq!("1234.1".parse::<CandidateId>().unwrap(), CandidateId::new(1234, 10));
        assert!("1234.001".parse::<CandidateId>().is_err());
        assert_eq!(CandidateId::new(42, 1).to_string(), "42.01");
    }

    #[test]
    fn parses_catalog_prefixes_in_any_case() {
        assert_eq!(
            "TOI-1234.01".parse::<TargetId>().unwrap(),
            TargetId::Toi(CandidateId::new(1234, 1))
        );
        assert_eq!(
            "toi200".parse::<TargetId>().unwrap(),
            TargetId::Toi(CandidateId::new(200, 1))
        );
        assert_eq!(
            "CTOI 201248411.02".parse::<TargetId>().unwrap(),
            TargetId::Ctoi(CandidateId::new(201_248_411, 2))
        );
        assert_eq!(
            "TIC231663901.02".parse::<TargetId>().unwrap(),
            TargetId::Tic {
                tic: 231_663_901,
                candidate: Some(2)
            }
        );
        assert!("tic123.0".parse::<TargetId>().is_err());
    }

    #[test]
    fn coordinates_and_free_names() {
        match "05:34:31.94, +22:00:52.2".parse::<TargetId>().unwrap() {
            TargetId::Coordinates { ra_deg, dec_deg } => {
                assert!((ra_deg - 83.633_083).abs() < 1e-5);
                assert!((dec_deg - 22.014_5).abs() < 1e-5);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            "83.6, 95".parse::<TargetId>(),
            Err(ImportError::Coordinates { .. })
        ));
        assert_eq!(
            "WASP-12".parse::<TargetId>().unwrap(),
            TargetId::Name("WASP-12".into())
        );
        assert_eq!(
            "Tichy's star".parse::<TargetId>().unwrap(),
            TargetId::Name("Tichy's star".into())
        );
    }

    #[test]
    fn labels_and_file_stems() {
        let toi = TargetId::Toi(CandidateId::new(1234, 1));
        assert_eq!(toi.label(), "TOI-1234.01");
        assert_eq!(toi.file_stem(), "toi1234.01");
        let tic = TargetId::Tic {
            tic: 7,
            candidate: None,
        };
        assert_eq!(tic.to_string(), "TIC 7");
        assert_eq!(tic.file_stem(), "tic7");
    }
}
