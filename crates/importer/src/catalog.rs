//! TOI and CTOI tables: download, cache, and row-level filtering.

use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::StringRecord;
use reqwest::blocking::Client;
use tracing::{info, warn};
use transit_core::angle::{parse_dec_deg, parse_ra_deg};

use crate::ImportError;

/// Column holding the TESS Input Catalog id in both tables.
pub const TIC_COLUMN: &str = "TIC ID";
pub const COMMENTS_COLUMN: &str = "Comments";

/// Survey prefixes whose appearance in a TOI comment marks an already-known planet.
pub const KNOWN_PLANET_KEYS: &[&str] = &[
    "HD", "GJ", "LHS", "XO", "Pi Men", "WASP", "SWASP", "HAT", "HATS", "KELT", "TrES", "QATAR",
    "CoRoT", "K2", "Kepler",
];

/// The two candidate tables published by ExoFOP-TESS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    /// TESS Objects of Interest.
    Toi,
    /// Community TOIs.
    Ctoi,
}

impl CatalogKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Toi => "TOI",
            Self::Ctoi => "CTOI",
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            Self::Toi => "https://exofop.ipac.caltech.edu/tess/download_toi.php?sort=toi&output=csv",
            Self::Ctoi => "https://exofop.ipac.caltech.edu/tess/download_ctoi.php?sort=ctoi&output=csv",
        }
    }

    /// Cache file name.
    pub fn filename(self) -> &'static str {
        match self {
            Self::Toi => "TOIs.csv",
            Self::Ctoi => "CTOIs.csv",
        }
    }

    pub fn id_column(self) -> &'static str {
        self.label()
    }

    pub fn disposition_column(self) -> &'static str {
        match self {
            Self::Toi => "TFOPWG Disposition",
            Self::Ctoi => "User Disposition",
        }
    }

    /// Fewer rows than this in a fresh download means the file is truncated.
    pub fn min_rows(self) -> usize {
        match self {
            Self::Toi => 1000,
            Self::Ctoi => 1,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CatalogKind {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toi" | "tois" => Ok(Self::Toi),
            "ctoi" | "ctois" => Ok(Self::Ctoi),
            _ => Err(ImportError::InvalidId(s.to_string())),
        }
    }
}

/// One catalog, held as raw CSV records.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTable {
    kind: CatalogKind,
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl CatalogTable {
    pub fn from_reader<R: Read>(kind: CatalogKind, reader: R) -> Result<Self, ImportError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind,
            headers,
            rows,
        })
    }

    pub fn from_path(kind: CatalogKind, path: &Path) -> Result<Self, ImportError> {
        let file = fs::File::open(path)?;
        Self::from_reader(kind, file)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ImportError> {
        let mut out = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        out.write_record(&self.headers)?;
        for row in &self.rows {
            out.write_record(row)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn require_column(&self, column: &str) -> Result<(), ImportError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(ImportError::MissingColumn {
                catalog: self.kind.label(),
                column: column.to_string(),
            })
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = CatalogRow<'_>> {
        self.rows.iter().map(|record| CatalogRow {
            headers: &self.headers,
            record,
        })
    }

    /// Rows for which `predicate` holds, as a new table.
    pub fn filter<F>(&self, mut predicate: F) -> CatalogTable
    where
        F: FnMut(&CatalogRow<'_>) -> bool,
    {
        let rows = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.record.clone())
            .collect();
        CatalogTable {
            kind: self.kind,
            headers: self.headers.clone(),
            rows,
        }
    }

    /// Drop rows whose disposition is `FP`.
    pub fn remove_false_positives(&self) -> Result<CatalogTable, ImportError> {
        let column = self.kind.disposition_column();
        self.require_column(column)?;
        Ok(self.filter(|row| row.get(column) != Some("FP")))
    }

    /// Drop rows whose comments name a survey that already confirmed the planet.
    pub fn remove_known_planets(&self) -> Result<CatalogTable, ImportError> {
        self.require_column(COMMENTS_COLUMN)?;
        Ok(self.filter(|row| {
            let comments = row.get(COMMENTS_COLUMN).unwrap_or_default();
            !KNOWN_PLANET_KEYS.iter().any(|key| comments.contains(key))
        }))
    }

    /// Rows ordered by their numeric TOI/CTOI id; unparsable ids sort last.
    pub fn sorted_by_id(&self) -> CatalogTable {
        let column = self.kind.id_column();
        let mut keyed: Vec<(f64, StringRecord)> = self
            .rows()
            .map(|row| {
                let key = row
                    .get(column)
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .unwrap_or(f64::INFINITY);
                (key, row.record.clone())
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        CatalogTable {
            kind: self.kind,
            headers: self.headers.clone(),
            rows: keyed.into_iter().map(|(_, record)| record).collect(),
        }
    }

    /// Remove exact duplicate rows, keeping the first occurrence.
    pub fn deduplicated(&self) -> CatalogTable {
        let mut seen: Vec<&StringRecord> = Vec::with_capacity(self.rows.len());
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if !seen.contains(&row) {
                seen.push(row);
                rows.push(row.clone());
            }
        }
        CatalogTable {
            kind: self.kind,
            headers: self.headers.clone(),
            rows,
        }
    }
}

/// Borrowed view of one row with column-name access.
#[derive(Debug, Clone, Copy)]
pub struct CatalogRow<'a> {
    headers: &'a StringRecord,
    record: &'a StringRecord,
}

impl<'a> CatalogRow<'a> {
    /// Trimmed cell text; empty cells read as `None`.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.record
            .get(index)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Cell as a number. Sexagesimal `RA` reads as hours, other
    /// sexagesimal cells as degrees.
    pub fn number(&self, column: &str) -> Option<f64> {
        let text = self.get(column)?;
        if let Ok(value) = text.parse::<f64>() {
            return Some(value);
        }
        if !text.contains(':') {
            return None;
        }
        if column == "RA" {
            parse_ra_deg(text).ok()
        } else {
            parse_dec_deg(text).ok()
        }
    }

    pub fn record(&self) -> &'a StringRecord {
        self.record
    }
}

/// Anything that can hand back a catalog table.
pub trait CatalogSource {
    /// Download when missing or when `force_refresh` is set, else read the cache.
    fn fetch_or_load(&self, kind: CatalogKind, force_refresh: bool) -> Result<CatalogTable, ImportError>;
}

/// Outcome of refreshing a cached catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Downloaded(PathBuf),
    Cached(PathBuf),
}

impl FetchStatus {
    pub fn path(&self) -> &Path {
        match self {
            FetchStatus::Downloaded(path) | FetchStatus::Cached(path) => path,
        }
    }
}

/// Platform cache directory for catalog files.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("transit_planner")
}

/// ExoFOP-TESS downloader with an on-disk cache.
#[derive(Debug, Clone)]
pub struct ExofopClient {
    cache_dir: PathBuf,
}

impl ExofopClient {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_path(&self, kind: CatalogKind) -> PathBuf {
        self.cache_dir.join(kind.filename())
    }

    /// Make sure the cache holds `kind`, downloading when missing or forced.
    pub fn refresh(&self, kind: CatalogKind, force: bool) -> Result<FetchStatus, ImportError> {
        let dest = self.cache_path(kind);
        if dest.exists() && !force {
            return Ok(FetchStatus::Cached(dest));
        }
        fs::create_dir_all(&self.cache_dir)?;
        let client = Client::builder().build()?;
        download_catalog(&client, kind, &dest)?;
        Ok(FetchStatus::Downloaded(dest))
    }
}

impl CatalogSource for ExofopClient {
    fn fetch_or_load(&self, kind: CatalogKind, force_refresh: bool) -> Result<CatalogTable, ImportError> {
        let status = self.refresh(kind, force_refresh)?;
        match &status {
            FetchStatus::Downloaded(path) => info!(catalog = %kind, path = %path.display(), "downloaded catalog"),
            FetchStatus::Cached(path) => info!(catalog = %kind, path = %path.display(), "loaded cached catalog"),
        }
        load_cached(kind, status.path())
    }
}

fn download_catalog(client: &Client, kind: CatalogKind, dest: &Path) -> Result<(), ImportError> {
    info!(catalog = %kind, url = kind.url(), "downloading catalog");
    let body = client.get(kind.url()).send()?.error_for_status()?.bytes()?;
    let table = CatalogTable::from_reader(kind, body.as_ref())?;
    if table.len() < kind.min_rows() {
        warn!(catalog = %kind, rows = table.len(), "download looks truncated; keeping the previous cache");
        return Err(ImportError::Truncated {
            catalog: kind.label(),
            rows: table.len(),
        });
    }
    let partial = dest.with_extension("csv.part");
    fs::write(&partial, &body)?;
    fs::rename(&partial, dest)?;
    Ok(())
}

fn load_cached(kind: CatalogKind, path: &Path) -> Result<CatalogTable, ImportError> {
    let table = CatalogTable::from_path(kind, path)?;
    Ok(match kind {
        CatalogKind::Toi => table,
        CatalogKind::Ctoi => table.deduplicated(),
    })
}

/// Catalog files already on disk; never touches the network.
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    dir: PathBuf,
}

impl LocalCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CatalogSource for LocalCatalog {
    fn fetch_or_load(&self, kind: CatalogKind, _force_refresh: bool) -> Result<CatalogTable, ImportError> {
        let path = self.dir.join(kind.filename());
        if !path.exists() {
            return Err(ImportError::NotCached(path));
        }
        load_cached(kind, &path)
    }
}
