//! Export helpers for CSV and JSON artifacts.

pub mod events {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    pub const HEADER: &str = "cycle,ingress,midtransit,egress,ingress_jd,midtransit_jd,egress_jd";

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Write the standard event-table header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One transit row: UTC timestamps plus the same instants as Julian dates.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub cycle: i64,
        pub ingress_utc: &'a str,
        pub midtransit_utc: &'a str,
        pub egress_utc: &'a str,
        pub ingress_jd: f64,
        pub midtransit_jd: f64,
        pub egress_jd: f64,
    }

    impl<'a> Record<'a> {
        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{},{},{},{},{:.6},{:.6},{:.6}",
                self.cycle,
                self.ingress_utc,
                self.midtransit_utc,
                self.egress_utc,
                self.ingress_jd,
                self.midtransit_jd,
                self.egress_jd,
            )
        }
    }
}

pub mod summary {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::fs::{self, File};
    use std::io;
    use std::path::{Path, PathBuf};

    /// Which of the three scan outcomes the summary describes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum OutcomeKind {
        NoObservableEvent,
        NextAfterWindow,
        Observable,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct EventTimes {
        pub cycle: i64,
        pub ingress_utc: String,
        pub midtransit_utc: String,
        pub egress_utc: String,
        pub midtransit_jd: f64,
    }

    /// JSON sidecar describing one scan.
    #[derive(Debug, Clone, Serialize)]
    pub struct ScanSummary {
        pub target: String,
        pub site: String,
        pub ra_deg: f64,
        pub dec_deg: f64,
        pub epoch_jd: f64,
        pub period_days: f64,
        pub duration_days: f64,
        /// `full transit` or `transit midpoint`.
        pub coverage: String,
        pub window_start_utc: String,
        pub window_end_utc: String,
        pub constraints: Vec<String>,
        pub generated: usize,
        pub outcome: OutcomeKind,
        pub events: Vec<EventTimes>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub next_event: Option<EventTimes>,
    }

    /// Sidecar path next to a CSV output: `<stem>_summary.json`.
    pub fn sidecar_path(output: &Path) -> PathBuf {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("transits");
        parent.join(format!("{}_summary.json", stem))
    }

    /// Write the JSON summary to `path`, creating parent directories.
    pub fn write_summary(path: &Path, summary: &ScanSummary) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        to_writer_pretty(File::create(path)?, summary)?;
        Ok(())
    }
}

pub mod merge {
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use thiserror::Error;
    use tracing::debug;

    #[derive(Debug, Error)]
    pub enum MergeError {
        #[error("failed to read prediction files: {0}")]
        Io(#[from] std::io::Error),
        #[error("invalid CSV: {0}")]
        Csv(#[from] csv::Error),
        #[error("no .{ext} files found in {dir}")]
        NoInput { dir: PathBuf, ext: String },
        #[error("{path} has columns that differ from the first file")]
        HeaderMismatch { path: PathBuf },
    }

    /// Files in `dir` with extension `ext`, sorted by name.
    pub fn prediction_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, MergeError> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
            })
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(MergeError::NoInput {
                dir: dir.to_path_buf(),
                ext: ext.to_string(),
            });
        }
        Ok(files)
    }

    /// Target name encoded in a prediction file name: the part before the first `_`.
    pub fn target_name(path: &Path) -> String {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        stem.split('_').next().unwrap_or(stem).to_string()
    }

    /// Concatenate `files` into one CSV with a leading `name` column.
    /// Returns the number of data rows written.
    pub fn merge_files<W: Write>(files: &[PathBuf], writer: W) -> Result<usize, MergeError> {
        let mut out = csv::Writer::from_writer(writer);
        let mut header: Option<csv::StringRecord> = None;
        let mut rows = 0;

        for path in files {
            let mut reader = csv::Reader::from_path(path)?;
            let columns = reader.headers()?.clone();
            match &header {
                None => {
                    let mut merged = csv::StringRecord::new();
                    merged.push_field("name");
                    merged.extend(columns.iter());
                    out.write_record(&merged)?;
                    header = Some(columns);
                }
                Some(first) if *first != columns => {
                    return Err(MergeError::HeaderMismatch { path: path.clone() });
                }
                Some(_) => {}
            }

            let name = target_name(path);
            let mut count = 0;
            for record in reader.records() {
                let record = record?;
                let mut row = csv::StringRecord::new();
                row.push_field(&name);
                row.extend(record.iter());
                out.write_record(&row)?;
                count += 1;
            }
            debug!(file = %path.display(), rows = count, "merged prediction file");
            rows += count;
        }

        out.flush()?;
        Ok(rows)
    }
}
