//! Merge per-target prediction tables into one CSV with a leading `name` column.

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use transit_planner::export::merge;

#[path = "common/logging.rs"]
mod logging;

const MERGED_FILE: &str = "merged.csv";

#[derive(Parser, Debug)]
#[command(author, version, about = "Merge individual transit prediction files")]
struct Cli {
    /// Directory holding `<name>_*.csv` prediction files
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    /// File extension to read
    #[arg(long, default_value = "csv")]
    ext: String,

    /// Write `merged.csv` into the input directory instead of stdout
    #[arg(short, long, default_value_t = false)]
    save: bool,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let out_path = cli.input_dir.join(MERGED_FILE);
    // A previous merge output would otherwise be merged into itself.
    let files: Vec<PathBuf> = merge::prediction_files(&cli.input_dir, &cli.ext)?
        .into_iter()
        .filter(|path| !cli.save || *path != out_path)
        .collect();

    if cli.save {
        let file = File::create(&out_path).with_context(|| format!("creating {}", out_path.display()))?;
        let rows = merge::merge_files(&files, BufWriter::new(file))?;
        println!("Saved: {} ({rows} rows from {} files)", out_path.display(), files.len());
    } else {
        merge::merge_files(&files, io::stdout().lock())?;
    }
    Ok(())
}
