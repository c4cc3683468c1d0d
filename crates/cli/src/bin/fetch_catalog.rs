//! Download the ExoFOP-TESS candidate tables into the local cache.
//!
//! Cached files are kept unless `--force` is given; a truncated download
//! never replaces an existing cache file.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use transit_planner::importer::catalog::default_cache_dir;
use transit_planner::importer::{CatalogKind, CatalogTable, ExofopClient, FetchStatus};

#[path = "common/logging.rs"]
mod logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Which {
    Toi,
    Ctoi,
    All,
}

impl Which {
    fn kinds(self) -> &'static [CatalogKind] {
        match self {
            Which::Toi => &[CatalogKind::Toi],
            Which::Ctoi => &[CatalogKind::Ctoi],
            Which::All => &[CatalogKind::Toi, CatalogKind::Ctoi],
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch TOI/CTOI catalogs from ExoFOP-TESS")]
struct Cli {
    /// Which catalog to fetch
    #[arg(value_enum, default_value_t = Which::All)]
    catalog: Which,

    /// Download even when a cached copy exists
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Catalog cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let client = ExofopClient::new(cli.cache_dir.clone().unwrap_or_else(default_cache_dir));
    for &kind in cli.catalog.kinds() {
        let status = client.refresh(kind, cli.force)?;
        let rows = CatalogTable::from_path(kind, status.path())?.len();
        match &status {
            FetchStatus::Downloaded(path) => println!("[downloaded] {} ({rows} rows)", path.display()),
            FetchStatus::Cached(path) => println!("[cached] {} ({rows} rows)", path.display()),
        }
    }
    Ok(())
}
