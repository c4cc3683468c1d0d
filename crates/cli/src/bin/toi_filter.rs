//! Select candidates from the cached TOI/CTOI tables, e.g. to build a target
//! list for batch predictions.

use anyhow::Context;
use clap::Parser;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;
use transit_planner::importer::catalog::default_cache_dir;
use transit_planner::importer::filters::Comparison;
use transit_planner::importer::{
    CatalogKind, CatalogSource, CatalogTable, Condition, ExofopClient, LocalCatalog, Preset,
};

#[path = "common/logging.rs"]
mod logging;

const PERIOD_COLUMN: &str = "Period (days)";
const REPORT_COLUMNS: &[&str] = &[PERIOD_COLUMN, "Planet Radius (R_Earth)", "Depth (ppm)"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Filter TOI/CTOI candidates by presets and column conditions")]
struct Cli {
    /// Catalog to filter (toi or ctoi)
    #[arg(long, default_value = "toi")]
    catalog: CatalogKind,

    /// Named selection; repeat to combine (e.g. --preset north --preset hi-snr)
    #[arg(short, long = "preset")]
    presets: Vec<Preset>,

    /// Extra condition `column op value`, e.g. "TESS Mag<11"; repeatable
    #[arg(short = 'w', long = "where")]
    conditions: Vec<Condition>,

    /// Drop candidates whose comments name an already-known planet
    #[arg(long, default_value_t = false)]
    remove_known: bool,

    /// Keep false-positive dispositions
    #[arg(long, default_value_t = false)]
    keep_fp: bool,

    /// Print the available presets and exit
    #[arg(long, default_value_t = false)]
    list_presets: bool,

    /// Save the selected ids to `<outdir>/<name>_<catalog>s.txt` instead of printing a table
    #[arg(short, long, default_value_t = false)]
    save: bool,

    #[arg(short, long, default_value = ".")]
    outdir: PathBuf,

    /// File name prefix for --save
    #[arg(long, default_value = "name")]
    name: String,

    /// Catalog cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Refresh the cached catalog first
    #[arg(long, default_value_t = false, conflicts_with = "offline")]
    refresh: bool,

    /// Use cached catalogs only; never download
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.list_presets {
        for preset in Preset::all() {
            let conditions: Vec<String> = preset.conditions().iter().map(ToString::to_string).collect();
            println!("{:<12} {}", preset.name(), conditions.join(" & "));
        }
        return Ok(());
    }

    let cache_dir = cli.cache_dir.clone().unwrap_or_else(default_cache_dir);
    let source: Box<dyn CatalogSource> = if cli.offline {
        Box::new(LocalCatalog::new(cache_dir))
    } else {
        Box::new(ExofopClient::new(cache_dir))
    };
    let table = source.fetch_or_load(cli.catalog, cli.refresh)?;
    let selected = select(&table, &cli)?;
    debug!(total = table.len(), selected = selected.len(), "filtered catalog");

    if cli.save {
        fs::create_dir_all(&cli.outdir)?;
        let path = cli.outdir.join(format!(
            "{}_{}s.txt",
            cli.name,
            cli.catalog.label().to_ascii_lowercase()
        ));
        let mut writer = BufWriter::new(
            File::create(&path).with_context(|| format!("creating {}", path.display()))?,
        );
        let id_column = cli.catalog.id_column();
        for row in selected.rows() {
            if let Some(id) = row.get(id_column) {
                writeln!(writer, "{id}")?;
            }
        }
        writer.flush()?;
        println!("Saved: {}", path.display());
    } else {
        print_table(&selected);
    }
    Ok(())
}

fn select(table: &CatalogTable, cli: &Cli) -> anyhow::Result<CatalogTable> {
    let mut table = if cli.keep_fp {
        table.clone()
    } else {
        table.remove_false_positives()?
    };
    if cli.remove_known {
        table = table.remove_known_planets()?;
    }
    table.require_column(PERIOD_COLUMN)?;
    let valid_period = Condition::new(PERIOD_COLUMN, Comparison::Gt, 0.0);
    Ok(table
        .filter(|row| {
            valid_period.matches(row)
                && cli.presets.iter().all(|preset| preset.matches(row))
                && cli.conditions.iter().all(|cond| cond.matches(row))
        })
        .sorted_by_id())
}

fn print_table(table: &CatalogTable) {
    let mut columns = vec![table.kind().id_column()];
    columns.extend(REPORT_COLUMNS.iter().copied().filter(|c| table.has_column(c)));

    let cells: Vec<Vec<String>> = table
        .rows()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(i, column)| match (i, row.number(column)) {
                    (0, _) | (_, None) => row.get(column).unwrap_or("NaN").to_string(),
                    (_, Some(value)) => format!("{value:.2}"),
                })
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let line = |fields: Vec<&str>| {
        fields
            .iter()
            .zip(&widths)
            .map(|(field, &width)| format!("{field:>width$}"))
            .collect::<Vec<_>>()
            .join(" ")
    };
    println!("{}", line(columns.clone()));
    for row in &cells {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}
