use anyhow::{Context, bail};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use transit_planner::config::{
    DurationUnit, EphemerisRecord, ScanSettings, SiteRegistry, load_ephemerides, load_settings, load_sites,
};
use transit_planner::core::angle::{parse_dec_deg, parse_ra_deg};
use transit_planner::engine::records::{self, ephemeris_from_record};
use transit_planner::engine::site::{self, SiteRequest};
use transit_planner::engine::{
    Constraint, Ephemeris, Event, InputError, JulianDate, ObservationWindow, Observer, ScanOutcome, ScanRequest,
    ScanResult, Target, TimeSystem, scan,
};
use transit_planner::export::{events as export_events, summary as export_summary};
use transit_planner::importer::catalog::default_cache_dir;
use transit_planner::importer::{
    CatalogSource, ExofopClient, LocalCatalog, SesameResolver, TargetId, ephemeris_for, position_for,
};

#[path = "common/logging.rs"]
mod logging;
#[path = "transit/plot.rs"]
mod plot;

const DEFAULT_SITE: &str = "TRO";

/// Predict the transits of one planet candidate that are observable from one site.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Observable transit predictor (ephemeris + site + night-time constraints)"
)]
struct Cli {
    /// Target: toi<N>[.NN], ctoi<N>[.NN], tic<N>[.NN], "ra,dec", or a name Sesame can resolve
    target: Option<String>,

    /// Target right ascension (degrees or hh:mm:ss); skips the coordinate lookup
    #[arg(long, allow_hyphen_values = true, requires = "dec")]
    ra: Option<String>,

    /// Target declination (degrees or ±dd:mm:ss)
    #[arg(long, allow_hyphen_values = true, requires = "ra")]
    dec: Option<String>,

    /// Name used in the report (defaults to the target id)
    #[arg(long)]
    name: Option<String>,

    /// Mid-transit reference epoch, in the units of --time-system
    #[arg(long)]
    t0: Option<f64>,

    /// Orbital period in days
    #[arg(long)]
    period: Option<f64>,

    /// Transit duration in days
    #[arg(long, conflicts_with = "duration_hours")]
    duration: Option<f64>,

    /// Transit duration in hours
    #[arg(long)]
    duration_hours: Option<f64>,

    /// Time system of --t0 (bjd, tbjd, bkjd)
    #[arg(long, default_value = "bjd")]
    time_system: TimeSystem,

    /// Ephemeris record file (TOML/JSON/YAML) or directory of TOML records
    #[arg(long)]
    ephemeris: Option<PathBuf>,

    /// Observation window start date [UT], e.g. 2019-12-24
    #[arg(long)]
    start_date: String,

    /// Observation window start time [UT]
    #[arg(long, default_value = "19:00")]
    start_time: String,

    /// Observation window end date [UT]
    #[arg(long)]
    end_date: String,

    /// Observation window end time [UT]
    #[arg(long, default_value = "06:00")]
    end_time: String,

    /// Site code from the registry (default TRO unless a custom location is given)
    #[arg(long)]
    site: Option<String>,

    /// Extra site records (YAML list, TOML/JSON document, or directory of TOML files)
    #[arg(long)]
    sites: Option<PathBuf>,

    /// Custom site latitude [deg]
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Custom site longitude [deg, east positive]
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Custom site elevation [m]
    #[arg(long)]
    elev: Option<f64>,

    /// IANA time zone of the site; overrides a registry site's own zone
    #[arg(long)]
    timezone: Option<String>,

    /// Scan settings file; the flags below override its values
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of upcoming transits to compute [default: 100]
    #[arg(short = 'n', long)]
    n_events: Option<usize>,

    /// Require ingress and egress to be observable (full transits only)
    #[arg(short = 'e', long, default_value_t = false)]
    exclude_partial: bool,

    /// Target altitude limit [deg] [default: 30]
    #[arg(long)]
    alt: Option<f64>,

    /// Moon separation limit [deg] [default: 10]
    #[arg(long)]
    sep: Option<f64>,

    /// Event table CSV (use '-' for stdout); a JSON summary is written next to files
    #[arg(long)]
    output: Option<PathBuf>,

    /// Altitude chart PNG for the first reported transit
    #[arg(long)]
    plot: Option<PathBuf>,

    #[arg(long, default_value_t = 1000)]
    plot_width: u32,

    #[arg(long, default_value_t = 600)]
    plot_height: u32,

    /// Catalog cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

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

    let target_id = cli
        .target
        .as_deref()
        .map(str::parse::<TargetId>)
        .transpose()?;
    let cache_dir = cli.cache_dir.clone().unwrap_or_else(default_cache_dir);
    let catalog: Box<dyn CatalogSource> = if cli.offline {
        Box::new(LocalCatalog::new(cache_dir))
    } else {
        Box::new(ExofopClient::new(cache_dir))
    };

    let observer = build_observer(&cli)?;
    let settings = scan_settings(&cli)?;
    let (constraints, options) = records::from_settings(&settings)?;
    let target = build_target(&cli, target_id.as_ref(), catalog.as_ref())?;
    let ephemeris = build_ephemeris(&cli, target_id.as_ref(), target.name(), catalog.as_ref())?;

    let start = JulianDate::parse_date_time(&cli.start_date, Some(&cli.start_time))?;
    let end = JulianDate::parse_date_time(&cli.end_date, Some(&cli.end_time))?;
    let window = ObservationWindow::new(start, end).map_err(InputError::from)?;

    info!(
        site = observer.name(),
        timezone = %observer.timezone(),
        epoch = ephemeris.reference_epoch().days(),
        period = ephemeris.period_days(),
        "scanning"
    );
    let result = scan(&ScanRequest {
        ephemeris: &ephemeris,
        observer: &observer,
        target: &target,
        constraints: &constraints,
        window,
        options,
    });
    println!("{}", result.summary(target.name(), observer.name()));

    if let Some(output) = &cli.output {
        write_events(output, &result)?;
        if output != Path::new("-") {
            let sidecar = export_summary::sidecar_path(output);
            let summary = scan_summary(&result, &target, &observer, &ephemeris, &constraints);
            export_summary::write_summary(&sidecar, &summary)
                .with_context(|| format!("writing {}", sidecar.display()))?;
            info!(path = %sidecar.display(), "wrote scan summary");
        }
    }

    if let Some(path) = &cli.plot {
        match first_reported(&result) {
            Some(event) => {
                let limit = constraints.iter().find_map(|c| match c {
                    Constraint::MinAltitude { min_deg } => Some(*min_deg),
                    _ => None,
                });
                plot::render_altitude_chart(
                    path,
                    &observer,
                    &target,
                    &event,
                    limit,
                    (cli.plot_width, cli.plot_height),
                )?;
                info!(path = %path.display(), "wrote altitude chart");
            }
            None => warn!("no observable transit to plot"),
        }
    }

    Ok(())
}

fn build_observer(cli: &Cli) -> anyhow::Result<Observer> {
    let mut registry = SiteRegistry::builtin();
    if let Some(path) = &cli.sites {
        registry.extend(load_sites(path).with_context(|| format!("loading sites from {}", path.display()))?);
    }
    let custom = cli.lat.is_some() || cli.lon.is_some() || cli.elev.is_some();
    let request = SiteRequest {
        code: cli
            .site
            .clone()
            .or_else(|| (!custom).then(|| DEFAULT_SITE.to_string())),
        latitude_deg: cli.lat,
        longitude_deg: cli.lon,
        elevation_m: cli.elev,
        timezone: cli.timezone.clone(),
    };
    Ok(site::resolve(&registry, &request).map_err(InputError::from)?)
}

fn scan_settings(cli: &Cli) -> anyhow::Result<ScanSettings> {
    let mut settings = match &cli.settings {
        Some(path) => {
            load_settings(path).with_context(|| format!("loading settings from {}", path.display()))?
        }
        None => ScanSettings::default(),
    };
    if let Some(n) = cli.n_events {
        settings.n_events = n;
    }
    if cli.exclude_partial {
        settings.exclude_partial_transit = true;
    }
    if let Some(alt) = cli.alt {
        settings.altitude_limit_deg = alt;
    }
    if let Some(sep) = cli.sep {
        settings.moon_separation_deg = sep;
    }
    Ok(settings)
}

fn build_target(cli: &Cli, id: Option<&TargetId>, catalog: &dyn CatalogSource) -> anyhow::Result<Target> {
    let default_name = || {
        cli.name
            .clone()
            .or_else(|| id.map(TargetId::label))
            .unwrap_or_else(|| "target".to_string())
    };

    if let (Some(ra), Some(dec)) = (&cli.ra, &cli.dec) {
        let ra_deg = parse_ra_deg(ra).with_context(|| format!("--ra {ra}"))?;
        let dec_deg = parse_dec_deg(dec).with_context(|| format!("--dec {dec}"))?;
        return Ok(Target::new(default_name(), ra_deg, dec_deg).map_err(InputError::from)?);
    }

    let id = id.ok_or(InputError::MissingTarget)?;
    let position = position_for(catalog, &SesameResolver::new(), id)?;
    info!(target_id = %id, source = %position.source, "resolved coordinates");
    let target = Target::new(default_name(), position.ra_deg, position.dec_deg).map_err(InputError::from)?;
    Ok(match position.distance_pc {
        Some(distance) => target.with_distance(distance).map_err(InputError::from)?,
        None => target,
    })
}

fn build_ephemeris(
    cli: &Cli,
    id: Option<&TargetId>,
    label: &str,
    catalog: &dyn CatalogSource,
) -> anyhow::Result<Ephemeris> {
    let duration = cli
        .duration
        .or(cli.duration_hours.map(transit_planner::core::units::hours_to_days));
    let complete = cli.t0.is_some() && cli.period.is_some() && duration.is_some();

    let mut record = if complete {
        EphemerisRecord::default()
    } else if let Some(path) = &cli.ephemeris {
        let records = load_ephemerides(path).with_context(|| format!("loading ephemeris from {}", path.display()))?;
        select_record(&records, label)?.clone()
    } else if let Some(id) = id.filter(|id| !matches!(id, TargetId::Coordinates { .. } | TargetId::Name(_))) {
        let params = ephemeris_for(catalog, id)?;
        info!(source = %params.source, "using catalog ephemeris");
        EphemerisRecord {
            t0: params.epoch_bjd,
            period: params.period_days,
            duration: params.duration_days,
            ..EphemerisRecord::default()
        }
    } else {
        EphemerisRecord::default()
    };

    if let Some(t0) = cli.t0 {
        record.t0 = Some(t0);
        record.time_system = cli.time_system;
    }
    if let Some(period) = cli.period {
        record.period = Some(period);
    }
    if let Some(duration) = duration {
        record.duration = Some(duration);
        record.duration_unit = DurationUnit::Days;
    }
    record.name = Some(label.to_string());
    Ok(ephemeris_from_record(&record, label).map_err(InputError::from)?)
}

/// The record named like the target, or the only record in the file.
fn select_record<'a>(records: &'a [EphemerisRecord], label: &str) -> anyhow::Result<&'a EphemerisRecord> {
    let key = |name: &str| {
        name.chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase()
    };
    let wanted = key(label);
    if let Some(record) = records
        .iter()
        .find(|r| r.name.as_deref().is_some_and(|name| key(name) == wanted))
    {
        return Ok(record);
    }
    match records {
        [only] => Ok(only),
        _ => bail!(
            "no ephemeris record named `{label}` among {} records",
            records.len()
        ),
    }
}

fn first_reported(result: &ScanResult) -> Option<Event> {
    match &result.outcome {
        ScanOutcome::Observable(events) => events.first().copied(),
        ScanOutcome::NextAfterWindow(event) => Some(*event),
        ScanOutcome::NoObservableEvent => None,
    }
}

fn write_events(output: &Path, result: &ScanResult) -> anyhow::Result<()> {
    let mut writer = export_events::writer_for_path(output)
        .with_context(|| format!("opening {}", output.display()))?;
    export_events::write_header(&mut writer)?;
    for event in result.events() {
        let ingress = event.ingress.format_iso();
        let midpoint = event.midpoint.format_iso();
        let egress = event.egress.format_iso();
        export_events::Record {
            cycle: event.cycle,
            ingress_utc: &ingress,
            midtransit_utc: &midpoint,
            egress_utc: &egress,
            ingress_jd: event.ingress.days(),
            midtransit_jd: event.midpoint.days(),
            egress_jd: event.egress.days(),
        }
        .write_to(&mut writer)?;
    }
    writer.flush()?;
    if output != Path::new("-") {
        info!(path = %output.display(), rows = result.events().len(), "wrote event table");
    }
    Ok(())
}

fn event_times(event: &Event) -> export_summary::EventTimes {
    export_summary::EventTimes {
        cycle: event.cycle,
        ingress_utc: event.ingress.format_iso(),
        midtransit_utc: event.midpoint.format_iso(),
        egress_utc: event.egress.format_iso(),
        midtransit_jd: event.midpoint.days(),
    }
}

fn scan_summary(
    result: &ScanResult,
    target: &Target,
    observer: &Observer,
    ephemeris: &Ephemeris,
    constraints: &[Constraint],
) -> export_summary::ScanSummary {
    let (outcome, next_event) = match &result.outcome {
        ScanOutcome::NoObservableEvent => (export_summary::OutcomeKind::NoObservableEvent, None),
        ScanOutcome::NextAfterWindow(event) => {
            (export_summary::OutcomeKind::NextAfterWindow, Some(event_times(event)))
        }
        ScanOutcome::Observable(_) => (export_summary::OutcomeKind::Observable, None),
    };
    export_summary::ScanSummary {
        target: target.name().to_string(),
        site: observer.name().to_string(),
        ra_deg: target.ra_deg(),
        dec_deg: target.dec_deg(),
        epoch_jd: ephemeris.reference_epoch().days(),
        period_days: ephemeris.period_days(),
        duration_days: ephemeris.duration_days(),
        coverage: result.mode.noun().to_string(),
        window_start_utc: result.window.start().format_iso(),
        window_end_utc: result.window.end().format_iso(),
        constraints: constraints.iter().map(ToString::to_string).collect(),
        generated: result.generated,
        outcome,
        events: result.events().iter().map(event_times).collect(),
        next_event,
    }
}
