use transit_planner::config::{ScanSettings, SiteRegistry, load_ephemerides, load_settings, load_sites};
use transit_planner::engine::records::{ephemeris_from_record, from_settings};
use transit_planner::engine::site::{SiteRequest, resolve};
use transit_planner::engine::{
    JulianDate, ObservationWindow, Probe, ScanOutcome, ScanRequest, Target, is_observable, scan,
};
use transit_planner::export::events;

#[test]
fn version_is_exposed() {
    assert_eq!(transit_planner::version(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn bundled_sites_extend_the_registry() {
    let sites = load_sites("data/sites.yaml").expect("sites yaml");
    assert_eq!(sites.len(), 3);
    let mut registry = SiteRegistry::builtin();
    let builtin = registry.len();
    registry.extend(sites);
    assert_eq!(registry.len(), builtin + 3);

    let palma = resolve(&registry, &SiteRequest::code("LAPALMA")).expect("La Palma");
    assert_eq!(palma.name(), "LAPALMA");
    assert_eq!(palma.timezone().name(), "Atlantic/Canary");
    assert!(palma.location().longitude_deg < 0.0);
}

#[test]
fn bundled_ephemerides_apply_time_system_offsets() {
    let records = load_ephemerides("data/ephemerides").expect("ephemeris records");
    assert_eq!(records.len(), 2);
    let toi270 = ephemeris_from_record(&records[0], "unnamed").expect("TOI-270 c");
    assert_eq!(toi270.label(), "TOI-270 c");
    assert!((toi270.reference_epoch().days() - 2_458_461.009_2).abs() < 1e-9);
    assert!((toi270.duration_days() - 2.148 / 24.0).abs() < 1e-12);
}

#[test]
fn bundled_settings_match_the_defaults() {
    let settings = load_settings("data/scan.toml").expect("scan settings");
    assert_eq!(settings, ScanSettings::default());
    let (constraints, options) = from_settings(&settings).expect("constraints");
    assert_eq!(constraints.len(), 4);
    assert_eq!(options.n_events(), 100);
}

#[test]
fn wasp12_from_la_palma_end_to_end() {
    let mut registry = SiteRegistry::builtin();
    registry.extend(load_sites("data/sites.yaml").expect("sites yaml"));
    let observer = resolve(&registry, &SiteRequest::code("LAPALMA")).expect("site");
    let records = load_ephemerides("data/ephemerides").expect("records");
    let ephemeris = ephemeris_from_record(&records[1], "unnamed").expect("WASP-12 b");
    let target = Target::new("WASP-12", 97.636_4, 29.672_3).expect("target");
    let (constraints, options) =
        from_settings(&load_settings("data/scan.toml").expect("settings")).expect("constraints");
    let window = ObservationWindow::new(
        JulianDate::parse_date_time("2024-01-01", Some("19:00")).unwrap(),
        JulianDate::parse_date_time("2024-02-01", Some("06:00")).unwrap(),
    )
    .expect("window");

    let result = scan(&ScanRequest {
        ephemeris: &ephemeris,
        observer: &observer,
        target: &target,
        constraints: &constraints,
        window,
        options,
    });
    let ScanOutcome::Observable(found) = &result.outcome else {
        panic!("expected observable transits, got {:?}", result.outcome);
    };
    assert!(!found.is_empty());
    assert!(found.windows(2).all(|w| w[0].cycle < w[1].cycle));

    let probes: Vec<_> = found.iter().map(|e| Probe::At(e.midpoint)).collect();
    let flags = is_observable(&constraints, &observer, &target, &probes);
    assert!(flags.iter().all(|ok| *ok));
    assert!(found.iter().all(|e| window.contains(e.midpoint)));

    let summary = result.summary(target.name(), observer.name());
    let mut lines = summary.lines();
    assert_eq!(
        lines.next().unwrap(),
        format!(
            "WASP-12: {} observable transit midpoints from LAPALMA between 2024-01-01 19:00:00.000 & 2024-02-01 06:00:00.000",
            found.len()
        )
    );
    assert_eq!(lines.count(), found.len());

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wasp12_LAPALMA.csv");
    {
        let mut writer = events::writer_for_path(&path).expect("writer");
        events::write_header(&mut writer).unwrap();
        for event in found {
            let (ingress, mid, egress) = (
                event.ingress.format_iso(),
                event.midpoint.format_iso(),
                event.egress.format_iso(),
            );
            events::Record {
                cycle: event.cycle,
                ingress_utc: &ingress,
                midtransit_utc: &mid,
                egress_utc: &egress,
                ingress_jd: event.ingress.days(),
                midtransit_jd: event.midpoint.days(),
                egress_jd: event.egress.days(),
            }
            .write_to(&mut writer)
            .unwrap();
        }
    }

    let mut reader = csv::Reader::from_path(&path).expect("csv");
    assert_eq!(reader.headers().unwrap().len(), 7);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), found.len());
    for (row, event) in rows.iter().zip(found) {
        let mid_jd: f64 = row[5].parse().unwrap();
        assert!((mid_jd - event.midpoint.days()).abs() < 1e-6);
        let span: f64 = row[6].parse::<f64>().unwrap() - row[4].parse::<f64>().unwrap();
        assert!((span - 3.0 / 24.0).abs() < 1e-5);
    }
}
