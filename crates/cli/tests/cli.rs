use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const TOI_CSV: &str = "\
TIC ID,TOI,TFOPWG Disposition,RA,Dec,Stellar Distance (pc),Epoch (BJD),Period (days),Duration (hours),Planet Radius (R_Earth),Depth (ppm),TESS Mag,Comments
100,500.01,PC,05:34:31.94,+22:00:52.2,120.5,2458842.0,3.5,2.4,2.2,1500,9.5,
200,600.01,FP,10:00:00.00,-10:30:00.0,,2458900.0,1.5,2.0,12.0,5000,8.0,
300,700.01,PC,12:00:00.00,+45:00:00.0,,2458900.0,0,1.0,1.0,300,12.0,
400,450.01,KP,01:00:00.00,+30:00:00.0,,2458800.0,2.0,3.0,14.0,8000,9.0,WASP-1 b
";

const CTOI_CSV: &str = "\
TIC ID,CTOI,User Disposition,RA,Dec,Midpoint (BJD),Period (days),Duration (hrs)
900,900.01,PC,150.25,-30.5,2459000.25,12.0,4.8
";

// A clock band with equal ends accepts every instant.
const UNRESTRICTED: &str = "\
[[constraints]]
type = \"local_time\"
start = \"00:00\"
end = \"00:00\"
";

fn write_unrestricted(dir: &Path) -> String {
    let path = dir.join("scan.toml");
    fs::write(&path, UNRESTRICTED).unwrap();
    path.to_str().unwrap().to_string()
}

fn write_catalogs(dir: &Path) {
    fs::write(dir.join("TOIs.csv"), TOI_CSV).unwrap();
    fs::write(dir.join("CTOIs.csv"), CTOI_CSV).unwrap();
}

fn sample_args(settings: &str) -> Vec<String> {
    [
        "--ra", "83.633083", "--dec", "22.0145", "--name", "sample", "--t0", "2458842.0",
        "--period", "3.5", "--duration", "0.1", "--site", "OAO", "--start-date", "2019-12-24",
        "--start-time", "12:00", "--end-date", "2020-01-07", "--end-time", "12:00", "--settings",
        settings,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn transit_reports_events_and_writes_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = write_unrestricted(dir.path());
    let csv_path = dir.path().join("out/sample_OAO.csv");

    Command::cargo_bin("transit")
        .expect("transit bin")
        .args(sample_args(&settings))
        .args(["--output", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "sample: 5 observable transit midpoints from OAO between 2019-12-24 12:00:00.000 & 2020-01-07 12:00:00.000",
        ));

    let table = fs::read_to_string(&csv_path).expect("event table");
    let lines: Vec<_> = table.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "cycle,ingress,midtransit,egress,ingress_jd,midtransit_jd,egress_jd");
    assert!(lines[1].starts_with("0,"));
    assert!(lines[5].starts_with("4,"));

    let summary = fs::read_to_string(dir.path().join("out/sample_OAO_summary.json")).expect("summary");
    assert!(summary.contains("\"outcome\": \"observable\""));
    assert!(summary.contains("\"coverage\": \"transit midpoint\""));
}

#[test]
fn transit_streams_event_table_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = write_unrestricted(dir.path());

    Command::cargo_bin("transit")
        .expect("transit bin")
        .args(sample_args(&settings))
        .args(["--output", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "cycle,ingress,midtransit,egress,ingress_jd,midtransit_jd,egress_jd",
        ))
        .stdout(predicate::str::contains(
            "2,2019-12-31 10:48:00.000,2019-12-31 12:00:00.000,2019-12-31 13:12:00.000,",
        ));
}

#[test]
fn transit_reports_nothing_for_a_target_that_never_rises() {
    Command::cargo_bin("transit")
        .expect("transit bin")
        .args([
            "--ra", "120", "--dec", "-80", "--name", "south", "--t0", "2458842.0", "--period", "3.5",
            "--duration", "0.1", "--site", "OAO", "--start-date", "2019-12-24", "--end-date",
            "2020-02-20", "-n", "40",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "south: No observable transit midpoint from OAO between 2019-12-24 19:00:00.000 & 2020-02-20 06:00:00.000",
        ));
}

#[test]
fn transit_rejects_incomplete_sites() {
    Command::cargo_bin("transit")
        .expect("transit bin")
        .args([
            "--ra", "10", "--dec", "10", "--t0", "2458842.0", "--period", "3.5", "--duration", "0.1",
            "--lat", "10", "--lon", "20", "--start-date", "2019-12-24", "--end-date", "2019-12-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing its elevation"));

    Command::cargo_bin("transit")
        .expect("transit bin")
        .args([
            "--ra", "10", "--dec", "10", "--t0", "2458842.0", "--period", "3.5", "--duration", "0.1",
            "--site", "XYZ", "--start-date", "2019-12-24", "--end-date", "2019-12-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown site `XYZ`"));
}

#[test]
fn transit_rejects_missing_ephemeris_values() {
    Command::cargo_bin("transit")
        .expect("transit bin")
        .args([
            "--ra", "10", "--dec", "10", "--t0", "2458842.0", "--period", "3.5", "--site", "OAO",
            "--start-date", "2019-12-24", "--end-date", "2019-12-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid ephemeris"));
}

#[test]
fn transit_reads_ephemeris_and_coordinates_from_cached_catalog() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_catalogs(dir.path());
    let settings = write_unrestricted(dir.path());

    Command::cargo_bin("transit")
        .expect("transit bin")
        .args([
            "toi500",
            "--offline",
            "--cache-dir",
            dir.path().to_str().unwrap(),
            "--site",
            "OAO",
            "--start-date",
            "2019-12-24",
            "--start-time",
            "12:00",
            "--end-date",
            "2020-01-07",
            "--end-time",
            "12:00",
            "--settings",
            &settings,
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "TOI-500.01: 5 observable transit midpoints from OAO",
        ));
}

#[test]
fn transit_renders_altitude_chart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = write_unrestricted(dir.path());
    let png_path = dir.path().join("plots/sample.png");

    Command::cargo_bin("transit")
        .expect("transit bin")
        .args(sample_args(&settings))
        .args([
            "--plot",
            png_path.to_str().unwrap(),
            "--plot-width",
            "400",
            "--plot-height",
            "300",
        ])
        .assert()
        .success();

    let metadata = fs::metadata(png_path).expect("png metadata");
    assert!(metadata.len() > 0, "PNG output should not be empty");
}

#[test]
fn fetch_catalog_keeps_existing_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_catalogs(dir.path());

    Command::cargo_bin("fetch_catalog")
        .expect("fetch_catalog bin")
        .args(["ctoi", "--cache-dir", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[cached]"))
        .stdout(predicate::str::contains("CTOIs.csv (1 rows)"));
}

#[test]
fn toi_filter_prints_selected_candidates() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_catalogs(dir.path());
    let cache = dir.path().to_str().unwrap();

    Command::cargo_bin("toi_filter")
        .expect("toi_filter bin")
        .args(["--offline", "--cache-dir", cache])
        .assert()
        .success()
        .stdout(predicate::str::contains("Period (days)"))
        .stdout(predicate::str::contains("450.01"))
        .stdout(predicate::str::contains("500.01"))
        .stdout(predicate::str::contains("600.01").not())
        .stdout(predicate::str::contains("700.01").not());

    Command::cargo_bin("toi_filter")
        .expect("toi_filter bin")
        .args(["--offline", "--cache-dir", cache, "--where", "Depth (ppm)>2000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("450.01"))
        .stdout(predicate::str::contains("500.01").not());
}

#[test]
fn toi_filter_saves_id_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_catalogs(dir.path());
    let outdir = dir.path().join("lists");

    Command::cargo_bin("toi_filter")
        .expect("toi_filter bin")
        .args([
            "--offline",
            "--cache-dir",
            dir.path().to_str().unwrap(),
            "--preset",
            "bright",
            "--remove-known",
            "--save",
            "--outdir",
            outdir.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Saved:"));

    let list = fs::read_to_string(outdir.join("name_tois.txt")).expect("id list");
    assert_eq!(list, "500.01\n");
}

#[test]
fn merge_predictions_combines_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("toi500.01_OAO.csv"), "cycle,midtransit\n0,a\n1,b\n").unwrap();
    fs::write(dir.path().join("wasp12_OAO.csv"), "cycle,midtransit\n3,c\n").unwrap();
    let input = dir.path().to_str().unwrap();

    Command::cargo_bin("merge_predictions")
        .expect("merge_predictions bin")
        .args(["--input-dir", input])
        .assert()
        .success()
        .stdout("name,cycle,midtransit\ntoi500.01,0,a\ntoi500.01,1,b\nwasp12,3,c\n");

    Command::cargo_bin("merge_predictions")
        .expect("merge_predictions bin")
        .args(["--input-dir", input, "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 rows from 2 files"));
    let merged = fs::read_to_string(dir.path().join("merged.csv")).expect("merged");
    assert!(merged.starts_with("name,cycle,midtransit\n"));

    // A second save must not fold the previous output back in.
    Command::cargo_bin("merge_predictions")
        .expect("merge_predictions bin")
        .args(["--input-dir", input, "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 rows from 2 files"));
}

#[test]
fn merge_predictions_fails_on_empty_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    Command::cargo_bin("merge_predictions")
        .expect("merge_predictions bin")
        .args(["--input-dir", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no .csv files found"));
}
