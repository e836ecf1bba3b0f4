use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const SWMM_MODEL: &str = "\
[TITLE]
CLI fixture

[JUNCTIONS]
J1    10.0
J2    8.5

[CONDUITS]
C1    J1    J2    120.0    0.013
";

const SWMM_RPT: &str = "\
  Analysis begun on:  Tue Aug  4 10:00:00 2026

  ******************
  Node Depth Summary
  ******************
  ------------------------------------------------------
                                 Average  Maximum
  Node                 Type        Depth    Depth
  ------------------------------------------------------
  J1                   JUNCTION     0.10     0.50
";

fn hyd() -> Command {
    Command::cargo_bin("hyd").unwrap()
}

#[test]
fn summary_prints_counts() {
    let dir = tempdir().unwrap();
    let inp = dir.path().join("model.inp");
    std::fs::write(&inp, SWMM_MODEL).unwrap();

    hyd()
        .args(["summary", inp.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("junctions"))
        .stdout(predicate::str::contains("Dialect: swmm"));
}

#[test]
fn summary_json_mode() {
    let dir = tempdir().unwrap();
    let inp = dir.path().join("model.inp");
    std::fs::write(&inp, SWMM_MODEL).unwrap();

    hyd()
        .args(["summary", inp.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"junctions\": 2"));
}

#[test]
fn validate_reports_clean_model() {
    let dir = tempdir().unwrap();
    let inp = dir.path().join("model.inp");
    std::fs::write(&inp, SWMM_MODEL).unwrap();

    hyd()
        .args(["validate", inp.to_str().unwrap(), "--dialect", "swmm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid: true"));
}

#[test]
fn validate_fails_on_missing_file() {
    hyd()
        .args(["validate", "no_such_model.inp"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("valid: false"));
}

#[test]
fn convert_round_trips_file() {
    let dir = tempdir().unwrap();
    let inp = dir.path().join("model.inp");
    let out = dir.path().join("copy.inp");
    std::fs::write(&inp, SWMM_MODEL).unwrap();

    hyd()
        .args([
            "convert",
            inp.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let copied = std::fs::read_to_string(&out).unwrap();
    assert!(copied.contains("J1    10.0"));
    assert!(copied.contains("[CONDUITS]"));
}

#[test]
fn graph_stats_counts_components() {
    let dir = tempdir().unwrap();
    let inp = dir.path().join("model.inp");
    std::fs::write(&inp, SWMM_MODEL).unwrap();

    hyd()
        .args(["graph", "stats", inp.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes         : 2"))
        .stdout(predicate::str::contains("Components    : 1"));
}

#[test]
fn report_lists_tables_and_status() {
    let dir = tempdir().unwrap();
    let rpt = dir.path().join("results.rpt");
    std::fs::write(&rpt, SWMM_RPT).unwrap();

    hyd()
        .args(["report", rpt.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: success"))
        .stdout(predicate::str::contains("node depth summary"));
}

#[test]
fn report_table_csv_export() {
    let dir = tempdir().unwrap();
    let rpt = dir.path().join("results.rpt");
    let csv = dir.path().join("depths.csv");
    std::fs::write(&rpt, SWMM_RPT).unwrap();

    hyd()
        .args([
            "report",
            rpt.to_str().unwrap(),
            "--table",
            "node depth summary",
            "--csv",
            csv.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written = std::fs::read_to_string(&csv).unwrap();
    assert!(written.starts_with("node,"));
    assert!(written.contains("J1"));
}

#[test]
fn run_with_missing_engine_fails_cleanly() {
    let dir = tempdir().unwrap();
    let inp = dir.path().join("model.inp");
    std::fs::write(&inp, SWMM_MODEL).unwrap();

    hyd()
        .args([
            "run",
            inp.to_str().unwrap(),
            "--engine",
            "swmm",
            "--binary",
            "/nonexistent/runswmm",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("status: error"));
}
