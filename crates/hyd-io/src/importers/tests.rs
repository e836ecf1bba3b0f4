use super::*;
use crate::exporters::render;
use crate::report::RunStatus;
use hyd_core::{Dialect, Value};
use std::io::Write;
use tempfile::tempdir;

const SWMM_MODEL: &str = "\
[TITLE]
Round-trip fixture

[OPTIONS]
FLOW_UNITS           CFS
INFILTRATION         HORTON
FLOW_ROUTING         KINWAVE

[JUNCTIONS]
;;Name           Elevation  MaxDepth   InitDepth
J1               10.0       0.0        0.0
J2               8.5        0.0        0.0

[OUTFALLS]
O1               5.0        FREE

[CONDUITS]
;;Name           From       To         Length     Roughness
C1               J1         J2         120.0      0.013
C2               J2         O1         95.0       0.013

[XSECTIONS]
C1               CIRCULAR   1.0
C2               CIRCULAR   1.0

[TIMESERIES]
TS1              0:00       0.0
TS1              1:00       0.25
TS1              2:00       0.0
";

/// The documented whitespace-normalization set for round-trip comparison:
/// per-line trailing whitespace and trailing blank lines.
fn normalize(text: &str) -> String {
    let mut out: Vec<&str> = text.lines().map(|l| l.trim_end()).collect();
    while out.last() == Some(&"") {
        out.pop();
    }
    out.join("\n")
}

#[test]
fn round_trip_is_identity_modulo_normalization() {
    let doc = parse_inp_str(SWMM_MODEL, Dialect::Swmm).unwrap();
    assert!(!doc.diagnostics().has_errors());
    let rendered = render(&doc);
    assert_eq!(normalize(&rendered), normalize(SWMM_MODEL));
}

#[test]
fn render_build_render_is_a_fixed_point() {
    let doc = parse_inp_str(SWMM_MODEL, Dialect::Swmm).unwrap();
    let once = render(&doc);
    let twice = render(&parse_inp_str(&once, Dialect::Swmm).unwrap());
    assert_eq!(once, twice);
}

#[test]
fn unknown_section_survives_byte_identical() {
    let text = "\
[JUNCTIONS]
J1               10.0

[LID_CONTROLS]
LC1              BC
LC1              SURFACE    6    0.3   0.1
;; vendor-specific continuation kept as-is
LC1              STORAGE    12   0.75

[CONDUITS]
C1               J1         J2   100   0.013

";
    let doc = parse_inp_str(text, Dialect::Swmm).unwrap();
    assert!(doc.section("LID_CONTROLS").unwrap().is_opaque());
    assert_eq!(render(&doc), text);
}

#[test]
fn scenario_junctions_and_options() {
    let text = "[JUNCTIONS]\nJ1  10.0  0.0\n\n[OPTIONS]\nFLOW_UNITS  CFS\n";
    let doc = parse_inp_str(text, Dialect::Swmm).unwrap();
    assert_eq!(doc.summary().counts["junctions"], 1);
    assert_eq!(doc.rows("JUNCTIONS")[0].get_f64("elevation"), Some(10.0));
    assert_eq!(
        doc.row("OPTIONS", "FLOW_UNITS").unwrap().get_str("value"),
        Some("CFS")
    );
}

#[test]
fn scenario_duplicate_junction_diagnostic() {
    let text = "[JUNCTIONS]\nJ1  10.0\nJ1  12.5\n";
    let doc = parse_inp_str(text, Dialect::Swmm).unwrap();
    assert_eq!(doc.diagnostics().category_count("duplicate-key"), 1);
    assert_eq!(doc.rows("JUNCTIONS").len(), 1);
    assert_eq!(doc.rows("JUNCTIONS")[0].get_f64("elevation"), Some(12.5));
}

#[test]
fn scenario_rpt_missing_block_is_empty_and_successful() {
    let text = "\
  ******************
  Node Depth Summary
  ******************
  -----------------------------------------------------------------
                                 Average  Maximum  Maximum
  Node                 Type        Depth    Depth      HGL
  -----------------------------------------------------------------
  J1                   JUNCTION     0.10     0.50    10.50
";
    let bundle = parse_rpt_str(text, Dialect::Swmm).unwrap();
    assert_eq!(bundle.table("node depth summary").len(), 1);
    assert!(bundle.table("link flow summary").is_empty());
    assert_eq!(bundle.status(), RunStatus::Success);
}

#[test]
fn epanet_model_parses_with_pipe_references() {
    let text = "\
[JUNCTIONS]
J1               100.0      5.0
J2               95.0       3.0

[RESERVOIRS]
R1               120.0

[PIPES]
P1               R1         J1   1200   12   100
P2               J1         J2   800    10   100

[OPTIONS]
UNITS            GPM
";
    let doc = parse_inp_str(text, Dialect::Epanet).unwrap();
    assert_eq!(doc.summary().counts["pipes"], 2);
    assert_eq!(doc.summary().counts["reservoirs"], 1);
    assert!(!doc.diagnostics().has_issues());
    assert_eq!(doc.row("PIPES", "P1").unwrap().get_str("node1"), Some("R1"));
}

#[test]
fn mutate_then_render_mixes_raw_and_canonical() {
    let mut doc = parse_inp_str(SWMM_MODEL, Dialect::Swmm).unwrap();
    doc.update_row("JUNCTIONS", "J2", &[("elevation".into(), Value::Real(8.75))])
        .unwrap();
    let rendered = render(&doc);
    // Untouched row keeps its original formatting; edited row is canonical.
    assert!(rendered.contains("J1               10.0       0.0        0.0"));
    assert!(!rendered.contains("8.5"));
    assert!(rendered.contains("8.75"));
}

#[test]
fn parse_from_disk_records_source_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.inp");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(SWMM_MODEL.as_bytes()).unwrap();

    let doc = parse_inp(&path, Dialect::Swmm).unwrap();
    assert_eq!(doc.source_path(), Some(path.as_path()));
    assert_eq!(doc.summary().file.as_deref(), path.to_str());
}

#[test]
fn auto_detection_picks_swmm() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.inp");
    std::fs::write(&path, SWMM_MODEL).unwrap();
    let doc = parse_inp_auto(&path).unwrap();
    assert_eq!(doc.dialect(), Dialect::Swmm);
}

#[test]
fn invalid_utf8_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.inp");
    std::fs::write(&path, [0x5b, 0x4a, 0xff, 0xfe, 0x5d]).unwrap();
    let err = parse_inp(&path, Dialect::Swmm).unwrap_err();
    assert!(matches!(err, hyd_core::HydError::Parse(_)));
}
