//! RPT report extractor: banner-delimited result blocks → [`ReportBundle`].
//!
//! Parsing is block-oriented. SWMM reports delimit their summaries with
//! star banners; EPANET reports interleave time-stamped node/link result
//! tables. Each recognized block label maps to a fixed column set; blocks
//! with unknown labels (notes, disclaimers) are skipped. A missing expected
//! block is not fatal (reports vary by which processes ran), so absent
//! labels simply yield empty tables downstream.
//!
//! Extraction fails only when the text cannot be segmented at all (empty or
//! truncated to the point of carrying no report structure).

use hyd_core::{Dialect, HydError, HydResult, Value};

use crate::report::{ReportBundle, ReportTable};

/// Column sets per block label (lowercased).
static BLOCK_COLUMNS: &[(&str, &[&str])] = &[
    ("analysis options", &["option", "value"]),
    ("element count", &["element", "count"]),
    ("runoff quantity continuity", &["item", "volume", "depth"]),
    (
        "flow routing continuity",
        &["item", "volume_entering", "volume_leaving"],
    ),
    (
        "node depth summary",
        &[
            "node",
            "type",
            "average_depth",
            "maximum_depth",
            "maximum_hgl",
            "day_of_maximum",
            "time_of_maximum",
        ],
    ),
    (
        "node inflow summary",
        &[
            "node",
            "type",
            "maximum_lateral_inflow",
            "maximum_total_inflow",
            "day_of_maximum",
            "time_of_maximum",
            "lateral_inflow_volume",
            "total_inflow_volume",
        ],
    ),
    (
        "node surcharge summary",
        &[
            "node",
            "type",
            "hours_surcharged",
            "max_height_above_crown",
            "min_depth_below_rim",
        ],
    ),
    (
        "node flooding summary",
        &[
            "node",
            "hours_flooded",
            "maximum_rate",
            "day_of_maximum",
            "time_of_maximum",
            "total_flood_volume",
            "maximum_ponded_depth",
        ],
    ),
    (
        "link flow summary",
        &[
            "link",
            "type",
            "maximum_flow",
            "day_of_maximum",
            "time_of_maximum",
            "maximum_velocity",
            "max_over_full_flow",
            "max_over_full_depth",
        ],
    ),
    (
        "conduit surcharge summary",
        &[
            "conduit",
            "hours_full_both_ends",
            "hours_full_upstream",
            "hours_full_downstream",
            "hours_above_normal_flow",
            "hours_capacity_limited",
        ],
    ),
    (
        "pumping summary",
        &[
            "pump",
            "percent_utilized",
            "number_of_startups",
            "min_flow",
            "avg_flow",
            "max_flow",
            "total_volume",
            "power_usage",
            "percent_time_off_low",
            "percent_time_off_high",
        ],
    ),
    (
        "subcatchment runoff summary",
        &[
            "subcatchment",
            "total_precip",
            "total_runon",
            "total_evap",
            "total_infil",
            "total_runoff_depth",
            "total_runoff_volume",
            "peak_runoff",
            "runoff_coeff",
        ],
    ),
];

const EPANET_NODE_COLUMNS: &[&str] = &["time", "node", "demand", "head", "pressure", "quality"];
const EPANET_LINK_COLUMNS: &[&str] = &["time", "link", "flow", "velocity", "headloss", "status"];

fn block_columns(label: &str) -> Option<&'static [&'static str]> {
    BLOCK_COLUMNS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, columns)| *columns)
}

/// Labels whose blocks are `item ..... value value` settings, not tables.
fn is_dotted_block(label: &str) -> bool {
    matches!(
        label,
        "analysis options"
            | "element count"
            | "runoff quantity continuity"
            | "flow routing continuity"
    )
}

/// Extract all recognized blocks from report text.
pub fn extract_report(text: &str, dialect: Dialect) -> HydResult<ReportBundle> {
    if text.trim().is_empty() {
        return Err(HydError::Parse("empty report text".into()));
    }

    let mut bundle = ReportBundle::new(dialect);
    bundle.analysis_begun = text.contains("Analysis begun");

    for line in text.lines() {
        let trimmed = line.trim();
        let upper = trimmed.to_ascii_uppercase();
        if upper.starts_with("WARNING") {
            bundle.warnings.push(trimmed.to_string());
        } else if upper.starts_with("ERROR") {
            bundle.errors.push(trimmed.to_string());
        } else if let Some(rest) = trimmed.strip_prefix("Analysis begun on:") {
            bundle.analysis_begun_at = parse_report_timestamp(rest);
        } else if let Some(rest) = trimmed.strip_prefix("Analysis ended on:") {
            bundle.analysis_ended_at = parse_report_timestamp(rest);
        }
    }

    let lines: Vec<&str> = text.lines().collect();
    let mut segmented = false;
    let mut i = 0;
    while i < lines.len() {
        if is_banner(lines[i]) {
            let Some((label, content_start)) = read_banner_block(&lines, i) else {
                // Opening banner with no close: truncated mid-write.
                break;
            };
            segmented = true;
            let end = content_end(&lines, content_start);
            if let Some(columns) = block_columns(&label) {
                let table = if is_dotted_block(&label) {
                    parse_dotted_block(&label, columns, &lines[content_start..end])
                } else {
                    parse_table_block(&label, columns, &lines[content_start..end])
                };
                bundle.insert_table(table);
            }
            i = end;
        } else if let Some(time) = time_block_header(lines[i], "Node Results") {
            let (rows, next) = parse_epanet_rows(&lines, i + 1, &time);
            append_time_rows(&mut bundle, "node results", EPANET_NODE_COLUMNS, rows);
            segmented = true;
            i = next;
        } else if let Some(time) = time_block_header(lines[i], "Link Results") {
            let (rows, next) = parse_epanet_rows(&lines, i + 1, &time);
            append_time_rows(&mut bundle, "link results", EPANET_LINK_COLUMNS, rows);
            segmented = true;
            i = next;
        } else {
            i += 1;
        }
    }

    if !segmented
        && !bundle.analysis_begun
        && bundle.warnings.is_empty()
        && bundle.errors.is_empty()
    {
        return Err(HydError::Parse(
            "unable to segment report text (no banners, result tables or status lines)".into(),
        ));
    }
    Ok(bundle)
}

fn is_banner(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 4 && trimmed.chars().all(|c| c == '*')
}

fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 4 && trimmed.chars().all(|c| c == '-' || c == '=')
}

/// Read a `***` / label / `***` banner starting at `open`.
///
/// Returns the lowercased label and the index of the first content line
/// (just past the closing banner).
fn read_banner_block(lines: &[&str], open: usize) -> Option<(String, usize)> {
    let mut label_parts = Vec::new();
    let mut j = open + 1;
    while j < lines.len() && !is_banner(lines[j]) {
        let part = lines[j].trim();
        if !part.is_empty() {
            label_parts.push(part);
        }
        j += 1;
    }
    if j >= lines.len() {
        return None;
    }
    let label = label_parts.join(" ").to_ascii_lowercase();
    Some((label, j + 1))
}

/// Content of a block runs until the next banner or end of text.
fn content_end(lines: &[&str], start: usize) -> usize {
    let mut k = start;
    while k < lines.len() && !is_banner(lines[k]) {
        k += 1;
    }
    k
}

/// `Total Precipitation ......  1.234  0.456` style settings lines.
fn parse_dotted_block(label: &str, columns: &[&str], content: &[&str]) -> ReportTable {
    let mut table = ReportTable::new(label, columns);
    for line in content {
        let Some(pos) = line.find("..") else { continue };
        let item = line[..pos].trim_end_matches('.').trim();
        if item.is_empty() {
            continue;
        }
        let mut row = vec![Value::Text(item.to_string())];
        for token in line[pos..].trim_start_matches('.').split_whitespace() {
            row.push(coerce_cell(token));
        }
        table.push_row(row);
    }
    table
}

/// Whitespace-delimited table rows between the column-header rules.
fn parse_table_block(label: &str, columns: &[&str], content: &[&str]) -> ReportTable {
    let mut table = ReportTable::new(label, columns);

    // Column headers sit between the first two horizontal rules; data
    // follows the second rule. Tables without rules fall back to treating
    // every plausible line as data.
    let rules: Vec<usize> = content
        .iter()
        .enumerate()
        .filter(|(_, l)| is_rule(l))
        .map(|(idx, _)| idx)
        .collect();
    let data_start = if rules.len() >= 2 { rules[1] + 1 } else { 0 };

    for line in &content[data_start..] {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_rule(line) {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < 2 {
            continue;
        }
        // A data row carries at least one numeric cell; header fragments
        // that survive the rule heuristic do not.
        if !tokens.iter().any(|t| t.parse::<f64>().is_ok()) {
            continue;
        }
        table.push_row(tokens.into_iter().map(coerce_cell).collect());
    }
    table
}

/// Extract the elapsed-time token from `Node Results at 0:00 hrs:`.
fn time_block_header(line: &str, kind: &str) -> Option<String> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix(kind)?;
    let rest = rest.trim_start().strip_prefix("at")?;
    let time = rest.trim().trim_end_matches(':').trim_end_matches("hrs");
    Some(time.trim().to_string())
}

/// Data rows of an EPANET time block, each prefixed with the elapsed time.
fn parse_epanet_rows(lines: &[&str], start: usize, time: &str) -> (Vec<Vec<Value>>, usize) {
    let mut rows = Vec::new();
    let mut k = start;
    let mut rules_seen = 0;
    while k < lines.len() {
        let trimmed = lines[k].trim();
        if is_banner(lines[k]) || time_block_header(lines[k], "Node Results").is_some()
            || time_block_header(lines[k], "Link Results").is_some()
        {
            break;
        }
        if is_rule(lines[k]) {
            rules_seen += 1;
            k += 1;
            continue;
        }
        if trimmed.is_empty() {
            // A blank after the data region ends the block.
            if rules_seen >= 2 && !rows.is_empty() {
                break;
            }
            k += 1;
            continue;
        }
        if rules_seen >= 2 {
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if tokens.len() >= 2 {
                let mut row = vec![Value::Text(time.to_string())];
                row.extend(tokens.into_iter().map(coerce_cell));
                rows.push(row);
            }
        }
        k += 1;
    }
    (rows, k)
}

fn append_time_rows(
    bundle: &mut ReportBundle,
    label: &str,
    columns: &[&str],
    rows: Vec<Vec<Value>>,
) {
    let mut table = bundle
        .take_table(label)
        .unwrap_or_else(|| ReportTable::new(label, columns));
    for row in rows {
        table.push_row(row);
    }
    bundle.insert_table(table);
}

/// ctime-style stamp both engines print: `Tue Aug  4 10:00:00 2026`.
fn parse_report_timestamp(text: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(text.trim(), "%a %b %e %H:%M:%S %Y").ok()
}

fn coerce_cell(token: &str) -> Value {
    if let Ok(v) = token.parse::<i64>() {
        Value::Int(v)
    } else if let Ok(v) = token.parse::<f64>() {
        Value::Real(v)
    } else {
        Value::Text(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RunStatus;

    const SWMM_RPT: &str = "\
  Analysis begun on:  Tue Aug  4 10:00:00 2026

  ******************
  Node Depth Summary
  ******************

  ---------------------------------------------------------------------------------
                                 Average  Maximum  Maximum  Time of Max
  Node                 Type        Depth    Depth      HGL   Occurrence
  ---------------------------------------------------------------------------------
  J1                   JUNCTION     0.10     0.50    10.50     0  01:30
  J2                   JUNCTION     0.08     0.42     8.92     0  01:45

  ***************************
  Flow Routing Continuity
  ***************************
  Dry Weather Inflow .......         0.000         0.000
  Wet Weather Inflow .......         1.234         0.402
";

    #[test]
    fn test_extract_swmm_summaries() {
        let bundle = extract_report(SWMM_RPT, Dialect::Swmm).unwrap();
        let depths = bundle.table("node depth summary");
        assert_eq!(depths.len(), 2);
        assert_eq!(depths.value(0, "node"), Some(&Value::Text("J1".into())));
        assert_eq!(depths.value(0, "average_depth"), Some(&Value::Real(0.1)));

        let continuity = bundle.table("flow routing continuity");
        assert_eq!(continuity.len(), 2);
        assert_eq!(
            continuity.value(1, "item"),
            Some(&Value::Text("Wet Weather Inflow".into()))
        );
    }

    #[test]
    fn test_missing_block_yields_empty_table_and_success() {
        let bundle = extract_report(SWMM_RPT, Dialect::Swmm).unwrap();
        assert!(bundle.table("link flow summary").is_empty());
        assert!(!bundle.has_table("link flow summary"));
        assert_eq!(bundle.status(), RunStatus::Success);
    }

    #[test]
    fn test_error_block_fails_run() {
        let text = format!("{SWMM_RPT}\n  ERROR 317: cannot open rainfall data file.\n");
        let bundle = extract_report(&text, Dialect::Swmm).unwrap();
        assert_eq!(bundle.errors.len(), 1);
        assert_eq!(bundle.status(), RunStatus::Error);
    }

    #[test]
    fn test_analysis_timestamps_parsed() {
        let text = format!("{SWMM_RPT}\n  Analysis ended on:  Tue Aug  4 10:00:02 2026\n");
        let bundle = extract_report(&text, Dialect::Swmm).unwrap();
        assert!(bundle.analysis_begun_at.is_some());
        let duration = bundle.analysis_duration().unwrap();
        assert_eq!(duration.num_seconds(), 2);
    }

    #[test]
    fn test_warnings_collected() {
        let text = format!("  WARNING 04: minimum elevation drop used\n{SWMM_RPT}");
        let bundle = extract_report(&text, Dialect::Swmm).unwrap();
        assert_eq!(bundle.warnings.len(), 1);
        assert_eq!(bundle.status(), RunStatus::Warning);
    }

    #[test]
    fn test_unsegmentable_text_is_fatal() {
        assert!(extract_report("", Dialect::Swmm).is_err());
        assert!(extract_report("random words\nno structure here\n", Dialect::Swmm).is_err());
    }

    #[test]
    fn test_epanet_time_blocks_merge() {
        let text = "\
  Node Results at 0:00 hrs:
  ----------------------------------------------------
  Node                Demand      Head  Pressure
  ID                     GPM        ft       psi
  ----------------------------------------------------
  J1                   12.00    100.00     43.30

  Node Results at 1:00 hrs:
  ----------------------------------------------------
  Node                Demand      Head  Pressure
  ID                     GPM        ft       psi
  ----------------------------------------------------
  J1                   14.00     99.10     42.80
";
        let bundle = extract_report(text, Dialect::Epanet).unwrap();
        let nodes = bundle.table("node results");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes.value(0, "time"), Some(&Value::Text("0:00".into())));
        assert_eq!(nodes.value(1, "demand"), Some(&Value::Real(14.0)));
    }

    #[test]
    fn test_unknown_banner_label_skipped() {
        let text = "\
  ****************
  NOTE: statistics are approximate
  ****************
  some prose that is not a table
";
        let bundle = extract_report(text, Dialect::Swmm).unwrap();
        assert_eq!(bundle.tables().count(), 0);
        assert_eq!(bundle.status(), RunStatus::NotRun);
    }
}
