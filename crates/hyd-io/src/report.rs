//! Read-only result tables extracted from RPT report files.
//!
//! Report data is owned exclusively by the extractor's output and is never
//! shared with the editable [`hyd_core::Document`] model: a report is a
//! record of a run, not a model to mutate.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use serde::Serialize;

use hyd_core::{Dialect, HydError, Value};

/// Simulation run status derived from a report (or from the engine runner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Warning,
    Error,
    NotRun,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Warning => "warning",
            RunStatus::Error => "error",
            RunStatus::NotRun => "not_run",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = HydError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(RunStatus::Success),
            "warning" => Ok(RunStatus::Warning),
            "error" => Ok(RunStatus::Error),
            "not_run" => Ok(RunStatus::NotRun),
            other => Err(HydError::Other(format!("unknown run status '{other}'"))),
        }
    }
}

/// A single named result table with typed columns.
#[derive(Debug, Clone, Serialize)]
pub struct ReportTable {
    pub label: String,
    pub columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ReportTable {
    pub fn new(label: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            label: label.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (record, column name), if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }
}

static EMPTY_TABLE: Lazy<ReportTable> = Lazy::new(|| ReportTable::new("", &[]));

/// All tables extracted from one report, plus warnings/errors and status.
#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    pub dialect: Dialect,
    tables: BTreeMap<String, ReportTable>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub analysis_begun: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_begun_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_ended_at: Option<NaiveDateTime>,
}

impl ReportBundle {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: BTreeMap::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            analysis_begun: false,
            analysis_begun_at: None,
            analysis_ended_at: None,
        }
    }

    /// Wall-clock duration of the engine run, when the report records both
    /// begin and end stamps.
    pub fn analysis_duration(&self) -> Option<chrono::Duration> {
        match (self.analysis_begun_at, self.analysis_ended_at) {
            (Some(begun), Some(ended)) => Some(ended - begun),
            _ => None,
        }
    }

    /// Table for a block label (lowercased, e.g. "node depth summary").
    ///
    /// Missing blocks yield an empty table; RPT files vary by which
    /// processes ran, so absence is not an error.
    pub fn table(&self, label: &str) -> &ReportTable {
        self.tables
            .get(&label.to_ascii_lowercase())
            .unwrap_or(&EMPTY_TABLE)
    }

    pub fn has_table(&self, label: &str) -> bool {
        self.tables.contains_key(&label.to_ascii_lowercase())
    }

    pub fn tables(&self) -> impl Iterator<Item = &ReportTable> {
        self.tables.values()
    }

    pub fn table_labels(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn insert_table(&mut self, table: ReportTable) {
        self.tables.insert(table.label.to_ascii_lowercase(), table);
    }

    pub fn take_table(&mut self, label: &str) -> Option<ReportTable> {
        self.tables.remove(&label.to_ascii_lowercase())
    }

    /// Overall status: an error block means failure regardless of tables.
    pub fn status(&self) -> RunStatus {
        if !self.errors.is_empty() {
            RunStatus::Error
        } else if !self.warnings.is_empty() {
            RunStatus::Warning
        } else if self.analysis_begun || !self.tables.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::NotRun
        }
    }

    pub fn was_successful(&self) -> bool {
        matches!(self.status(), RunStatus::Success | RunStatus::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_is_empty() {
        let bundle = ReportBundle::new(Dialect::Swmm);
        let table = bundle.table("link flow summary");
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_status_derivation() {
        let mut bundle = ReportBundle::new(Dialect::Swmm);
        assert_eq!(bundle.status(), RunStatus::NotRun);

        bundle.insert_table(ReportTable::new("Node Depth Summary", &["node"]));
        assert_eq!(bundle.status(), RunStatus::Success);

        bundle.warnings.push("WARNING 04: minimum elevation drop".into());
        assert_eq!(bundle.status(), RunStatus::Warning);
        assert!(bundle.was_successful());

        bundle.errors.push("ERROR 317: cannot open file".into());
        assert_eq!(bundle.status(), RunStatus::Error);
        assert!(!bundle.was_successful());
    }

    #[test]
    fn test_table_lookup_is_case_insensitive() {
        let mut bundle = ReportBundle::new(Dialect::Swmm);
        let mut table = ReportTable::new("Node Depth Summary", &["node", "average_depth"]);
        table.push_row(vec![Value::Text("J1".into()), Value::Real(0.15)]);
        bundle.insert_table(table);

        let found = bundle.table("Node Depth Summary");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found.value(0, "average_depth"),
            Some(&Value::Real(0.15))
        );
    }

    #[test]
    fn test_bundle_serializes() {
        let mut bundle = ReportBundle::new(Dialect::Swmm);
        bundle.insert_table(ReportTable::new("Node Depth Summary", &["node"]));
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("node depth summary"));
        assert!(json.contains("\"swmm\""));
    }

    #[test]
    fn test_run_status_round_trip() {
        for status in [
            RunStatus::Success,
            RunStatus::Warning,
            RunStatus::Error,
            RunStatus::NotRun,
        ] {
            assert_eq!(status.as_str().parse::<RunStatus>().unwrap(), status);
        }
    }
}
