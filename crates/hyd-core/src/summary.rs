//! Model summaries: per-element counts plus aggregate diagnostics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::document::Document;
use crate::schema;
use crate::Dialect;

/// Summary of a loaded model, shaped for display and JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub dialect: Dialect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub counts: BTreeMap<String, usize>,
    pub warnings: usize,
    pub errors: usize,
}

/// (summary key, section name) pairs counted per dialect.
const EPANET_COUNTED: &[(&str, &str)] = &[
    ("junctions", "JUNCTIONS"),
    ("tanks", "TANKS"),
    ("reservoirs", "RESERVOIRS"),
    ("pipes", "PIPES"),
    ("pumps", "PUMPS"),
    ("valves", "VALVES"),
    ("patterns", "PATTERNS"),
    ("curves", "CURVES"),
];

const SWMM_COUNTED: &[(&str, &str)] = &[
    ("junctions", "JUNCTIONS"),
    ("outfalls", "OUTFALLS"),
    ("storage", "STORAGE"),
    ("dividers", "DIVIDERS"),
    ("conduits", "CONDUITS"),
    ("pumps", "PUMPS"),
    ("orifices", "ORIFICES"),
    ("weirs", "WEIRS"),
    ("outlets", "OUTLETS"),
    ("subcatchments", "SUBCATCHMENTS"),
    ("raingages", "RAINGAGES"),
    ("curves", "CURVES"),
    ("timeseries", "TIMESERIES"),
    ("patterns", "PATTERNS"),
];

fn counted(dialect: Dialect) -> &'static [(&'static str, &'static str)] {
    match dialect {
        Dialect::Epanet => EPANET_COUNTED,
        Dialect::Swmm => SWMM_COUNTED,
    }
}

/// Build a [`ModelSummary`] for a document.
pub fn summarize(doc: &Document) -> ModelSummary {
    let mut counts = BTreeMap::new();
    for (label, section_name) in counted(doc.dialect()) {
        let count = match doc.section(section_name) {
            Some(section) => {
                let keyed = schema::schema_for(doc.dialect(), section_name)
                    .map(|s| s.primary_key().is_some())
                    .unwrap_or(false);
                if keyed {
                    section.rows().len()
                } else {
                    // Patterns/curves/series span several rows per object.
                    section.distinct_names()
                }
            }
            None => 0,
        };
        counts.insert((*label).to_string(), count);
    }

    let title = doc.section("TITLE").and_then(|s| {
        s.raw_lines()
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty() && !l.starts_with(';'))
            .map(str::to_string)
    });

    ModelSummary {
        file: doc
            .source_path()
            .map(|p| p.to_string_lossy().into_owned()),
        dialect: doc.dialect(),
        title,
        counts,
        warnings: doc.diagnostics().warning_count(),
        errors: doc.diagnostics().error_count(),
    }
}

impl Document {
    /// Counts per element kind plus aggregate diagnostics.
    pub fn summary(&self) -> ModelSummary {
        summarize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Row, Value};

    #[test]
    fn test_empty_model_counts() {
        let doc = Document::empty(Dialect::Swmm);
        let summary = doc.summary();
        assert_eq!(summary.counts["junctions"], 0);
        assert_eq!(summary.counts["conduits"], 0);
        assert_eq!(summary.warnings, 0);
    }

    #[test]
    fn test_counts_after_adds() {
        let mut doc = Document::empty(Dialect::Swmm);
        doc.add_row(
            "JUNCTIONS",
            Row::from_fields(vec![
                ("name".into(), Value::Text("J1".into())),
                ("elevation".into(), Value::Real(10.0)),
            ]),
        )
        .unwrap();
        let summary = doc.summary();
        assert_eq!(summary.counts["junctions"], 1);
        assert_eq!(summary.counts["outfalls"], 0);
    }

    #[test]
    fn test_summary_serializes() {
        let doc = Document::empty(Dialect::Epanet);
        let json = serde_json::to_string(&doc.summary()).unwrap();
        assert!(json.contains("\"epanet\""));
        assert!(json.contains("\"pipes\""));
    }
}
