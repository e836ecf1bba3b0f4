//! # hyd-core: Hydraulic Network Model Core
//!
//! Provides the fundamental data structures for hydraulic network model
//! files: the queryable/mutable document model, the section schema registry
//! for the EPANET and SWMM dialects, and the diagnostics infrastructure.
//!
//! ## Design Philosophy
//!
//! A model file is an ordered sequence of **sections** of heterogeneous
//! tabular rows, not a single fixed record type:
//!
//! - **Document**: ordered sections + dialect tag + source metadata
//! - **Section**: tabular rows, key-value settings, or retained free text
//! - **Row**: schema-typed fields plus the original raw line
//!
//! This schema-driven approach enables:
//! - Typed access for known sections without losing unknown ones (opaque
//!   sections survive a load → save cycle byte-for-byte)
//! - Primary-key indexes for id lookups and uniqueness enforcement
//! - Soft cross-section references as plain key lookups: a conduit row
//!   stores node ids, never node objects, so there is no cyclic ownership
//! - Two-tier serialization: untouched rows re-emit their raw text, edited
//!   rows render canonically (per-row dirty flag set only by the API)
//!
//! ## Quick Start
//!
//! ```rust
//! use hyd_core::{Dialect, Document, Row, Value};
//!
//! let mut doc = Document::empty(Dialect::Swmm);
//!
//! doc.add_row(
//!     "JUNCTIONS",
//!     Row::from_fields(vec![
//!         ("name".to_string(), Value::Text("J1".to_string())),
//!         ("elevation".to_string(), Value::Real(10.0)),
//!     ]),
//! )?;
//!
//! assert_eq!(doc.summary().counts["junctions"], 1);
//! assert_eq!(doc.row("JUNCTIONS", "J1").unwrap().get_f64("elevation"), Some(10.0));
//! # Ok::<(), hyd_core::HydError>(())
//! ```
//!
//! ## Modules
//!
//! - [`document`] - Document/Section/Row model and the query/mutate API
//! - [`schema`] - static per-dialect section schema registry
//! - [`diagnostics`] - non-fatal issue collection (parse, type, reference)
//! - [`summary`] - per-element counts for loaded models
//! - [`topology`] - petgraph-backed connectivity analysis (islands, stats)
//! - [`error`] - unified [`HydError`]/[`HydResult`]
//!
//! ## Integration with hyd-io
//!
//! The hyd-io crate provides the tokenizer, the INP model builder, the
//! serializer and the RPT report extractor; all of them operate on the
//! types defined here.

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod document;
pub mod error;
pub mod schema;
pub mod summary;
pub mod topology;

pub use diagnostics::{BuildStats, DiagnosticIssue, Diagnostics, Severity};
pub use document::{Document, Row, Section, Value};
pub use error::{HydError, HydResult};
pub use schema::{FieldRole, FieldSpec, FieldType, SectionKind, SectionSchema};
pub use summary::ModelSummary;

/// The two dialects of the INP/RPT family handled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// EPANET water distribution models.
    Epanet,
    /// SWMM storm/wastewater models.
    Swmm,
}

impl Dialect {
    pub const ALL: &'static [Dialect] = &[Dialect::Epanet, Dialect::Swmm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Epanet => "epanet",
            Dialect::Swmm => "swmm",
        }
    }

    /// Comment marker used by both dialects' INP files.
    pub fn comment_marker(&self) -> char {
        ';'
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Dialect {
    type Err = HydError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "epanet" => Ok(Dialect::Epanet),
            "swmm" => Ok(Dialect::Swmm),
            other => Err(HydError::Config(format!(
                "unknown dialect '{other}' (expected epanet or swmm)"
            ))),
        }
    }
}
