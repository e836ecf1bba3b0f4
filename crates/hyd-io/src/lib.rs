//! # hyd-io: Hydraulic Model Text I/O
//!
//! Parsing and serialization for the two textual artifacts that describe
//! and report on a hydraulic network model: the editable **INP** model file
//! and the generated **RPT** report file, in both the EPANET and SWMM
//! dialects.
//!
//! ## Design Philosophy
//!
//! **Schema-driven parsing**: each format parser handles line structure
//! only; column knowledge lives in the static schema registry of
//! `hyd-core`, so new section types need no tokenizer or serializer
//! changes.
//!
//! **Lossless roundtrips**: unknown sections are retained verbatim, known
//! rows keep their raw text, and the serializer re-emits untouched content
//! byte-for-byte. Programmatic edits render canonically.
//!
//! **Error recovery**: parsing continues past bad field types, duplicate
//! keys and unresolved references, collecting diagnostics for user
//! visibility rather than aborting on recoverable variance.
//!
//! ## Quick Start: Parse and Re-render a Model
//!
//! ```rust
//! use hyd_core::Dialect;
//! use hyd_io::{exporters, importers};
//!
//! let text = "[JUNCTIONS]\nJ1  10.0  0.0\n\n";
//! let doc = importers::parse_inp_str(text, Dialect::Swmm)?;
//!
//! assert_eq!(doc.summary().counts["junctions"], 1);
//! assert_eq!(exporters::render(&doc), text);
//! # Ok::<(), hyd_core::HydError>(())
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Extension | Artifact | Notes |
//! |--------|-----------|----------|-------|
//! | EPANET INP | `.inp` | model | pipes/tanks/reservoirs layouts |
//! | SWMM INP | `.inp` | model | conduits/subcatchments layouts |
//! | EPANET RPT | `.rpt` | report | time-stamped node/link tables |
//! | SWMM RPT | `.rpt` | report | star-banner summary blocks |
//!
//! ## Module Overview
//!
//! - [`tokenizer`] - logical-line classification (headers, rows, comments)
//! - [`importers`] - INP model builder, RPT extractor, format detection
//! - [`exporters`] - INP serializer, report CSV export
//! - [`report`] - read-only result tables ([`report::ReportBundle`])
//! - [`helpers`] - row-source seeding (the persistence boundary)
//!
//! ## Error Handling
//!
//! Parsers return `HydResult<T>`; a hard error means the input was unusable
//! as a whole. Everything recoverable lands in the document's
//! [`hyd_core::Diagnostics`]:
//!
//! ```rust
//! use hyd_core::Dialect;
//! use hyd_io::importers::parse_inp_str;
//!
//! let doc = parse_inp_str("[JUNCTIONS]\nJ1 ten_feet\n", Dialect::Swmm)?;
//! assert!(doc.diagnostics().has_errors());
//! assert_eq!(doc.diagnostics().category_count("type"), 1);
//! # Ok::<(), hyd_core::HydError>(())
//! ```

pub mod exporters;
pub mod helpers;
pub mod importers;
pub mod report;
pub mod tokenizer;

pub use importers::{Confidence, Format};
pub use report::{ReportBundle, ReportTable, RunStatus};
