//! INP/RPT importers.
//!
//! This module provides the parsers for the two textual artifacts of a
//! hydraulic model:
//!
//! - **INP model files** (EPANET and SWMM dialects), parsed into a
//!   queryable/mutable [`hyd_core::Document`]
//! - **RPT report files**, parsed into a read-only
//!   [`crate::report::ReportBundle`]
//!
//! All parsers collect non-fatal findings as diagnostics rather than
//! aborting: bad field types, duplicate keys and unresolved references
//! leave a still-usable result behind.
//!
//! ## Quick Import Example
//!
//! ```no_run
//! use hyd_io::importers::{parse_inp_auto, Format};
//!
//! // Auto-detect dialect from extension + content
//! let doc = parse_inp_auto("network.inp")?;
//! println!("junctions: {}", doc.summary().counts["junctions"]);
//!
//! // Or name the dialect explicitly
//! if let Some((format, _confidence)) = Format::detect(std::path::Path::new("network.inp")) {
//!     let doc = hyd_io::importers::parse_inp("network.inp", format.dialect())?;
//!     println!("sections: {}", doc.section_count());
//! }
//! # Ok::<(), hyd_core::HydError>(())
//! ```
//!
//! ## Import Pipeline
//!
//! 1. **Format Detection** - extension plus content markers ([`Format::detect`])
//! 2. **Line Classification** - headers/rows/comments/blanks ([`crate::tokenizer`])
//! 3. **Schema-Driven Building** - coercion, key indexes, diagnostics
//! 4. **Referential Pass** - unresolved references become warnings
//!
//! Reports follow the same shape with banner segmentation in place of line
//! classification.

use std::path::Path;

use hyd_core::{Dialect, Document, HydError, HydResult};

use crate::report::ReportBundle;

pub mod format;
pub mod inp;
pub mod rpt;

#[cfg(test)]
mod tests;

pub use format::{Confidence, Format};
pub use inp::build_document;
pub use rpt::extract_report;

fn read_text(path: &Path) -> HydResult<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| {
        HydError::Parse(format!("{} is not valid UTF-8 text", path.display()))
    })
}

/// Parse an INP model file in the given dialect.
pub fn parse_inp(path: impl AsRef<Path>, dialect: Dialect) -> HydResult<Document> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let mut doc = build_document(&text, dialect)?;
    doc.set_source_path(path);
    Ok(doc)
}

/// Parse an INP model file, detecting the dialect from its content.
pub fn parse_inp_auto(path: impl AsRef<Path>) -> HydResult<Document> {
    let path = path.as_ref();
    let (format, _) = Format::detect(path).ok_or_else(|| {
        HydError::Parse(format!("{}: not a recognized model file", path.display()))
    })?;
    if format.is_report() {
        return Err(HydError::Parse(format!(
            "{} is a report file, not a model",
            path.display()
        )));
    }
    parse_inp(path, format.dialect())
}

/// Parse INP text directly (no file involved).
pub fn parse_inp_str(text: &str, dialect: Dialect) -> HydResult<Document> {
    build_document(text, dialect)
}

/// Parse an RPT report file.
pub fn parse_rpt(path: impl AsRef<Path>, dialect: Dialect) -> HydResult<ReportBundle> {
    let path = path.as_ref();
    let text = read_text(path)?;
    extract_report(&text, dialect)
}

/// Parse RPT text directly (no file involved).
pub fn parse_rpt_str(text: &str, dialect: Dialect) -> HydResult<ReportBundle> {
    extract_report(text, dialect)
}
