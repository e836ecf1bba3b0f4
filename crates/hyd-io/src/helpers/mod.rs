//! Shared import/export helpers.
//!
//! - [`row_source`]: the persistence boundary: seed a document from
//!   `(section, field → text)` mappings and emit the same shape back

pub mod row_source;

pub use row_source::{document_rows, seed_document, RowMapping};
