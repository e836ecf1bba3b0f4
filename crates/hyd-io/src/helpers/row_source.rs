//! The persistence boundary: documents from and to row mappings.
//!
//! The engine does not define a storage schema. Its only contract with
//! persistence is accepting a mapping-producing row source (e.g. rows from
//! a database query) to seed a [`Document`], and producing the same shape
//! back for whatever store the caller uses.

use std::collections::BTreeMap;

use hyd_core::document::{Document, Row, Value};
use hyd_core::schema::SectionKind;
use hyd_core::Dialect;

/// One row at the boundary: section name plus field → text mapping.
pub type RowMapping = (String, BTreeMap<String, String>);

/// Seed a document from row mappings.
///
/// Field values arrive as text and are coerced against the section schema
/// by the mutation API. Rows the API rejects (unknown section, duplicate
/// key, missing required field) are recorded as validation diagnostics and
/// skipped; the remaining rows still produce a usable document.
pub fn seed_document(
    dialect: Dialect,
    rows: impl IntoIterator<Item = RowMapping>,
) -> Document {
    let mut doc = Document::empty(dialect);
    for (section, mapping) in rows {
        let row = Row::from_fields(
            mapping
                .into_iter()
                .map(|(field, value)| (field, Value::Text(value)))
                .collect(),
        );
        if let Err(err) = doc.add_row(&section, row) {
            doc.diagnostics_mut()
                .add_error_with_entity("validation", &err.to_string(), &section);
        }
    }
    doc
}

/// Emit every structured row of a document as `(section, field → text)`.
///
/// Free-text and opaque sections have no row structure and are skipped;
/// they belong to the text artifact, not to row-oriented persistence.
pub fn document_rows(doc: &Document) -> Vec<RowMapping> {
    let mut out = Vec::new();
    for section in doc.sections() {
        if section.kind() == SectionKind::FreeText {
            continue;
        }
        for row in section.rows() {
            let mapping: BTreeMap<String, String> = row
                .fields()
                .iter()
                .map(|(name, value)| {
                    let text = match value {
                        Value::Text(s) => s.clone(),
                        other => other.to_token(),
                    };
                    (name.clone(), text)
                })
                .collect();
            out.push((section.canonical().to_string(), mapping));
        }
    }
    out
}
