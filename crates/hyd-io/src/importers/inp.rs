//! INP model builder: classified lines + schema registry → [`Document`].
//!
//! The builder keeps a current-section cursor, coerces each data row against
//! its section schema and collects non-fatal findings (bad field types,
//! duplicate keys, unresolved references) as diagnostics on the document.
//! It fails only when the input is unusable as a whole: a data row before
//! any section header, or text that is not valid UTF-8.
//!
//! Duplicate primary keys resolve last-write-wins: real-world files contain
//! benign duplicates and aborting on them would reject usable models.

use hyd_core::diagnostics::Diagnostics;
use hyd_core::document::{Document, Row, Value};
use hyd_core::schema::{self, SectionKind, SectionSchema};
use hyd_core::{Dialect, HydError, HydResult};

use crate::tokenizer::{classify, ClassifiedLine};

/// Build a document from INP text.
pub fn build_document(text: &str, dialect: Dialect) -> HydResult<Document> {
    let mut doc = Document::empty(dialect);
    let mut diagnostics = Diagnostics::new();
    let mut pending_comments: Vec<String> = Vec::new();
    let mut current: Option<usize> = None;
    let mut current_is_free_text = false;

    for line in classify(text) {
        match line {
            ClassifiedLine::Comment { raw, line_no: _ } => {
                if current_is_free_text {
                    if let Some(idx) = current {
                        doc.push_raw_line(idx, raw);
                        continue;
                    }
                }
                pending_comments.push(raw);
            }
            ClassifiedLine::Blank { .. } => {
                match current {
                    // Blanks inside free-text/opaque sections are content.
                    Some(idx) if current_is_free_text => doc.push_raw_line(idx, ""),
                    // Leading blanks belong to the head block.
                    None => {
                        if pending_comments.is_empty() {
                            doc.push_head_line("");
                        } else {
                            pending_comments.push(String::new());
                        }
                    }
                    // Row separators inside known sections are formatting,
                    // covered by the documented normalization set.
                    Some(_) => {}
                }
            }
            ClassifiedLine::SectionHeader { name, raw, .. } => {
                let comments = std::mem::take(&mut pending_comments);
                let idx = doc.open_section(&name, Some(raw), comments);
                current = Some(idx);
                current_is_free_text = doc
                    .section_at(idx)
                    .map(|s| s.kind() == SectionKind::FreeText)
                    .unwrap_or(false);
            }
            ClassifiedLine::DataRow {
                fields,
                raw,
                line_no,
            } => {
                let Some(idx) = current else {
                    return Err(HydError::Parse(format!(
                        "data row before any [SECTION] header at line {line_no}"
                    )));
                };
                let section_name = doc
                    .section_at(idx)
                    .map(|s| s.canonical().to_string())
                    .unwrap_or_default();

                if current_is_free_text {
                    for comment in pending_comments.drain(..) {
                        doc.push_raw_line(idx, comment);
                    }
                    doc.push_raw_line(idx, raw);
                    continue;
                }

                let schema = schema::schema_for(dialect, &section_name)
                    .expect("non-free-text sections always have a schema");
                let comments = std::mem::take(&mut pending_comments);
                let row = match schema.kind {
                    SectionKind::KeyValue => key_value_row(fields, raw, comments),
                    _ => tabular_row(
                        schema,
                        &section_name,
                        fields,
                        raw,
                        comments,
                        line_no,
                        &mut diagnostics,
                    ),
                };
                if let Some(key) = doc.insert_parsed_row(idx, row) {
                    diagnostics.add_warning_at_line(
                        "duplicate-key",
                        &format!("duplicate key '{key}' in [{section_name}]; later row wins"),
                        line_no,
                    );
                }
            }
        }
    }

    // Comments trailing the last data line.
    for comment in pending_comments {
        doc.push_tail_line(comment);
    }

    // Referential pass: unresolved references are findings, not aborts.
    for issue in doc.dangling_references() {
        diagnostics.push(issue);
    }

    diagnostics.stats.sections = doc.section_count();
    diagnostics.stats.rows = doc.sections().map(|s| s.rows().len()).sum();
    diagnostics.stats.opaque_sections = doc.sections().filter(|s| s.is_opaque()).count();
    *doc.diagnostics_mut() = diagnostics;
    Ok(doc)
}

/// `KEY  VALUE...` row: first token is the key, the remainder the value.
fn key_value_row(fields: Vec<String>, raw: String, comments: Vec<String>) -> Row {
    let mut values = Vec::new();
    let mut iter = fields.into_iter();
    if let Some(key) = iter.next() {
        values.push(("key".to_string(), Value::Text(key)));
    }
    let rest: Vec<String> = iter.collect();
    if !rest.is_empty() {
        values.push(("value".to_string(), Value::Text(rest.join(" "))));
    }
    Row::parsed(values, raw, comments)
}

/// Coerce a tabular row's tokens against the schema's ordered fields.
///
/// Coercion failures keep the raw token as text and record a `type`
/// diagnostic referencing section, row and column, never a silent default.
fn tabular_row(
    schema: &SectionSchema,
    section_name: &str,
    fields: Vec<String>,
    raw: String,
    comments: Vec<String>,
    line_no: usize,
    diagnostics: &mut Diagnostics,
) -> Row {
    let mut values = Vec::new();
    let specs = schema.fields;
    let fixed = if schema.greedy_tail {
        specs.len() - 1
    } else {
        specs.len()
    };
    let row_id = fields.first().cloned().unwrap_or_default();

    for (i, spec) in specs[..fixed].iter().enumerate() {
        match fields.get(i) {
            Some(token) => match Value::coerce(token, spec.ty) {
                Ok(value) => values.push((spec.name.to_string(), value)),
                Err(reason) => {
                    diagnostics.push(
                        hyd_core::DiagnosticIssue::new(
                            hyd_core::Severity::Error,
                            "type",
                            format!("column '{}': {reason}", spec.name),
                        )
                        .with_entity(format!("{section_name} {row_id}"))
                        .with_line(line_no),
                    );
                    values.push((spec.name.to_string(), Value::Text(token.clone())));
                }
            },
            None => {
                if spec.required {
                    diagnostics.push(
                        hyd_core::DiagnosticIssue::new(
                            hyd_core::Severity::Error,
                            "parse",
                            format!("missing required column '{}'", spec.name),
                        )
                        .with_entity(format!("{section_name} {row_id}"))
                        .with_line(line_no),
                    );
                }
            }
        }
    }

    if schema.greedy_tail {
        if fields.len() > fixed {
            let tail = specs[fixed];
            values.push((tail.name.to_string(), Value::Text(fields[fixed..].join(" "))));
        }
    } else if fields.len() > specs.len() {
        diagnostics.add_warning_at_line(
            "parse",
            &format!("unexpected extra fields in [{section_name}] row '{row_id}'"),
            line_no,
        );
        values.push(("extra".to_string(), Value::Text(fields[specs.len()..].join(" "))));
    }

    Row::parsed(values, raw, comments)
}
