//! In-memory model of an INP file: sections, rows, and the query/mutate API.
//!
//! A [`Document`] is created by the builder in `hyd-io` (or programmatically
//! via [`Document::empty`]) and mutated only through the API here, so the
//! structural invariants hold at the boundary:
//!
//! - section order is preserved across load → mutate → save cycles
//! - at most one [`Section`] per canonical name
//! - primary keys are unique within a section
//! - failed mutations leave the document unchanged
//!
//! Rows keep their original raw text and a dirty flag. The flag is set only
//! by mutation calls, never inferred from field equality, which is what lets
//! the serializer re-emit untouched rows byte-for-byte while rendering
//! edited rows canonically.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::diagnostics::{DiagnosticIssue, Diagnostics, Severity};
use crate::error::{HydError, HydResult};
use crate::schema::{self, canonical_name, FieldType, SectionKind, SectionSchema};
use crate::Dialect;

/// Typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Real(f64),
}

impl Value {
    /// Coerce a raw token against a declared field type.
    ///
    /// Failures are returned as plain messages; callers decide whether that
    /// is a diagnostic (builder) or a hard rejection (mutation API). Tokens
    /// with locale decimal commas or other partial numerics fail here,
    /// never silently defaulted.
    pub fn coerce(token: &str, ty: FieldType) -> Result<Value, String> {
        match ty {
            FieldType::Text => Ok(Value::Text(token.to_string())),
            FieldType::Int => token
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("not an integer: '{token}'")),
            FieldType::Real => token
                .parse::<f64>()
                .map(Value::Real)
                .map_err(|_| format!("not a number: '{token}'")),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Canonical token form used when a row is rendered from typed fields.
    pub fn to_token(&self) -> String {
        match self {
            Value::Text(s) => {
                if s.chars().any(char::is_whitespace) {
                    format!("\"{s}\"")
                } else {
                    s.clone()
                }
            }
            Value::Int(v) => v.to_string(),
            Value::Real(v) => format!("{v}"),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_token())
    }
}

/// One data row: named typed fields plus the original raw line.
#[derive(Debug, Clone)]
pub struct Row {
    fields: Vec<(String, Value)>,
    raw: Option<String>,
    comments: Vec<String>,
    dirty: bool,
}

impl Row {
    /// A row constructed through the API (renders canonically).
    pub fn from_fields(fields: Vec<(String, Value)>) -> Self {
        Self {
            fields,
            raw: None,
            comments: Vec::new(),
            dirty: true,
        }
    }

    /// A row produced by the parser, carrying its source line verbatim.
    pub fn parsed(fields: Vec<(String, Value)>, raw: String, comments: Vec<String>) -> Self {
        Self {
            fields,
            raw: Some(raw),
            comments,
            dirty: false,
        }
    }

    /// Builder-style helper for tests and programmatic construction.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn set(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name.to_string(), value));
        }
    }

    fn key_token(&self, key_field: &str) -> Option<String> {
        self.get(key_field).map(|v| v.to_token())
    }
}

impl Default for Row {
    fn default() -> Self {
        Self::from_fields(Vec::new())
    }
}

/// A named block of the document.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    canonical: String,
    kind: SectionKind,
    header_raw: Option<String>,
    comments: Vec<String>,
    rows: Vec<Row>,
    raw_lines: Vec<String>,
    key_index: HashMap<String, usize>,
    opaque: bool,
}

impl Section {
    fn new(
        name: &str,
        kind: SectionKind,
        opaque: bool,
        header_raw: Option<String>,
        comments: Vec<String>,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            canonical: canonical_name(name),
            kind,
            header_raw,
            comments,
            rows: Vec::new(),
            raw_lines: Vec::new(),
            key_index: HashMap::new(),
            opaque,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// True when no schema is registered for this section; its content is
    /// retained verbatim and re-emitted untouched.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn header_raw(&self) -> Option<&str> {
        self.header_raw.as_deref()
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn raw_lines(&self) -> &[String] {
        &self.raw_lines
    }

    pub fn len(&self) -> usize {
        match self.kind {
            SectionKind::FreeText => self.raw_lines.len(),
            _ => self.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row_by_key(&self, key: &str) -> Option<&Row> {
        self.key_index
            .get(&canonical_name(key))
            .map(|&idx| &self.rows[idx])
    }

    /// Count of distinct leading names, for keyless multi-row sections
    /// (patterns, curves, timeseries) where one object spans several rows.
    pub fn distinct_names(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for row in &self.rows {
            if let Some((_, value)) = row.fields.first() {
                seen.insert(canonical_name(&value.to_token()));
            }
        }
        seen.len()
    }

    fn rebuild_key_index(&mut self, key_field: &str) {
        self.key_index.clear();
        for (idx, row) in self.rows.iter().enumerate() {
            if let Some(key) = row.key_token(key_field) {
                self.key_index.insert(canonical_name(&key), idx);
            }
        }
    }
}

/// Root container: an ordered sequence of sections plus source metadata.
#[derive(Debug, Clone)]
pub struct Document {
    dialect: Dialect,
    sections: Vec<Section>,
    index: HashMap<String, usize>,
    source_path: Option<PathBuf>,
    head_lines: Vec<String>,
    tail_lines: Vec<String>,
    diagnostics: Diagnostics,
}

static NO_ROWS: &[Row] = &[];

impl Document {
    /// An empty model for the given dialect.
    pub fn empty(dialect: Dialect) -> Self {
        Self {
            dialect,
            sections: Vec::new(),
            index: HashMap::new(),
            source_path: None,
            head_lines: Vec::new(),
            tail_lines: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn set_source_path(&mut self, path: impl Into<PathBuf>) {
        self.source_path = Some(path.into());
    }

    /// Comment/blank lines preceding the first section header, verbatim.
    pub fn head_lines(&self) -> &[String] {
        &self.head_lines
    }

    pub fn push_head_line(&mut self, line: impl Into<String>) {
        self.head_lines.push(line.into());
    }

    /// Comment lines trailing the last data line, verbatim.
    pub fn tail_lines(&self) -> &[String] {
        &self.tail_lines
    }

    pub fn push_tail_line(&mut self, line: impl Into<String>) {
        self.tail_lines.push(line.into());
    }

    /// Diagnostics accumulated at build time plus mutation-time reference
    /// warnings.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    // ------------------------------------------------------------------
    // Construction surface used by the model builder (parsed content)
    // ------------------------------------------------------------------

    /// Open (or reuse) the section with the given name; returns its position.
    ///
    /// A repeated `[SECTION]` header reuses the already-open section, so the
    /// document never holds two sections with the same canonical name.
    pub fn open_section(
        &mut self,
        name: &str,
        header_raw: Option<String>,
        comments: Vec<String>,
    ) -> usize {
        let canonical = canonical_name(name);
        if let Some(&idx) = self.index.get(&canonical) {
            return idx;
        }
        let (kind, opaque) = match schema::schema_for(self.dialect, name) {
            Some(schema) => (schema.kind, false),
            None => (SectionKind::FreeText, true),
        };
        let section = Section::new(name, kind, opaque, header_raw, comments);
        self.sections.push(section);
        let idx = self.sections.len() - 1;
        self.index.insert(canonical, idx);
        idx
    }

    /// Append a verbatim content line to a free-text/opaque section.
    pub fn push_raw_line(&mut self, section_idx: usize, line: impl Into<String>) {
        self.sections[section_idx].raw_lines.push(line.into());
    }

    /// Insert a parsed row, keeping the primary-key index up to date.
    ///
    /// On a duplicate key the later row wins (it replaces the earlier row in
    /// place) and the displaced key is returned so the builder can record a
    /// duplicate-key diagnostic.
    pub fn insert_parsed_row(&mut self, section_idx: usize, row: Row) -> Option<String> {
        let dialect = self.dialect;
        let section = &mut self.sections[section_idx];
        let key_field = schema::schema_for(dialect, &section.canonical)
            .and_then(|s| s.primary_key().map(|i| s.fields[i].name));

        if let Some(key_field) = key_field {
            if let Some(key) = row.key_token(key_field) {
                let canonical_key = canonical_name(&key);
                if let Some(&existing) = section.key_index.get(&canonical_key) {
                    section.rows[existing] = row;
                    return Some(key);
                }
                section.rows.push(row);
                section
                    .key_index
                    .insert(canonical_key, section.rows.len() - 1);
                return None;
            }
        }
        section.rows.push(row);
        None
    }

    // ------------------------------------------------------------------
    // Query API
    // ------------------------------------------------------------------

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.index
            .get(&canonical_name(name))
            .map(|&idx| &self.sections[idx])
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn section_at(&self, idx: usize) -> Option<&Section> {
        self.sections.get(idx)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Rows of a section, or an empty slice when the section is absent.
    pub fn rows(&self, name: &str) -> &[Row] {
        self.section(name).map(|s| s.rows()).unwrap_or(NO_ROWS)
    }

    /// Rows of a section matching a predicate, in stored order.
    pub fn rows_where<'a, F>(&'a self, name: &str, predicate: F) -> Vec<&'a Row>
    where
        F: Fn(&Row) -> bool,
    {
        self.rows(name).iter().filter(|r| predicate(r)).collect()
    }

    pub fn row(&self, section_name: &str, key: &str) -> Option<&Row> {
        self.section(section_name).and_then(|s| s.row_by_key(key))
    }

    // ------------------------------------------------------------------
    // Mutation API: atomic, marks rows dirty
    // ------------------------------------------------------------------

    /// Add a row to a known section, creating the section if absent.
    ///
    /// Enforces primary-key uniqueness and required-field presence; on any
    /// failure the document is unchanged.
    pub fn add_row(&mut self, section_name: &str, row: Row) -> HydResult<()> {
        let schema = self.mutable_schema(section_name)?;
        let normalized = normalize_row(schema, &row)?;

        let key = match schema.primary_key() {
            Some(idx) => {
                let key_field = schema.fields[idx].name;
                let key = normalized.key_token(key_field).ok_or_else(|| {
                    HydError::Validation(format!(
                        "missing primary key '{key_field}' for [{section_name}] row"
                    ))
                })?;
                if self
                    .section(section_name)
                    .and_then(|s| s.row_by_key(&key))
                    .is_some()
                {
                    return Err(HydError::Validation(format!(
                        "duplicate key '{key}' in [{}]",
                        canonical_name(section_name)
                    )));
                }
                Some(key)
            }
            None => None,
        };

        let idx = self.open_section(schema.name, None, Vec::new());
        let section = &mut self.sections[idx];
        section.rows.push(normalized);
        if let Some(key) = key {
            section
                .key_index
                .insert(canonical_name(&key), section.rows.len() - 1);
        }
        Ok(())
    }

    /// Patch fields of the row identified by `key`.
    ///
    /// The patch is validated in full before anything is applied; a rejected
    /// patch leaves the row untouched. A successful patch marks the row
    /// dirty, so it renders canonically from then on.
    pub fn update_row(
        &mut self,
        section_name: &str,
        key: &str,
        patch: &[(String, Value)],
    ) -> HydResult<()> {
        let schema = self.mutable_schema(section_name)?;
        let key_field = schema
            .primary_key()
            .map(|i| schema.fields[i].name)
            .ok_or_else(|| {
                HydError::Validation(format!(
                    "[{}] has no primary key; rows cannot be addressed for update",
                    canonical_name(section_name)
                ))
            })?;

        let section_idx = *self
            .index
            .get(&canonical_name(section_name))
            .ok_or_else(|| {
                HydError::NotFound(format!("no section [{}]", canonical_name(section_name)))
            })?;
        let row_idx = *self.sections[section_idx]
            .key_index
            .get(&canonical_name(key))
            .ok_or_else(|| {
                HydError::NotFound(format!(
                    "no row '{key}' in [{}]",
                    canonical_name(section_name)
                ))
            })?;

        // Validate and coerce the whole patch before touching the row.
        let mut candidate = self.sections[section_idx].rows[row_idx].clone();
        for (field, value) in patch {
            let spec = schema.field(field).ok_or_else(|| {
                HydError::Validation(format!(
                    "unknown field '{field}' for [{}]",
                    canonical_name(section_name)
                ))
            })?;
            candidate.set(field, coerce_value(value, spec.ty, field)?);
        }

        let new_key = candidate.key_token(key_field).ok_or_else(|| {
            HydError::Validation(format!("patch removed primary key '{key_field}'"))
        })?;
        let new_canonical = canonical_name(&new_key);
        let old_canonical = canonical_name(key);
        if new_canonical != old_canonical
            && self.sections[section_idx]
                .key_index
                .contains_key(&new_canonical)
        {
            return Err(HydError::Validation(format!(
                "duplicate key '{new_key}' in [{}]",
                canonical_name(section_name)
            )));
        }

        candidate.dirty = true;
        let section = &mut self.sections[section_idx];
        section.rows[row_idx] = candidate;
        if new_canonical != old_canonical {
            section.key_index.remove(&old_canonical);
            section.key_index.insert(new_canonical, row_idx);
        }
        Ok(())
    }

    /// Remove the row identified by `key`.
    ///
    /// Rows elsewhere that still reference the removed key are *not*
    /// deleted; each now-dangling referencing row is flagged with one
    /// reference warning. Cascading is deliberately not engine policy.
    pub fn remove_row(&mut self, section_name: &str, key: &str) -> HydResult<()> {
        let canonical_section = canonical_name(section_name);
        let section_idx = *self
            .index
            .get(&canonical_section)
            .ok_or_else(|| HydError::NotFound(format!("no section [{canonical_section}]")))?;

        let schema = schema::schema_for(self.dialect, &canonical_section).ok_or_else(|| {
            HydError::Validation(format!(
                "[{canonical_section}] is opaque; its rows cannot be removed individually"
            ))
        })?;
        let key_field = schema
            .primary_key()
            .map(|i| schema.fields[i].name)
            .ok_or_else(|| {
                HydError::Validation(format!(
                    "[{canonical_section}] has no primary key; rows cannot be addressed for removal"
                ))
            })?;

        let canonical_key = canonical_name(key);
        let row_idx = *self.sections[section_idx]
            .key_index
            .get(&canonical_key)
            .ok_or_else(|| {
                HydError::NotFound(format!("no row '{key}' in [{canonical_section}]"))
            })?;

        let section = &mut self.sections[section_idx];
        section.rows.remove(row_idx);
        section.key_index.remove(&canonical_key);
        section.rebuild_key_index(key_field);

        for issue in self.dangling_rows_for(&canonical_section, &canonical_key) {
            self.diagnostics.push(issue);
        }
        Ok(())
    }

    fn mutable_schema(&self, section_name: &str) -> HydResult<&'static SectionSchema> {
        match schema::schema_for(self.dialect, section_name) {
            Some(schema) if schema.kind != SectionKind::FreeText => Ok(schema),
            Some(_) => Err(HydError::Validation(format!(
                "[{}] is free-text; it has no row structure to mutate",
                canonical_name(section_name)
            ))),
            None => Err(HydError::Validation(format!(
                "[{}] is not a known {} section",
                canonical_name(section_name),
                self.dialect
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Referential checks
    // ------------------------------------------------------------------

    /// Does `key` resolve against the primary-key index of any target section?
    pub fn key_exists_in(&self, targets: &[&str], key: &str) -> bool {
        let canonical_key = canonical_name(key);
        targets.iter().any(|target| {
            self.section(target)
                .map(|s| s.key_index.contains_key(&canonical_key))
                .unwrap_or(false)
        })
    }

    /// Scan every reference-typed field and report unresolved targets.
    ///
    /// Dangling references are findings, not structural errors: partially
    /// specified models are legal intermediate states.
    pub fn dangling_references(&self) -> Vec<DiagnosticIssue> {
        let mut issues = Vec::new();
        for section in &self.sections {
            let Some(schema) = schema::schema_for(self.dialect, &section.canonical) else {
                continue;
            };
            for row in &section.rows {
                for (spec, targets) in schema.reference_fields() {
                    let Some(token) = row.get(spec.name).map(Value::to_token) else {
                        continue;
                    };
                    if token.is_empty() || token == "*" {
                        continue;
                    }
                    if !self.key_exists_in(targets, &token) {
                        issues.push(
                            DiagnosticIssue::new(
                                Severity::Warning,
                                "reference",
                                format!(
                                    "field '{}' references missing '{token}'",
                                    spec.name
                                ),
                            )
                            .with_entity(row_entity(section, row)),
                        );
                    }
                }
            }
        }
        issues
    }

    /// Rows that reference `removed_key` (in a section group containing
    /// `removed_section`) and no longer resolve; one issue per row.
    fn dangling_rows_for(&self, removed_section: &str, removed_key: &str) -> Vec<DiagnosticIssue> {
        let mut issues = Vec::new();
        for section in &self.sections {
            let Some(schema) = schema::schema_for(self.dialect, &section.canonical) else {
                continue;
            };
            for row in &section.rows {
                let dangles = schema.reference_fields().any(|(spec, targets)| {
                    if !targets.iter().any(|t| *t == removed_section) {
                        return false;
                    }
                    match row.get(spec.name).map(Value::to_token) {
                        Some(token) => {
                            canonical_name(&token) == removed_key
                                && !self.key_exists_in(targets, &token)
                        }
                        None => false,
                    }
                });
                if dangles {
                    issues.push(
                        DiagnosticIssue::new(
                            Severity::Warning,
                            "reference",
                            format!("row references removed '{removed_key}'"),
                        )
                        .with_entity(row_entity(section, row)),
                    );
                }
            }
        }
        issues
    }
}

fn row_entity(section: &Section, row: &Row) -> String {
    match row.fields().first() {
        Some((_, value)) => format!("{} {}", section.canonical(), value.to_token()),
        None => section.canonical().to_string(),
    }
}

fn coerce_value(value: &Value, ty: FieldType, field: &str) -> HydResult<Value> {
    let coerced = match (value, ty) {
        (Value::Text(token), FieldType::Int | FieldType::Real) => Value::coerce(token, ty),
        (Value::Int(v), FieldType::Real) => Ok(Value::Real(*v as f64)),
        (Value::Real(v), FieldType::Int) => Err(format!("not an integer: '{v}'")),
        (Value::Int(_), FieldType::Int) | (Value::Real(_), FieldType::Real) => Ok(value.clone()),
        (other, FieldType::Text) => Ok(Value::Text(other.to_token())),
    };
    coerced.map_err(|reason| HydError::Validation(format!("field '{field}': {reason}")))
}

/// Re-state an API-supplied row in schema field order with coerced types.
fn normalize_row(schema: &SectionSchema, row: &Row) -> HydResult<Row> {
    let mut fields = Vec::new();
    for spec in schema.fields {
        match row.get(spec.name) {
            Some(value) => fields.push((
                spec.name.to_string(),
                coerce_value(value, spec.ty, spec.name)?,
            )),
            None if spec.required => {
                return Err(HydError::Validation(format!(
                    "missing required field '{}' for [{}]",
                    spec.name, schema.name
                )))
            }
            None => {}
        }
    }
    for (name, _) in row.fields() {
        if schema.field(name).is_none() {
            return Err(HydError::Validation(format!(
                "unknown field '{name}' for [{}]",
                schema.name
            )));
        }
    }
    let mut normalized = Row::from_fields(fields);
    normalized.comments = row.comments.clone();
    Ok(normalized)
}
