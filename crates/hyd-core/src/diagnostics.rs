//! Unified diagnostics infrastructure for tracking issues during operations.
//!
//! This module provides a common interface for collecting warnings and errors
//! during parsing, validation, mutation, and other operations. It supports:
//!
//! - Severity levels (Warning, Error)
//! - Categories for grouping issues (parse, type, duplicate-key, reference, validation)
//! - Optional entity references (e.g., "JUNCTIONS J12", "CONDUITS C4")
//! - Optional line numbers for file-based operations
//! - Serialization for JSON output
//!
//! # Example
//!
//! ```
//! use hyd_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//!
//! // Add a validation warning
//! diag.add_warning("validation", "Model has no links");
//!
//! // Add an error with entity reference
//! diag.add_error_with_entity("reference", "Conduit references missing node", "CONDUITS C1");
//!
//! // Check results
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.error_count(), 1);
//! ```

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but operation continued (e.g., duplicate key resolved last-write-wins)
    Warning,
    /// Could not handle element/field as written (e.g., malformed numeric)
    Error,
}

/// A single diagnostic issue encountered during an operation
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    /// Severity of the issue
    pub severity: Severity,
    /// Category for grouping ("parse", "type", "duplicate-key", "reference", "validation")
    pub category: String,
    /// Human-readable description of the issue
    pub message: String,
    /// Optional line number (for file-based operations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Optional entity reference (e.g., "JUNCTIONS J12")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    /// Create a new diagnostic issue
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            line: None,
            entity: None,
        }
    }

    /// Add line number to the issue
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Add entity reference to the issue
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        }
        Ok(())
    }
}

/// Statistics about a build/parse operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    pub sections: usize,
    pub rows: usize,
    pub opaque_sections: usize,
    pub skipped_lines: usize,
}

/// Complete diagnostics for a build or validation operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub stats: BuildStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    /// Create new empty diagnostics
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning issue
    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    /// Add a warning with line number
    pub fn add_warning_at_line(&mut self, category: &str, message: &str, line: usize) {
        self.issues.push(
            DiagnosticIssue::new(Severity::Warning, category, message).with_line(line),
        );
    }

    /// Add a warning with an entity reference (e.g., "JUNCTIONS J12")
    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues.push(
            DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity),
        );
    }

    /// Add an error issue
    pub fn add_error(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message));
    }

    /// Add an error with line number
    pub fn add_error_at_line(&mut self, category: &str, message: &str, line: usize) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_line(line));
        self.stats.skipped_lines += 1;
    }

    /// Add an error with an entity reference
    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues.push(
            DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity),
        );
    }

    /// Push a pre-built issue
    pub fn push(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    /// Count warnings
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Count errors
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Count issues in a category
    pub fn category_count(&self, category: &str) -> usize {
        self.issues.iter().filter(|i| i.category == category).count()
    }

    /// Check if there are any issues
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Check if there are any error-severity issues
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Merge another diagnostics into this one (for combining parse + validation)
    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
        // Stats are not merged - they should be set by the builder
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_counts() {
        let mut diag = Diagnostics::new();
        diag.add_warning("parse", "test warning");
        diag.add_error("parse", "test error");
        diag.add_warning_at_line("type", "line warning", 42);

        assert_eq!(diag.warning_count(), 2);
        assert_eq!(diag.error_count(), 1);
        assert_eq!(diag.category_count("parse"), 2);
        assert!(diag.has_issues());
    }

    #[test]
    fn test_diagnostics_serialization() {
        let mut diag = Diagnostics::new();
        diag.stats.sections = 4;
        diag.stats.rows = 120;
        diag.add_warning_at_line("duplicate-key", "Duplicate junction J1", 47);

        let json = serde_json::to_string_pretty(&diag).unwrap();
        assert!(json.contains("\"sections\": 4"));
        assert!(json.contains("\"warning\""));
        assert!(json.contains("\"line\": 47"));
    }

    #[test]
    fn test_issue_display() {
        let issue = DiagnosticIssue::new(Severity::Error, "type", "not a number: 'abc'")
            .with_entity("JUNCTIONS J1")
            .with_line(12);
        let text = issue.to_string();
        assert!(text.contains("[error:type]"));
        assert!(text.contains("JUNCTIONS J1"));
        assert!(text.contains("line 12"));
    }

    #[test]
    fn test_merge() {
        let mut a = Diagnostics::new();
        a.add_warning("parse", "w");
        let mut b = Diagnostics::new();
        b.add_error("reference", "e");
        a.merge(b);
        assert_eq!(a.issues.len(), 2);
    }
}
