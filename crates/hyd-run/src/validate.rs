//! Model validation without running the engine.
//!
//! Parses the model, splits its diagnostics by severity and attaches the
//! element counts: the cheap pre-flight check before handing a file to an
//! engine binary.

use std::path::Path;

use serde::Serialize;

use hyd_core::{Dialect, ModelSummary, Severity};
use hyd_io::importers::{parse_inp, parse_inp_auto};

/// Result of a pre-flight model validation.
#[derive(Debug, Clone, Serialize)]
pub struct InpValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<ModelSummary>,
}

/// Validate an INP file: parse, collect diagnostics, summarize.
///
/// `valid` means the file was usable as a model; per-row findings are
/// reported in `errors`/`warnings` without invalidating the file.
pub fn validate_inp(path: &Path, dialect: Option<Dialect>) -> InpValidation {
    let mut validation = InpValidation {
        valid: false,
        errors: Vec::new(),
        warnings: Vec::new(),
        info: None,
    };

    if !path.is_file() {
        validation
            .errors
            .push(format!("File not found: {}", path.display()));
        return validation;
    }

    let parsed = match dialect {
        Some(dialect) => parse_inp(path, dialect),
        None => parse_inp_auto(path),
    };
    let doc = match parsed {
        Ok(doc) => doc,
        Err(err) => {
            validation.errors.push(err.to_string());
            return validation;
        }
    };

    for issue in &doc.diagnostics().issues {
        match issue.severity {
            Severity::Error => validation.errors.push(issue.to_string()),
            Severity::Warning => validation.warnings.push(issue.to_string()),
        }
    }
    validation.valid = true;
    validation.info = Some(doc.summary());
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_missing_file() {
        let validation = validate_inp(Path::new("nonexistent.inp"), None);
        assert!(!validation.valid);
        assert!(validation.errors[0].contains("not found"));
    }

    #[test]
    fn test_validate_clean_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.inp");
        std::fs::write(
            &path,
            "[JUNCTIONS]\nJ1 10.0\nJ2 8.0\n[CONDUITS]\nC1 J1 J2 100 0.013\n",
        )
        .unwrap();

        let validation = validate_inp(&path, Some(Dialect::Swmm));
        assert!(validation.valid);
        assert!(validation.errors.is_empty());
        assert_eq!(validation.info.unwrap().counts["junctions"], 2);
    }

    #[test]
    fn test_validate_surfaces_diagnostics() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.inp");
        std::fs::write(
            &path,
            "[JUNCTIONS]\nJ1 ten\n[CONDUITS]\nC1 J1 GHOST 100 0.013\n",
        )
        .unwrap();

        let validation = validate_inp(&path, Some(Dialect::Swmm));
        assert!(validation.valid);
        assert_eq!(validation.errors.len(), 1);
        assert_eq!(validation.warnings.len(), 1);
    }
}
