//! Unified error types for the hyd ecosystem
//!
//! This module provides a common error type [`HydError`] that can represent
//! errors from any part of the system. Domain-specific error types can be
//! converted to `HydError` for uniform error handling at API boundaries.
//!
//! # Example
//!
//! ```ignore
//! use hyd_core::{HydError, HydResult};
//!
//! fn process_model(path: &str) -> HydResult<()> {
//!     let document = load_model(path)?;
//!     write_model(&document)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all hyd operations.
///
/// This enum provides a common error representation for the hyd ecosystem,
/// allowing errors from I/O, parsing, mutation, and engine invocation to be
/// handled uniformly.
///
/// Fatal parse failures use [`HydError::Parse`]; recoverable per-row issues
/// (bad field types, duplicate keys, dangling references) are *not* errors;
/// they are collected as [`crate::diagnostics::DiagnosticIssue`]s alongside a
/// still-usable document.
#[derive(Error, Debug)]
pub enum HydError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing errors that make the input unusable as a whole
    #[error("Parse error: {0}")]
    Parse(String),

    /// Mutation rejected (primary-key uniqueness, missing required field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lookup failed (unknown section or row key on update/remove)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// External simulation-engine errors
    #[error("Engine error: {0}")]
    Engine(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using HydError.
pub type HydResult<T> = Result<T, HydError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for HydError {
    fn from(err: anyhow::Error) -> Self {
        HydError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for HydError {
    fn from(s: String) -> Self {
        HydError::Other(s)
    }
}

impl From<&str> for HydError {
    fn from(s: &str) -> Self {
        HydError::Other(s.to_string())
    }
}

// JSON serialization errors
impl From<serde_json::Error> for HydError {
    fn from(err: serde_json::Error) -> Self {
        HydError::Parse(err.to_string())
    }
}
