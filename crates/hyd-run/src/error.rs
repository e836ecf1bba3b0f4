//! Error types and exit codes for engine communication.

use std::path::PathBuf;

use thiserror::Error;

/// Exit codes reported by simulation engine binaries.
///
/// Both engine CLIs exit 0 on a completed run (warnings included) and
/// nonzero when the run could not be carried out; the report text is the
/// authoritative record of warnings and solver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Completed run (check the report for warnings)
    Success = 0,
    /// Invalid input (unreadable model, bad arguments)
    InvalidInput = 1,
    /// Engine failure (license, numerical issues, crash)
    EngineError = 2,
    /// Killed by signal / no exit code available
    Terminated = -1,
}

impl ExitCode {
    /// Convert from a raw process exit code.
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => ExitCode::Success,
            1 => ExitCode::InvalidInput,
            -1 => ExitCode::Terminated,
            _ => ExitCode::EngineError,
        }
    }

    /// Check if this exit code indicates a completed run.
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

/// Errors that can occur while locating or invoking an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown engine name.
    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    /// Engine binary could not be located.
    #[error("Engine {engine} is not installed. Looked for `{hint}` in the config file, ~/.hyd/engines/ and PATH")]
    NotInstalled { engine: String, hint: String },

    /// Engine process failed to start.
    #[error("Failed to start engine process: {0}")]
    ProcessStart(#[source] std::io::Error),

    /// Engine process exited with a failure code.
    #[error("Engine process failed with exit code {exit_code:?}: {message}")]
    ProcessFailed {
        exit_code: ExitCode,
        message: String,
    },

    /// Engine exited cleanly but produced no report artifact.
    #[error("Engine produced no report at {0}")]
    MissingReport(PathBuf),

    /// Configuration file problems.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<EngineError> for hyd_core::HydError {
    fn from(err: EngineError) -> Self {
        hyd_core::HydError::Engine(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_from_raw() {
        assert_eq!(ExitCode::from_raw(0), ExitCode::Success);
        assert_eq!(ExitCode::from_raw(1), ExitCode::InvalidInput);
        assert_eq!(ExitCode::from_raw(99), ExitCode::EngineError);
        assert_eq!(ExitCode::from_raw(-1), ExitCode::Terminated);
        assert!(ExitCode::Success.is_success());
        assert!(!ExitCode::EngineError.is_success());
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::NotInstalled {
            engine: "epanet".into(),
            hint: "runepanet".into(),
        };
        assert!(err.to_string().contains("runepanet"));
    }
}
