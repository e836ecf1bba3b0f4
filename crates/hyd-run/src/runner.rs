//! Blocking engine subprocess invocation.
//!
//! The engine boundary is deliberately thin: hand the binary a serialized
//! INP path and an expected RPT path, get back the exit status and captured
//! stdout/stderr, then hand the report text to the extractor. The runner
//! never interprets solver behavior; the report is the authoritative
//! record of what the engine did.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use hyd_core::Dialect;
use hyd_io::importers::parse_rpt;
use hyd_io::report::RunStatus;

use crate::config::EngineConfig;
use crate::error::{EngineError, ExitCode};

/// The simulation engines the runner knows how to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Epanet,
    Swmm,
}

impl EngineKind {
    pub const ALL: &'static [EngineKind] = &[EngineKind::Epanet, EngineKind::Swmm];

    /// Conventional CLI binary name for the engine.
    pub fn binary_name(&self) -> &'static str {
        match self {
            EngineKind::Epanet => "runepanet",
            EngineKind::Swmm => "runswmm",
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            EngineKind::Epanet => Dialect::Epanet,
            EngineKind::Swmm => Dialect::Swmm,
        }
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Epanet => EngineKind::Epanet,
            Dialect::Swmm => EngineKind::Swmm,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EngineKind::Epanet => "epanet",
            EngineKind::Swmm => "swmm",
        })
    }
}

impl std::str::FromStr for EngineKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "epanet" => Ok(EngineKind::Epanet),
            "swmm" => Ok(EngineKind::Swmm),
            other => Err(EngineError::UnknownEngine(other.to_string())),
        }
    }
}

/// Progress hook: `(percent, message)`.
pub type ProgressCallback = Box<dyn Fn(u8, &str) + Send>;

/// Result of one engine invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub inp_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpt_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_code: Option<i32>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

impl RunOutcome {
    fn not_run(inp_path: &Path) -> Self {
        Self {
            status: RunStatus::NotRun,
            inp_path: inp_path.to_path_buf(),
            rpt_path: None,
            out_path: None,
            return_code: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            stdout: String::new(),
            stderr: String::new(),
            duration_seconds: None,
        }
    }
}

/// An engine invocation handle: binary location plus progress plumbing.
pub struct EngineRunner {
    kind: EngineKind,
    binary_path: PathBuf,
    progress: Option<ProgressCallback>,
}

impl EngineRunner {
    /// Use an explicit engine binary.
    pub fn new(kind: EngineKind, binary_path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            binary_path: binary_path.into(),
            progress: None,
        }
    }

    /// Find the engine binary in standard locations.
    ///
    /// Search order:
    /// 1. Explicit path in the config file
    /// 2. `~/.hyd/engines/<binary_name>`
    /// 3. System PATH
    pub fn discover(kind: EngineKind, config: &EngineConfig) -> Result<Self, EngineError> {
        let configured = match kind {
            EngineKind::Epanet => config.epanet_path.as_ref(),
            EngineKind::Swmm => config.swmm_path.as_ref(),
        };
        if let Some(path) = configured {
            if path.exists() {
                return Ok(Self::new(kind, path));
            }
            warn!(
                "configured {} binary {} does not exist; falling back to discovery",
                kind,
                path.display()
            );
        }

        let binary_name = kind.binary_name();
        if let Some(home) = dirs::home_dir() {
            let hyd_path = home.join(".hyd").join("engines").join(binary_name);
            if hyd_path.exists() {
                return Ok(Self::new(kind, hyd_path));
            }
        }

        if let Ok(path) = which::which(binary_name) {
            return Ok(Self::new(kind, path));
        }

        Err(EngineError::NotInstalled {
            engine: kind.to_string(),
            hint: binary_name.to_string(),
        })
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Install a `(percent, message)` progress hook.
    pub fn set_progress_callback(&mut self, callback: impl Fn(u8, &str) + Send + 'static) {
        self.progress = Some(Box::new(callback));
    }

    fn report_progress(&self, percent: u8, message: &str) {
        if let Some(callback) = &self.progress {
            callback(percent, message);
        }
    }

    /// Run the engine on a model file.
    ///
    /// Output paths default to the model path with `.rpt`/`.out` suffixes.
    /// Failures are reported through the outcome, not as `Err`; a failed
    /// run is still an answer.
    pub fn run(&self, inp_path: &Path, rpt_path: Option<&Path>, out_path: Option<&Path>) -> RunOutcome {
        let mut outcome = RunOutcome::not_run(inp_path);

        if !inp_path.is_file() {
            outcome.status = RunStatus::Error;
            outcome
                .errors
                .push(format!("INP file not found: {}", inp_path.display()));
            return outcome;
        }

        let rpt_path = rpt_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| inp_path.with_extension("rpt"));
        let out_path = out_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| inp_path.with_extension("out"));
        outcome.rpt_path = Some(rpt_path.clone());
        outcome.out_path = Some(out_path.clone());

        self.report_progress(10, "Starting simulation...");
        info!(
            "running {} on {} -> {}",
            self.kind,
            inp_path.display(),
            rpt_path.display()
        );
        let start = Instant::now();

        let output = match Command::new(&self.binary_path)
            .arg(inp_path)
            .arg(&rpt_path)
            .arg(&out_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                outcome.status = RunStatus::Error;
                outcome
                    .errors
                    .push(EngineError::ProcessStart(err).to_string());
                outcome.duration_seconds = Some(start.elapsed().as_secs_f64());
                return outcome;
            }
        };

        outcome.duration_seconds = Some(start.elapsed().as_secs_f64());
        outcome.return_code = output.status.code();
        outcome.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        outcome.stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        self.report_progress(80, "Simulation finished, reading report...");
        let exit_code = ExitCode::from_raw(output.status.code().unwrap_or(-1));
        debug!("engine exited with {:?}", exit_code);

        if !exit_code.is_success() {
            outcome.status = RunStatus::Error;
            let stderr = outcome.stderr.trim();
            outcome.errors.push(
                EngineError::ProcessFailed {
                    exit_code,
                    message: stderr.to_string(),
                }
                .to_string(),
            );
        }

        // The report carries the warnings/errors of the run itself.
        if rpt_path.is_file() {
            match parse_rpt(&rpt_path, self.kind.dialect()) {
                Ok(bundle) => {
                    outcome.warnings.extend(bundle.warnings.iter().cloned());
                    outcome.errors.extend(bundle.errors.iter().cloned());
                    if outcome.status != RunStatus::Error {
                        outcome.status = bundle.status();
                    }
                }
                Err(err) => {
                    outcome
                        .warnings
                        .push(format!("report could not be parsed: {err}"));
                    if outcome.status != RunStatus::Error {
                        outcome.status = RunStatus::Warning;
                    }
                }
            }
        } else if exit_code.is_success() {
            outcome
                .warnings
                .push(EngineError::MissingReport(rpt_path.clone()).to_string());
            outcome.status = RunStatus::Warning;
        }

        self.report_progress(100, &format!("Simulation finished: {}", outcome.status));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_engine_kind_round_trip() {
        for kind in EngineKind::ALL {
            let parsed: EngineKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert!("mike".parse::<EngineKind>().is_err());
    }

    #[test]
    fn test_missing_inp_yields_error_outcome() {
        let runner = EngineRunner::new(EngineKind::Swmm, "/nonexistent/runswmm");
        let outcome = runner.run(Path::new("nonexistent.inp"), None, None);
        assert_eq!(outcome.status, RunStatus::Error);
        assert!(outcome.errors[0].to_lowercase().contains("not found"));
        assert!(outcome.return_code.is_none());
    }

    #[test]
    fn test_missing_binary_yields_error_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let inp = dir.path().join("model.inp");
        std::fs::write(&inp, "[JUNCTIONS]\nJ1 10.0\n").unwrap();

        let runner = EngineRunner::new(EngineKind::Swmm, "/nonexistent/runswmm");
        let outcome = runner.run(&inp, None, None);
        assert_eq!(outcome.status, RunStatus::Error);
        assert!(outcome.errors[0].contains("Failed to start engine process"));
        // Derived output paths are still reported.
        let expected_rpt = dir.path().join("model.rpt");
        assert_eq!(outcome.rpt_path.as_deref(), Some(expected_rpt.as_path()));
    }

    #[test]
    fn test_progress_callback_receives_messages() {
        let calls: Arc<Mutex<Vec<(u8, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);

        let mut runner = EngineRunner::new(EngineKind::Epanet, "/nonexistent/runepanet");
        runner.set_progress_callback(move |pct, msg| {
            sink.lock().unwrap().push((pct, msg.to_string()));
        });
        runner.report_progress(50, "halfway");

        let seen = calls.lock().unwrap();
        assert_eq!(seen.as_slice(), &[(50, "halfway".to_string())]);
    }

    #[test]
    fn test_discover_not_installed() {
        // Nonexistent configured path falls through to discovery, which
        // cannot find a binary with this name either.
        let config = EngineConfig {
            epanet_path: Some(PathBuf::from("/definitely/not/here/runepanet")),
            ..EngineConfig::default()
        };
        let result = EngineRunner::discover(EngineKind::Epanet, &config);
        assert!(matches!(result, Err(EngineError::NotInstalled { .. })));
    }

    #[test]
    fn test_discover_prefers_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("runswmm");
        std::fs::write(&binary, "#!/bin/sh\n").unwrap();

        let config = EngineConfig {
            swmm_path: Some(binary.clone()),
            ..EngineConfig::default()
        };
        let runner = EngineRunner::discover(EngineKind::Swmm, &config).unwrap();
        assert_eq!(runner.binary_path(), binary.as_path());
    }
}
