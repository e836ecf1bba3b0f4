//! # hyd-run: External Simulation-Engine Boundary
//!
//! Invokes the EPANET/SWMM engine binaries on serialized model files and
//! hands the resulting report text back to the extractor in `hyd-io`.
//!
//! The engine is an external collaborator: this crate passes it a validated
//! INP path and an expected RPT path, captures exit status and stdio, and
//! never interprets solver behavior itself. Runs are blocking; the engine
//! model is synchronous end to end.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use hyd_run::{EngineConfig, EngineKind, EngineRunner};
//!
//! let config = EngineConfig::load()?;
//! let mut runner = EngineRunner::discover(EngineKind::Swmm, &config)?;
//! runner.set_progress_callback(|pct, msg| eprintln!("[{pct:>3}%] {msg}"));
//!
//! let outcome = runner.run(Path::new("model.inp"), None, None);
//! println!("{}: {} warnings", outcome.status, outcome.warnings.len());
//! # Ok::<(), hyd_run::EngineError>(())
//! ```
//!
//! ## Modules
//!
//! - [`runner`] - engine discovery and blocking invocation
//! - [`validate`] - pre-flight model validation (no engine involved)
//! - [`config`] - `~/.hyd/config.toml` engine locations
//! - [`error`] - [`EngineError`] and process exit codes

pub mod config;
pub mod error;
pub mod runner;
pub mod validate;

pub use config::EngineConfig;
pub use error::{EngineError, ExitCode};
pub use runner::{EngineKind, EngineRunner, ProgressCallback, RunOutcome};
pub use validate::{validate_inp, InpValidation};
