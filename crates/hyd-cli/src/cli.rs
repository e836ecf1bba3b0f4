use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a model file (element counts, diagnostics)
    Summary {
        /// Path to the INP file
        inp: String,
        /// Dialect override (epanet|swmm); auto-detected when omitted
        #[arg(long)]
        dialect: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate a model without running an engine
    Validate {
        /// Path to the INP file
        inp: String,
        /// Dialect override (epanet|swmm)
        #[arg(long)]
        dialect: Option<String>,
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Parse a model and re-serialize it
    Convert {
        /// Path to the input INP file
        input: String,
        /// Output file path
        #[arg(short, long)]
        output: String,
        /// Dialect override (epanet|swmm)
        #[arg(long)]
        dialect: Option<String>,
    },
    /// Topology utilities
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Run a simulation engine on a model
    Run {
        /// Path to the INP file
        inp: String,
        /// Report output path (defaults next to the model)
        #[arg(long)]
        rpt: Option<String>,
        /// Binary results output path (defaults next to the model)
        #[arg(long)]
        out: Option<String>,
        /// Engine to invoke (epanet|swmm); defaults to the model's dialect
        #[arg(long)]
        engine: Option<String>,
        /// Explicit engine binary path (skips discovery)
        #[arg(long)]
        binary: Option<PathBuf>,
        /// Emit the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect a simulation report
    Report {
        /// Path to the RPT file
        rpt: String,
        /// Dialect override (epanet|swmm); auto-detected when omitted
        #[arg(long)]
        dialect: Option<String>,
        /// Print a single table by label (e.g. "node depth summary")
        #[arg(long)]
        table: Option<String>,
        /// Write the selected table as CSV to this path
        #[arg(long)]
        csv: Option<String>,
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Display graph statistics
    Stats {
        /// Path to the INP file
        inp: String,
        /// Dialect override (epanet|swmm)
        #[arg(long)]
        dialect: Option<String>,
    },
    /// Find hydraulically disconnected islands
    Islands {
        /// Path to the INP file
        inp: String,
        /// Also print node -> island assignments
        #[arg(long)]
        emit: bool,
        /// Dialect override (epanet|swmm)
        #[arg(long)]
        dialect: Option<String>,
    },
    /// Export the topology for external visualization
    Export {
        /// Path to the INP file
        inp: String,
        /// Export format (dot)
        #[arg(long, default_value = "dot")]
        format: String,
        /// Write output to a file instead of stdout
        #[arg(long)]
        out: Option<String>,
        /// Dialect override (epanet|swmm)
        #[arg(long)]
        dialect: Option<String>,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
