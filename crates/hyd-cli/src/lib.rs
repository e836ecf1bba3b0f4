//! Command-line front end for the hyd toolkit.

pub mod cli;

pub use cli::{build_cli_command, Cli, Commands, GraphCommands};
