//! Serializers back to the textual formats.
//!
//! - [`inp`]: render a [`hyd_core::Document`] to INP text, preserving the
//!   stored section order, opaque sections verbatim and untouched rows
//!   byte-for-byte
//! - [`report_csv`]: export extracted report tables to CSV

pub mod inp;
pub mod report_csv;

pub use inp::{render, write_inp};
pub use report_csv::{table_csv_string, write_table_csv};
