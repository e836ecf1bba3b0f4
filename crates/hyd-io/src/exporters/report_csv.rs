//! CSV export for extracted report tables.

use std::path::Path;

use hyd_core::{HydError, HydResult};

use crate::report::ReportTable;

/// Write one report table to a CSV file (header row + records).
pub fn write_table_csv(table: &ReportTable, path: impl AsRef<Path>) -> HydResult<()> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    write_into(table, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Render one report table as a CSV string.
pub fn table_csv_string(table: &ReportTable) -> HydResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_into(table, &mut writer)?;
    let bytes = writer.into_inner().map_err(|e| HydError::Other(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| HydError::Other(e.to_string()))
}

fn write_into<W: std::io::Write>(
    table: &ReportTable,
    writer: &mut csv::Writer<W>,
) -> HydResult<()> {
    writer.write_record(&table.columns).map_err(csv_error)?;
    for row in table.rows() {
        let record: Vec<String> = row.iter().map(|v| v.to_token()).collect();
        writer.write_record(&record).map_err(csv_error)?;
    }
    Ok(())
}

fn csv_error(err: csv::Error) -> HydError {
    HydError::Other(err.to_string())
}
