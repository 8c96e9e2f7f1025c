use std::path::Path;

use thiserror::Error;

use crate::table::Table;

pub mod archive;
pub mod csv;
pub mod excel;

pub use self::archive::bundle_zip;
pub use self::csv::{read_csv, write_csv};
pub use self::excel::read_excel;

/// Errors raised while loading a dataset
/// These are unrecovered: a failed load leaves the session without a table
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file format: .{0} (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat(String),

    #[error("file has no header row")]
    MissingHeader,

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read a tabular file into a Table
/// The declared format is the file extension: csv parses as delimited text,
/// xlsx/xls as a spreadsheet
pub fn read_table(path: &Path) -> Result<Table, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => csv::read_csv(path),
        "xlsx" | "xls" => excel::read_excel(path),
        other => Err(IngestError::UnsupportedFormat(other.to_string())),
    }
}
