use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::IngestError;
use crate::table::{Table, Value};

/// Read the first worksheet of an Excel workbook into a Table
/// The first row is the header; remaining rows are data
pub fn read_excel(path: &Path) -> Result<Table, IngestError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| IngestError::Malformed(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::Malformed("workbook has no worksheets".to_string()))?
        .map_err(|e| IngestError::Malformed(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(IngestError::MissingHeader)?;
    let columns: Vec<String> = header.iter().map(cell_to_header).collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(IngestError::MissingHeader);
    }

    let data_rows: Vec<Vec<Value>> = rows
        .map(|row| row.iter().map(cell_to_value).collect())
        .collect();

    Ok(Table::new(columns, data_rows))
}

fn cell_to_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => {
            if s.trim().is_empty() {
                Value::Null
            } else {
                Value::Text(s.clone())
            }
        }
        Data::Int(i) => Value::Int(*i),
        // Excel stores numbers as floats; whole values come back as Int so
        // integer-coded columns stay usable for stratification
        Data::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
                Value::Int(*f as i64)
            } else {
                Value::Float(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        other => Value::Text(other.to_string()),
    }
}
