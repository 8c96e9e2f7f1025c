use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::Result;
use csv::{ReaderBuilder, WriterBuilder};

use super::IngestError;
use crate::table::{ColumnType, Table, Value};

/// Read a CSV file with a header row into a Table
pub fn read_csv(path: &Path) -> Result<Table, IngestError> {
    let file = File::open(path)?;
    read_csv_from(BufReader::new(file))
}

/// Read CSV from any reader
/// Column types are inferred from the data: all-integer columns become Int,
/// all-numeric become Float, all-true/false become Bool, everything else Text.
/// Empty fields are Null and never veto a column's type.
pub fn read_csv_from<R: Read>(reader: R) -> Result<Table, IngestError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| IngestError::Malformed(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(IngestError::MissingHeader);
    }
    let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

    let mut raw: Vec<Vec<String>> = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| IngestError::Malformed(e.to_string()))?;
        raw.push(record.iter().map(|f| f.to_string()).collect());
    }

    let dtypes: Vec<ColumnType> = (0..columns.len()).map(|j| infer_dtype(&raw, j)).collect();

    let rows: Vec<Vec<Value>> = raw
        .into_iter()
        .map(|record| {
            record
                .into_iter()
                .zip(&dtypes)
                .map(|(field, dtype)| parse_field(field, *dtype))
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows))
}

/// Serialize a Table to CSV bytes: UTF-8, comma-delimited, header row,
/// no index column
pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(table.column_names())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|v| v.render()))?;
    }
    Ok(wtr.into_inner()?)
}

fn infer_dtype(raw: &[Vec<String>], column: usize) -> ColumnType {
    let mut seen_any = false;
    let mut all_int = true;
    let mut all_num = true;
    let mut all_bool = true;

    for record in raw {
        let field = record[column].trim();
        if field.is_empty() {
            continue;
        }
        seen_any = true;
        if all_int && field.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_num && field.parse::<f64>().is_err() {
            all_num = false;
        }
        if all_bool && parse_bool(field).is_none() {
            all_bool = false;
        }
        if !all_int && !all_num && !all_bool {
            return ColumnType::Text;
        }
    }

    if !seen_any {
        ColumnType::Text
    } else if all_int {
        ColumnType::Int
    } else if all_num {
        ColumnType::Float
    } else if all_bool {
        ColumnType::Bool
    } else {
        ColumnType::Text
    }
}

fn parse_field(field: String, dtype: ColumnType) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match dtype {
        ColumnType::Int => trimmed
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or(Value::Text(field)),
        ColumnType::Float => trimmed
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Text(field)),
        ColumnType::Bool => parse_bool(trimmed)
            .map(Value::Bool)
            .unwrap_or(Value::Text(field)),
        ColumnType::Text => Value::Text(field),
    }
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}
