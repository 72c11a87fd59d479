//! Comma-separated files through polars, both directions.
//!
//! Uploads are screened for ragged records, read with [`CsvReadOptions`]
//! with every column as text, and flattened into [`Row`]s; exports rebuild a
//! [`DataFrame`] from the current rows and hand it to [`CsvWriter`].

use std::io::{Cursor, Write};

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::debug;

use super::ParseOptions;
use crate::error::{DatasetError, Result, ResultExt};
use crate::types::{Row, Value};
use crate::utils::parse_numeric_field;

/// Decode a CSV upload (header row required) into rows.
///
/// Every cell is read as text and then converted with the same numeric rule
/// as the delimited-text parser, so a stray marker such as `n/a` deep in a
/// numeric column stays a text cell. Records whose field count differs from
/// the header are dropped, or rejected in strict mode.
pub fn read_csv_bytes(bytes: &[u8], options: ParseOptions) -> Result<Vec<Row>> {
    let screened = screen_records(bytes, options)?;
    if screened.is_empty() {
        return Ok(Vec::new());
    }

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(screened))
        .finish()
        .context("Reading CSV upload")?;

    debug!("CSV upload decoded: {} rows x {} columns", df.height(), df.width());
    dataframe_to_rows(&df).context("Converting CSV frame to rows")
}

/// One physical record: its starting line (1-based), raw bytes and field count.
struct Record<'a> {
    line: usize,
    bytes: &'a [u8],
    fields: usize,
}

/// Split `bytes` into records, honoring double-quoted fields that span lines.
fn split_records(bytes: &[u8]) -> Vec<Record<'_>> {
    let mut records = Vec::new();
    let mut start = 0;
    let mut start_line = 1;
    let mut line = 1;
    let mut fields = 1;
    let mut in_quotes = false;

    for (idx, &byte) in bytes.iter().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => fields += 1,
            b'\n' => {
                line += 1;
                if !in_quotes {
                    records.push(Record {
                        line: start_line,
                        bytes: trim_cr(&bytes[start..idx]),
                        fields,
                    });
                    start = idx + 1;
                    start_line = line;
                    fields = 1;
                }
            }
            _ => {}
        }
    }
    if start < bytes.len() {
        records.push(Record {
            line: start_line,
            bytes: trim_cr(&bytes[start..]),
            fields,
        });
    }

    records
}

fn trim_cr(bytes: &[u8]) -> &[u8] {
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

/// Rebuild the upload from the header and every record matching its width.
fn screen_records(bytes: &[u8], options: ParseOptions) -> Result<Vec<u8>> {
    let mut records = split_records(bytes)
        .into_iter()
        .filter(|record| !record.bytes.trim_ascii().is_empty());

    let Some(header) = records.next() else {
        return Ok(Vec::new());
    };

    let expected = header.fields;
    let mut out = Vec::with_capacity(bytes.len());
    out.extend_from_slice(header.bytes);
    out.push(b'\n');

    let mut dropped = 0usize;
    for record in records {
        if record.fields != expected {
            if options.strict {
                return Err(DatasetError::MalformedRow {
                    line: record.line,
                    expected,
                    found: record.fields,
                });
            }
            dropped += 1;
            continue;
        }
        out.extend_from_slice(record.bytes);
        out.push(b'\n');
    }

    if dropped > 0 {
        debug!("Dropped {} CSV record(s) with a mismatched field count", dropped);
    }
    Ok(out)
}

/// Flatten a frame into rows, keeping column order.
pub fn dataframe_to_rows(df: &DataFrame) -> PolarsResult<Vec<Row>> {
    let columns = df.get_columns();
    let mut rows = Vec::with_capacity(df.height());

    for idx in 0..df.height() {
        let mut row = Row::with_capacity(columns.len());
        for column in columns {
            row.insert(column.name().to_string(), any_value_to_value(column.get(idx)?));
        }
        rows.push(row);
    }

    Ok(rows)
}

fn any_value_to_value(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(_)
        | AnyValue::Int16(_)
        | AnyValue::Int32(_)
        | AnyValue::Int64(_)
        | AnyValue::UInt8(_)
        | AnyValue::UInt16(_)
        | AnyValue::UInt32(_)
        | AnyValue::UInt64(_)
        | AnyValue::Float32(_)
        | AnyValue::Float64(_) => value.extract::<f64>().map(Value::Number).unwrap_or(Value::Null),
        AnyValue::String(s) => text_cell(s),
        AnyValue::StringOwned(s) => text_cell(&s),
        other => Value::Text(format!("{other}")),
    }
}

fn text_cell(s: &str) -> Value {
    match parse_numeric_field(s) {
        Some(n) => Value::Number(n),
        None => Value::Text(s.to_string()),
    }
}

/// Rebuild a frame from rows. Column order follows the first row.
///
/// A column whose non-missing cells are all integral numbers becomes `Int64`,
/// all numbers `Float64`, all booleans `Boolean`; anything else is written as
/// text. Missing cells are null.
pub fn rows_to_dataframe(rows: &[Row]) -> PolarsResult<DataFrame> {
    let Some(first) = rows.first() else {
        return Ok(DataFrame::empty());
    };

    let columns = first
        .keys()
        .map(|name| build_column(name, rows))
        .collect::<Vec<_>>();

    DataFrame::new(columns)
}

fn build_column(name: &str, rows: &[Row]) -> Column {
    let cells: Vec<Option<&Value>> = rows
        .iter()
        .map(|row| row.get(name).filter(|v| !v.is_missing()))
        .collect();

    let present = || cells.iter().flatten();

    if present().all(|v| matches!(v, Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15)) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|cell| match cell {
                Some(Value::Number(n)) => Some(*n as i64),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    if present().all(|v| matches!(v, Value::Number(_))) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| match cell {
                Some(Value::Number(n)) => Some(*n),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    if present().all(|v| matches!(v, Value::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|cell| match cell {
                Some(Value::Bool(b)) => Some(*b),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    let values: Vec<Option<String>> = cells
        .iter()
        .map(|cell| cell.map(|v| v.to_string()))
        .collect();
    Column::new(name.into(), values)
}

/// Write rows as CSV with a header line.
pub fn write_csv<W: Write>(rows: &[Row], writer: W) -> Result<()> {
    let mut df = rows_to_dataframe(rows).context("Building export frame")?;
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)
        .context("Writing CSV export")?;
    Ok(())
}
