//! Turning uploaded bytes into rows.
//!
//! `.csv` uploads go through polars ([`csv`]); every other flat file goes
//! through [`parse_delimited_text`], which infers the delimiter and header
//! from the first non-blank line ([`delimiter`]).

pub mod csv;
pub mod delimiter;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{DatasetError, Result};
use crate::types::{FileType, ParsedDataset, Row, Value};
use crate::utils::parse_numeric_field;

pub use delimiter::{Schema, detect_delimiter};

/// Options shared by the CSV and delimited-text parsers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail on a row whose field count differs from the header instead of dropping it.
    pub strict: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Parse delimited text, silently dropping ragged rows.
pub fn parse_delimited_text(text: &str) -> Vec<Row> {
    let mut dropped = 0usize;
    let rows = build_rows(text, |_, _, _| {
        dropped += 1;
        Ok(())
    });
    if dropped > 0 {
        debug!("Dropped {} row(s) with a mismatched field count", dropped);
    }
    // Permissive mode never produces an error.
    rows.unwrap_or_default()
}

/// Parse delimited text with explicit options.
pub fn parse_delimited_text_with(text: &str, options: ParseOptions) -> Result<Vec<Row>> {
    if !options.strict {
        return Ok(parse_delimited_text(text));
    }
    build_rows(text, |line, expected, found| {
        Err(DatasetError::MalformedRow {
            line,
            expected,
            found,
        })
    })
}

/// `on_ragged(line_number, expected, found)` decides what happens to a row
/// whose field count does not match; returning `Ok` skips it.
fn build_rows<F>(text: &str, mut on_ragged: F) -> Result<Vec<Row>>
where
    F: FnMut(usize, usize, usize) -> Result<()>,
{
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, first_line)) = lines.next() else {
        return Ok(Vec::new());
    };

    let schema = Schema::infer(first_line);
    debug!(
        "Inferred delimiter {:?}, header: {}, {} column(s)",
        schema.delimiter,
        schema.has_header,
        schema.columns.len()
    );

    let data_lines: Box<dyn Iterator<Item = (usize, &str)>> = if schema.has_header {
        Box::new(lines)
    } else {
        Box::new(std::iter::once((0, first_line)).chain(lines))
    };

    // A repeated header name keeps its first slot and the last value.
    let expected = schema.columns.len();
    let mut rows = Vec::new();

    for (idx, line) in data_lines {
        let fields: Vec<&str> = line.split(schema.delimiter).map(str::trim).collect();
        if fields.len() != expected {
            on_ragged(idx + 1, expected, fields.len())?;
            continue;
        }

        let mut row = Row::with_capacity(expected);
        for (name, field) in schema.columns.iter().zip(fields) {
            let value = match parse_numeric_field(field) {
                Some(n) => Value::Number(n),
                None => Value::Text(field.to_string()),
            };
            row.insert(name.clone(), value);
        }
        rows.push(row);
    }

    Ok(rows)
}

/// How an upload with this file name is decoded.
pub fn file_type_for(file_name: &str) -> FileType {
    let is_csv = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        FileType::Csv
    } else {
        FileType::DelimitedText
    }
}

/// Dataset name: the file name without its last extension.
pub fn dataset_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < file_name.len() => file_name[..pos].to_string(),
        _ => file_name.to_string(),
    }
}

/// Decode an upload, dispatching on its extension.
///
/// Fails with [`DatasetError::EmptyDataset`] when no rows result.
pub fn ingest(bytes: &[u8], file_name: &str, options: ParseOptions) -> Result<ParsedDataset> {
    let file_type = file_type_for(file_name);
    info!("Ingesting '{}' ({} bytes) as {:?}", file_name, bytes.len(), file_type);

    let rows = match file_type {
        FileType::Csv => csv::read_csv_bytes(bytes, options)?,
        FileType::DelimitedText => {
            let text = String::from_utf8_lossy(bytes);
            parse_delimited_text_with(&text, options)?
        }
    };

    if rows.is_empty() {
        warn!("'{}' produced no rows", file_name);
        return Err(DatasetError::EmptyDataset);
    }

    Ok(ParsedDataset {
        name: dataset_name(file_name),
        file_name: file_name.to_string(),
        file_size: bytes.len(),
        file_type,
        rows,
    })
}
