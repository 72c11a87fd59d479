use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::{parse_leading_float, parse_strict_number};

/// A single loosely-typed cell.
///
/// Serialized untagged so a row round-trips through JSON exactly as the
/// document store holds it (`null`, `true`, `3.5`, `"text"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Null and the empty string count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Truthiness as a dynamically-typed frontend sees it.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Lenient numeric reading: a leading numeric prefix of text counts.
    ///
    /// Booleans and nulls never read as numbers here.
    pub fn as_lenient_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Text(s) => parse_leading_float(s),
            _ => None,
        }
    }

    /// Whole-value numeric coercion: blank text and null are zero, booleans 0/1.
    pub fn as_strict_f64(&self) -> Option<f64> {
        match self {
            Value::Null => Some(0.0),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Number(_) => None,
            Value::Text(s) => parse_strict_number(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Renders the value the way it becomes a grouping key.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Format a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// One record of a dataset: column name to value, in column order.
pub type Row = IndexMap<String, Value>;

/// Per-column statistics keyed by column name, in column order.
pub type Summary = IndexMap<String, ColumnStatistics>;

/// Column classification derived from a single sample row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Date,
    Boolean,
    String,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
        }
    }
}

/// Statistics for a column where at least one value reads as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericStatistics {
    pub count: usize,
    pub missing_count: usize,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub outlier_count: usize,
}

/// Statistics for a column with no numeric values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalStatistics {
    pub count: usize,
    pub missing_count: usize,
    pub unique_count: usize,
    pub mode: Option<String>,
    pub mode_frequency: usize,
    pub mode_percentage: f64,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub categories: IndexMap<String, usize>,
}

/// Descriptive statistics for one column, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnStatistics {
    Numeric(NumericStatistics),
    Categorical(CategoricalStatistics),
}

impl ColumnStatistics {
    pub fn count(&self) -> usize {
        match self {
            ColumnStatistics::Numeric(s) => s.count,
            ColumnStatistics::Categorical(s) => s.count,
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnStatistics::Numeric(s) => s.missing_count,
            ColumnStatistics::Categorical(s) => s.missing_count,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericStatistics> {
        match self {
            ColumnStatistics::Numeric(s) => Some(s),
            ColumnStatistics::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&CategoricalStatistics> {
        match self {
            ColumnStatistics::Categorical(s) => Some(s),
            ColumnStatistics::Numeric(_) => None,
        }
    }
}

/// How an upload was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    /// Comma-separated file read through the CSV reader.
    Csv,
    /// Any other flat file; delimiter and header are inferred.
    DelimitedText,
}

/// Rows decoded from an upload, before anything is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDataset {
    pub name: String,
    pub file_name: String,
    pub file_size: usize,
    pub file_type: FileType,
    pub rows: Vec<Row>,
}

impl ParsedDataset {
    /// Column names of the first row.
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Persisted description of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub file_name: String,
    pub file_size: usize,
    pub file_type: FileType,
    pub column_types: IndexMap<String, ColumnType>,
    pub summary: Summary,
    pub row_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl DatasetMetadata {
    /// Copy with per-column category frequencies dropped, for listings.
    pub fn without_categories(&self) -> DatasetMetadata {
        let mut listing = self.clone();
        for stats in listing.summary.values_mut() {
            if let ColumnStatistics::Categorical(categorical) = stats {
                categorical.categories.clear();
            }
        }
        listing
    }
}
