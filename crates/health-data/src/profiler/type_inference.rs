//! Column type inference from a single sample row.
//!
//! Precedence is boolean, numeric, date, string. A value such as `"2024"`
//! therefore classifies as numeric rather than date.

use indexmap::IndexMap;

use crate::types::{ColumnType, Row, Value};
use crate::utils::parse_date;

/// Classify one sample value.
pub fn infer_value_type(value: &Value) -> ColumnType {
    if matches!(value, Value::Bool(_)) {
        return ColumnType::Boolean;
    }

    if value.as_strict_f64().is_some() {
        return ColumnType::Numeric;
    }

    if let Value::Text(s) = value
        && parse_date(s).is_some()
    {
        return ColumnType::Date;
    }

    ColumnType::String
}

/// Classify every column of `sample`, in column order.
///
/// The result is informational; statistics re-derive numeric versus
/// categorical from the full column.
pub fn infer_column_types(sample: &Row) -> IndexMap<String, ColumnType> {
    sample
        .iter()
        .map(|(name, value)| (name.clone(), infer_value_type(value)))
        .collect()
}
