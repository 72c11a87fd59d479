//! Exact duplicate row removal.

use std::collections::HashSet;

use crate::types::Row;

/// Canonical key of a row: its JSON text, values in column order.
pub fn row_key(row: &Row) -> String {
    serde_json::to_string(row).unwrap_or_else(|_| format!("{row:?}"))
}

/// Keep the first occurrence of every distinct row, preserving order.
pub fn remove_duplicates(rows: &[Row]) -> Vec<Row> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter()
        .filter(|row| seen.insert(row_key(row)))
        .cloned()
        .collect()
}
