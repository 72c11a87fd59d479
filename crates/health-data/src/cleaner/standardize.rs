//! Z-score standardization of selected columns.

use indexmap::IndexMap;

use crate::profiler::statistics::{mean, numeric_values, population_variance};
use crate::types::{Row, Value};

/// Mean and population standard deviation of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnScale {
    pub mean: f64,
    pub std_dev: f64,
}

impl ColumnScale {
    /// Z-score of `value`; a constant column maps to 0.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std_dev != 0.0 {
            (value - self.mean) / self.std_dev
        } else {
            0.0
        }
    }
}

/// Scales for the requested columns that hold at least one numeric value.
pub fn column_scales(rows: &[Row], columns: &[String]) -> IndexMap<String, ColumnScale> {
    columns
        .iter()
        .filter_map(|column| {
            let values = numeric_values(rows, column);
            if values.is_empty() {
                return None;
            }
            let mean = mean(&values);
            let std_dev = population_variance(&values, mean).sqrt();
            Some((column.clone(), ColumnScale { mean, std_dev }))
        })
        .collect()
}

/// Replace every numeric, non-missing cell of `columns` with its z-score.
///
/// Missing and non-numeric cells are left as they are.
pub fn standardize(rows: &[Row], columns: &[String]) -> Vec<Row> {
    if rows.is_empty() || columns.is_empty() {
        return rows.to_vec();
    }

    let scales = column_scales(rows, columns);

    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            for (column, scale) in &scales {
                if let Some(cell) = row.get_mut(column)
                    && !cell.is_missing()
                    && let Some(value) = cell.as_lenient_f64()
                {
                    *cell = Value::Number(scale.z_score(value));
                }
            }
            row
        })
        .collect()
}
