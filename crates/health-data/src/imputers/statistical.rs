//! Statistical imputation of missing cells.
//!
//! Provides whole-row removal and mean, median, mode and zero filling.

use indexmap::IndexMap;
use tracing::debug;

use crate::config::MissingValueStrategy;
use crate::profiler::statistics::{column_names, mean, median_sorted, numeric_values, sort_ascending};
use crate::types::{Row, Value, format_number};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Apply `strategy` to `rows`, recording what happened in `processing_steps`.
    pub fn apply(
        rows: &[Row],
        strategy: MissingValueStrategy,
        processing_steps: &mut Vec<String>,
    ) -> Vec<Row> {
        if rows.is_empty() {
            return Vec::new();
        }

        if strategy == MissingValueStrategy::Remove {
            let kept: Vec<Row> = rows
                .iter()
                .filter(|row| row.values().all(|v| !v.is_missing()))
                .cloned()
                .collect();
            processing_steps.push(format!(
                "Removed {} row(s) containing missing values",
                rows.len() - kept.len()
            ));
            return kept;
        }

        let replacements = Self::replacement_values(rows, strategy);
        let mut filled_cells = 0usize;

        let result = rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                for (column, replacement) in &replacements {
                    if row.get(column).is_none_or(Value::is_missing) {
                        row.insert(column.clone(), replacement.clone());
                        filled_cells += 1;
                    }
                }
                row
            })
            .collect();

        for (column, replacement) in &replacements {
            debug!("Replacement for '{}': {}", column, replacement);
        }
        processing_steps.push(format!(
            "Filled {} missing cell(s) across {} column(s) using {}",
            filled_cells,
            replacements.len(),
            strategy.as_str()
        ));

        result
    }

    /// One replacement per column with at least one numeric value.
    ///
    /// Columns without numeric values get no entry and stay missing.
    pub fn replacement_values(
        rows: &[Row],
        strategy: MissingValueStrategy,
    ) -> IndexMap<String, Value> {
        column_names(rows)
            .into_iter()
            .filter_map(|column| {
                let values = numeric_values(rows, &column);
                if values.is_empty() {
                    return None;
                }
                Some((column, Self::replacement_for(values, strategy)))
            })
            .collect()
    }

    /// Replacement computed from a non-empty set of numeric values.
    pub fn replacement_for(mut values: Vec<f64>, strategy: MissingValueStrategy) -> Value {
        match strategy {
            MissingValueStrategy::Mean => Value::Number(mean(&values)),
            MissingValueStrategy::Median => {
                sort_ascending(&mut values);
                Value::Number(median_sorted(&values))
            }
            MissingValueStrategy::Mode => Self::mode(&values).map_or(Value::Null, Value::Number),
            MissingValueStrategy::Zero => Value::Number(0.0),
            MissingValueStrategy::Remove | MissingValueStrategy::Unrecognized => Value::Null,
        }
    }

    /// Most frequent value; the first value to reach the top count wins.
    fn mode(values: &[f64]) -> Option<f64> {
        let mut frequency: IndexMap<String, (f64, usize)> = IndexMap::new();
        for &value in values {
            frequency.entry(format_number(value)).or_insert((value, 0)).1 += 1;
        }

        let mut best = None;
        let mut max_count = 0;
        for &(value, count) in frequency.values() {
            if count > max_count {
                max_count = count;
                best = Some(value);
            }
        }
        best
    }
}

/// Handle missing values without keeping a step log.
pub fn handle_missing_values(rows: &[Row], strategy: MissingValueStrategy) -> Vec<Row> {
    StatisticalImputer::apply(rows, strategy, &mut Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn column(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| Row::from([("a".to_string(), v)]))
            .collect()
    }

    #[test]
    fn test_mean_imputation() {
        let rows = column(vec![Value::Number(1.0), Value::Null, Value::Number(3.0)]);
        let result = handle_missing_values(&rows, MissingValueStrategy::Mean);
        assert_eq!(result[1]["a"], Value::Number(2.0));
        assert_eq!(result[0]["a"], Value::Number(1.0));
    }

    #[test]
    fn test_median_imputation() {
        let rows = column(vec![
            Value::Number(10.0),
            Value::from(""),
            Value::Number(1.0),
            Value::Number(4.0),
            Value::Number(3.0),
        ]);
        let result = handle_missing_values(&rows, MissingValueStrategy::Median);
        assert_eq!(result[1]["a"], Value::Number(3.5));
    }

    #[test]
    fn test_mode_imputation_first_max_wins() {
        let rows = column(vec![
            Value::Number(5.0),
            Value::Number(2.0),
            Value::Null,
            Value::Number(2.0),
            Value::Number(5.0),
        ]);
        let result = handle_missing_values(&rows, MissingValueStrategy::Mode);
        assert_eq!(result[2]["a"], Value::Number(5.0));
    }

    #[test]
    fn test_zero_imputation() {
        let rows = column(vec![Value::Number(5.0), Value::Null]);
        let result = handle_missing_values(&rows, MissingValueStrategy::Zero);
        assert_eq!(result[1]["a"], Value::Number(0.0));
    }

    #[test]
    fn test_remove_drops_rows_with_any_missing_value() {
        let rows = vec![
            Row::from([("a".to_string(), Value::Number(1.0)), ("b".to_string(), Value::from("x"))]),
            Row::from([("a".to_string(), Value::Number(2.0)), ("b".to_string(), Value::from(""))]),
            Row::from([("a".to_string(), Value::Null), ("b".to_string(), Value::from("y"))]),
        ];
        let mut steps = Vec::new();
        let result = StatisticalImputer::apply(&rows, MissingValueStrategy::Remove, &mut steps);

        assert_eq!(result, vec![rows[0].clone()]);
        assert_eq!(steps, vec!["Removed 2 row(s) containing missing values".to_string()]);
    }

    #[test]
    fn test_text_only_column_stays_missing() {
        let rows = vec![
            Row::from([("a".to_string(), Value::Number(1.0)), ("b".to_string(), Value::from("x"))]),
            Row::from([("a".to_string(), Value::Number(3.0)), ("b".to_string(), Value::Null)]),
        ];
        let result = handle_missing_values(&rows, MissingValueStrategy::Mean);
        assert_eq!(result[1]["b"], Value::Null);
    }

    #[test]
    fn test_unrecognized_strategy_sets_null() {
        let rows = column(vec![Value::Number(1.0), Value::from("")]);
        let result = handle_missing_values(&rows, MissingValueStrategy::Unrecognized);
        assert_eq!(result[1]["a"], Value::Null);
    }

    #[test]
    fn test_absent_key_is_filled() {
        let rows = vec![
            Row::from([("a".to_string(), Value::Number(4.0)), ("b".to_string(), Value::Number(1.0))]),
            Row::from([("b".to_string(), Value::Number(2.0))]),
        ];
        let result = handle_missing_values(&rows, MissingValueStrategy::Mean);
        assert_eq!(result[1].get("a"), Some(&Value::Number(4.0)));
    }

    #[test]
    fn test_empty_rows() {
        assert!(handle_missing_values(&[], MissingValueStrategy::Mean).is_empty());
    }
}
