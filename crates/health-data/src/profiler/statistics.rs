//! Descriptive statistics per column.
//!
//! A column takes the numeric path when at least one non-missing value has a
//! numeric prefix; otherwise it is summarized as categorical.

use indexmap::IndexMap;

use crate::types::{CategoricalStatistics, ColumnStatistics, NumericStatistics, Row, Summary};

/// Multiplier applied to the IQR when flagging outliers.
pub const OUTLIER_IQR_FACTOR: f64 = 1.5;

/// Column names of a row set, taken from the first row.
pub fn column_names(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Numeric readings of the non-missing cells of `column`, in row order.
pub fn numeric_values(rows: &[Row], column: &str) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| row.get(column))
        .filter(|v| !v.is_missing())
        .filter_map(|v| v.as_lenient_f64())
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (denominator N).
pub fn population_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Median of an ascending slice; the two middle values are averaged for even lengths.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

/// Summarize every column of `rows`. Empty input yields an empty summary.
pub fn summarize(rows: &[Row]) -> Summary {
    column_names(rows)
        .into_iter()
        .map(|name| {
            let stats = column_statistics(rows, &name);
            (name, stats)
        })
        .collect()
}

/// Statistics for one column.
pub fn column_statistics(rows: &[Row], column: &str) -> ColumnStatistics {
    let present: Vec<_> = rows
        .iter()
        .filter_map(|row| row.get(column))
        .filter(|v| !v.is_missing())
        .collect();

    let count = present.len();
    let missing_count = rows.len() - count;

    let mut numbers: Vec<f64> = present.iter().filter_map(|v| v.as_lenient_f64()).collect();

    if numbers.is_empty() {
        let mut categories: IndexMap<String, usize> = IndexMap::new();
        for value in &present {
            *categories.entry(value.to_string()).or_insert(0) += 1;
        }

        let mut mode = None;
        let mut mode_frequency = 0;
        for (value, &frequency) in &categories {
            if frequency > mode_frequency {
                mode_frequency = frequency;
                mode = Some(value.clone());
            }
        }

        let mode_percentage = if count > 0 {
            mode_frequency as f64 / count as f64 * 100.0
        } else {
            0.0
        };

        return ColumnStatistics::Categorical(CategoricalStatistics {
            count,
            missing_count,
            unique_count: categories.len(),
            mode,
            mode_frequency,
            mode_percentage,
            categories,
        });
    }

    sort_ascending(&mut numbers);
    let n = numbers.len();
    let min = numbers[0];
    let max = numbers[n - 1];
    let sum: f64 = numbers.iter().sum();
    let mean = sum / n as f64;
    let variance = population_variance(&numbers, mean);

    // Nearest-rank quartiles, no interpolation.
    let q1 = numbers[(n as f64 * 0.25).floor() as usize];
    let q3 = numbers[(n as f64 * 0.75).floor() as usize];
    let iqr = q3 - q1;
    let lower = q1 - OUTLIER_IQR_FACTOR * iqr;
    let upper = q3 + OUTLIER_IQR_FACTOR * iqr;

    ColumnStatistics::Numeric(NumericStatistics {
        count,
        missing_count,
        min,
        max,
        range: max - min,
        sum,
        mean,
        median: median_sorted(&numbers),
        std_dev: variance.sqrt(),
        variance,
        q1,
        q3,
        iqr,
        outlier_count: numbers.iter().filter(|&&v| v < lower || v > upper).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use pretty_assertions::assert_eq;

    fn rows_of(column: &str, values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| Row::from([(column.to_string(), v)]))
            .collect()
    }

    #[test]
    fn test_numeric_and_categorical_columns() {
        let rows = vec![
            Row::from([("a".to_string(), Value::Number(1.0)), ("b".to_string(), Value::from("x"))]),
            Row::from([("a".to_string(), Value::Number(3.0)), ("b".to_string(), Value::from("y"))]),
            Row::from([("a".to_string(), Value::Number(5.0)), ("b".to_string(), Value::from("x"))]),
        ];
        let summary = summarize(&rows);

        let a = summary["a"].as_numeric().unwrap();
        assert_eq!((a.min, a.max, a.mean, a.median), (1.0, 5.0, 3.0, 3.0));
        assert_eq!(a.count, 3);

        let b = summary["b"].as_categorical().unwrap();
        assert_eq!(b.unique_count, 2);
        assert_eq!(b.mode.as_deref(), Some("x"));
        assert_eq!(b.mode_frequency, 2);
        assert!((b.mode_percentage - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_outlier_detection() {
        let values = [1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 100.0];
        let rows = rows_of("v", values.iter().map(|&v| Value::Number(v)).collect());
        let stats = column_statistics(&rows, "v");
        let stats = stats.as_numeric().unwrap();

        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.iqr, 2.0);
        assert_eq!(stats.outlier_count, 1);
    }

    #[test]
    fn test_population_variance_and_even_median() {
        let rows = rows_of(
            "v",
            vec![Value::Number(2.0), Value::Number(4.0), Value::Number(4.0), Value::Number(6.0)],
        );
        let stats = column_statistics(&rows, "v");
        let stats = stats.as_numeric().unwrap();

        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.variance, 2.0);
        assert_eq!(stats.std_dev, 2.0_f64.sqrt());
        assert_eq!(stats.range, 4.0);
        assert_eq!(stats.sum, 16.0);
    }

    #[test]
    fn test_missing_values_counted() {
        let rows = rows_of(
            "v",
            vec![Value::Number(1.0), Value::Null, Value::from(""), Value::from("7 bpm")],
        );
        let stats = column_statistics(&rows, "v");
        assert_eq!(stats.count(), 2);
        assert_eq!(stats.missing_count(), 2);
        assert_eq!(stats.as_numeric().unwrap().max, 7.0);
    }

    #[test]
    fn test_mixed_column_counts_text_but_summarizes_numbers() {
        let rows = rows_of("v", vec![Value::from("n/a"), Value::Number(4.0), Value::Number(6.0)]);
        let stats = column_statistics(&rows, "v");
        let stats = stats.as_numeric().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 5.0);
    }

    #[test]
    fn test_all_missing_column_is_categorical_without_nan() {
        let rows = rows_of("v", vec![Value::Null, Value::from("")]);
        let stats = column_statistics(&rows, "v");
        let stats = stats.as_categorical().unwrap();

        assert_eq!(stats.count, 0);
        assert_eq!(stats.missing_count, 2);
        assert_eq!(stats.mode, None);
        assert_eq!(stats.mode_percentage, 0.0);
    }

    #[test]
    fn test_mode_first_seen_wins_ties() {
        let rows = rows_of(
            "v",
            vec![Value::from("b"), Value::from("a"), Value::from("a"), Value::from("b")],
        );
        let stats = column_statistics(&rows, "v");
        assert_eq!(stats.as_categorical().unwrap().mode.as_deref(), Some("b"));
    }

    #[test]
    fn test_boolean_column_is_categorical() {
        let rows = rows_of("v", vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]);
        let stats = column_statistics(&rows, "v");
        let stats = stats.as_categorical().unwrap();
        assert_eq!(stats.categories.get("true"), Some(&2));
        assert_eq!(stats.categories.get("false"), Some(&1));
    }

    #[test]
    fn test_quartile_ordering_holds() {
        let rows = rows_of(
            "v",
            [9.0, -3.0, 4.5, 0.0, 12.0, 7.0, 7.0].iter().map(|&v| Value::Number(v)).collect(),
        );
        let stats = column_statistics(&rows, "v");
        let s = stats.as_numeric().unwrap();
        assert!(s.min <= s.q1 && s.q1 <= s.median && s.median <= s.q3 && s.q3 <= s.max);
    }

    #[test]
    fn test_empty_rows() {
        assert!(summarize(&[]).is_empty());
    }
}
