use indexmap::IndexMap;

use super::{ChartData, ChartError, ChartResult, PieChart, PieSlice, field};
use crate::types::Row;

/// Sum the value field per category and express each slice as a share of the total.
///
/// A zero total gives every slice a 0% share.
pub fn pie_chart(rows: &[Row], category_field: &str, value_field: &str) -> ChartResult {
    if rows.is_empty() || category_field.is_empty() || value_field.is_empty() {
        return Err(ChartError);
    }

    let mut sums: IndexMap<String, f64> = IndexMap::new();
    for row in rows {
        let category = field(row, category_field);
        if let Some(value) = field(row, value_field).as_lenient_f64()
            && category.is_truthy()
        {
            *sums.entry(category.to_string()).or_insert(0.0) += value;
        }
    }

    let total: f64 = sums.values().sum();
    let data = sums
        .into_iter()
        .map(|(category, value)| PieSlice {
            category,
            value,
            percentage: if total != 0.0 { value / total * 100.0 } else { 0.0 },
        })
        .collect();

    Ok(ChartData::Pie(PieChart {
        data,
        category_field: category_field.to_string(),
        value_field: value_field.to_string(),
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use pretty_assertions::assert_eq;

    fn row(cat: &str, v: f64) -> Row {
        Row::from([("cat".to_string(), Value::from(cat)), ("v".to_string(), Value::Number(v))])
    }

    fn chart(result: ChartResult) -> PieChart {
        match result {
            Ok(ChartData::Pie(chart)) => chart,
            other => panic!("unexpected chart: {other:?}"),
        }
    }

    #[test]
    fn test_slices_and_percentages() {
        let rows = vec![row("flu", 30.0), row("cold", 50.0), row("flu", 20.0)];
        let chart = chart(pie_chart(&rows, "cat", "v"));

        assert_eq!(chart.total, 100.0);
        assert_eq!(
            chart.data,
            vec![
                PieSlice { category: "flu".to_string(), value: 50.0, percentage: 50.0 },
                PieSlice { category: "cold".to_string(), value: 50.0, percentage: 50.0 },
            ]
        );
    }

    #[test]
    fn test_zero_total_has_no_nan() {
        let rows = vec![row("a", 0.0), row("b", 0.0)];
        let chart = chart(pie_chart(&rows, "cat", "v"));
        assert!(chart.data.iter().all(|s| s.percentage == 0.0));
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(pie_chart(&[], "cat", "v"), Err(ChartError));
    }
}
