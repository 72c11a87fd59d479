use indexmap::IndexMap;

use super::{BarChart, CategoryPoint, ChartData, ChartError, ChartResult, GroupAccumulator, field};
use crate::config::Aggregation;
use crate::types::Row;

/// Group rows by category and aggregate the value field per group.
///
/// Rows with a falsy category or a non-numeric value are skipped. Groups
/// appear in first-seen order.
pub fn bar_chart(
    rows: &[Row],
    category_field: &str,
    value_field: &str,
    aggregation: Aggregation,
) -> ChartResult {
    if rows.is_empty() || category_field.is_empty() || value_field.is_empty() {
        return Err(ChartError);
    }

    let mut groups: IndexMap<String, GroupAccumulator> = IndexMap::new();
    for row in rows {
        let category = field(row, category_field);
        let Some(value) = field(row, value_field).as_lenient_f64() else {
            continue;
        };
        if !category.is_truthy() {
            continue;
        }
        groups.entry(category.to_string()).or_default().push(value);
    }

    let data = groups
        .into_iter()
        .map(|(category, group)| CategoryPoint {
            category,
            value: group.aggregate(aggregation),
        })
        .collect();

    Ok(ChartData::Bar(BarChart {
        data,
        x_axis: category_field.to_string(),
        y_axis: format!("{} of {}", aggregation.as_str(), value_field),
    }))
}
