use indexmap::IndexMap;

use super::{ChartData, ChartError, ChartResult, LineChart, LinePoint, field};
use crate::config::Aggregation;
use crate::types::Row;
use crate::utils::value_to_timestamp;

#[derive(Default, Clone, Copy)]
struct FieldTotals {
    sum: f64,
    count: usize,
}

/// Time series of one or more value fields.
///
/// Rows are ordered by the parsed time (unparseable times last, original
/// order kept otherwise) and grouped by the raw time value, so two spellings
/// of the same instant form two periods. With `avg` (the default) each period
/// holds the mean of its numeric values; any other aggregation sums them.
pub fn line_chart(
    rows: &[Row],
    time_field: &str,
    value_fields: &[String],
    aggregation: Option<Aggregation>,
) -> ChartResult {
    if rows.is_empty() || time_field.is_empty() || value_fields.is_empty() {
        return Err(ChartError);
    }
    let aggregation = aggregation.unwrap_or(Aggregation::Avg);

    let mut sorted: Vec<(Option<i64>, &Row)> = rows
        .iter()
        .map(|row| (value_to_timestamp(field(row, time_field)), row))
        .collect();
    sorted.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut periods: IndexMap<String, IndexMap<&str, FieldTotals>> = IndexMap::new();
    for (_, row) in sorted {
        let totals = periods
            .entry(field(row, time_field).to_string())
            .or_insert_with(|| {
                value_fields
                    .iter()
                    .map(|f| (f.as_str(), FieldTotals::default()))
                    .collect()
            });

        for value_field in value_fields {
            if let Some(value) = field(row, value_field).as_lenient_f64()
                && let Some(entry) = totals.get_mut(value_field.as_str())
            {
                entry.sum += value;
                entry.count += 1;
            }
        }
    }

    let data = periods
        .into_iter()
        .map(|(time_period, totals)| LinePoint {
            time_period,
            values: totals
                .into_iter()
                .map(|(name, t)| {
                    let value = if aggregation == Aggregation::Avg && t.count > 0 {
                        t.sum / t.count as f64
                    } else {
                        t.sum
                    };
                    (name.to_string(), value)
                })
                .collect(),
        })
        .collect();

    Ok(ChartData::Line(LineChart {
        data,
        x_axis: time_field.to_string(),
        y_axis: value_fields.to_vec(),
        aggregation,
    }))
}
