use indexmap::IndexMap;

use super::{ChartData, ChartError, ChartResult, HeatmapChart, HeatmapRow, field};
use crate::types::{Row, Value};

/// Dense matrix of row category by column category.
///
/// Categories are the distinct cell values in first-seen order, compared by
/// their display text. Each cell holds the last numeric value seen for its
/// pair, or null. `min_value`/`max_value` span the populated cells.
pub fn heatmap_chart(
    rows: &[Row],
    row_field: &str,
    column_field: &str,
    value_field: &str,
) -> ChartResult {
    if rows.is_empty() || row_field.is_empty() || column_field.is_empty() || value_field.is_empty()
    {
        return Err(ChartError);
    }

    let mut row_categories: IndexMap<String, Value> = IndexMap::new();
    let mut column_categories: IndexMap<String, Value> = IndexMap::new();
    for row in rows {
        let r = field(row, row_field);
        let c = field(row, column_field);
        row_categories.entry(r.to_string()).or_insert_with(|| r.clone());
        column_categories.entry(c.to_string()).or_insert_with(|| c.clone());
    }

    let mut matrix: IndexMap<String, IndexMap<String, Option<f64>>> = row_categories
        .keys()
        .map(|r| {
            let cells = column_categories.keys().map(|c| (c.clone(), None)).collect();
            (r.clone(), cells)
        })
        .collect();

    for row in rows {
        let Some(value) = field(row, value_field).as_lenient_f64() else {
            continue;
        };
        let r = field(row, row_field).to_string();
        let c = field(row, column_field).to_string();
        if let Some(cell) = matrix.get_mut(&r).and_then(|cells| cells.get_mut(&c)) {
            *cell = Some(value);
        }
    }

    let populated = || matrix.values().flat_map(|cells| cells.values().flatten().copied());
    let min_value = populated().reduce(f64::min);
    let max_value = populated().reduce(f64::max);

    let data = row_categories
        .values()
        .zip(matrix.values())
        .map(|(row, cells)| HeatmapRow {
            row_field: row_field.to_string(),
            row: row.clone(),
            cells: cells.clone(),
        })
        .collect();

    Ok(ChartData::Heatmap(HeatmapChart {
        data,
        rows: row_categories.into_values().collect(),
        columns: column_categories.into_values().collect(),
        min_value,
        max_value,
    }))
}
