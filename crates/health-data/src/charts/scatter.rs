use super::{ChartData, ChartError, ChartResult, ScatterChart, ScatterPoint, field};
use crate::types::Row;

/// Raw `(x, y)` pairs, skipping rows where either coordinate is non-numeric.
///
/// A point carries a label when the label cell is truthy and a size when the
/// size cell is numeric.
pub fn scatter_chart(
    rows: &[Row],
    x_field: &str,
    y_field: &str,
    label_field: Option<&str>,
    size_field: Option<&str>,
) -> ChartResult {
    if rows.is_empty() || x_field.is_empty() || y_field.is_empty() {
        return Err(ChartError);
    }

    let label_field = label_field.filter(|f| !f.is_empty());
    let size_field = size_field.filter(|f| !f.is_empty());

    let data = rows
        .iter()
        .filter_map(|row| {
            let x = field(row, x_field).as_lenient_f64()?;
            let y = field(row, y_field).as_lenient_f64()?;
            let label = label_field
                .map(|f| field(row, f))
                .filter(|v| v.is_truthy())
                .cloned();
            let size = size_field.and_then(|f| field(row, f).as_lenient_f64());
            Some(ScatterPoint { x, y, label, size })
        })
        .collect();

    Ok(ChartData::Scatter(ScatterChart {
        data,
        x_axis: x_field.to_string(),
        y_axis: y_field.to_string(),
    }))
}
