//! Chart-ready series from dataset rows.
//!
//! Every generator is a pure function of the rows and the field selection.
//! Missing field names or an empty row set produce [`ChartError`], which
//! serializes as `{ "error": "Invalid input parameters" }` so an interactive
//! caller can simply adjust its selection and retry.

mod bar;
mod heatmap;
mod line;
mod pie;
mod scatter;

pub use bar::bar_chart;
pub use heatmap::heatmap_chart;
pub use line::line_chart;
pub use pie::pie_chart;
pub use scatter::scatter_chart;

use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::SerializeMap;

use crate::config::{Aggregation, ChartRequest};
use crate::types::{Row, Value};

/// Returned when required parameters are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid input parameters")]
pub struct ChartError;

impl Serialize for ChartError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("error", &self.to_string())?;
        map.end()
    }
}

pub type ChartResult = Result<ChartData, ChartError>;

/// A generated chart, tagged by `chartType`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chartType", rename_all = "lowercase")]
pub enum ChartData {
    Bar(BarChart),
    Line(LineChart),
    Pie(PieChart),
    Scatter(ScatterChart),
    Heatmap(HeatmapChart),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPoint {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    pub data: Vec<CategoryPoint>,
    pub x_axis: String,
    pub y_axis: String,
}

/// One time period with one aggregated value per requested field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePoint {
    pub time_period: String,
    #[serde(flatten)]
    pub values: IndexMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChart {
    pub data: Vec<LinePoint>,
    pub x_axis: String,
    pub y_axis: Vec<String>,
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub category: String,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieChart {
    pub data: Vec<PieSlice>,
    pub category_field: String,
    pub value_field: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterChart {
    pub data: Vec<ScatterPoint>,
    pub x_axis: String,
    pub y_axis: String,
}

/// One heatmap row: the row category plus a cell per column category.
///
/// Serializes as a flat object keyed by the row field name and the column
/// category labels.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapRow {
    pub row_field: String,
    pub row: Value,
    pub cells: IndexMap<String, Option<f64>>,
}

impl Serialize for HeatmapRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.cells.len() + 1))?;
        map.serialize_entry(&self.row_field, &self.row)?;
        for (column, cell) in &self.cells {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapChart {
    pub data: Vec<HeatmapRow>,
    pub rows: Vec<Value>,
    pub columns: Vec<Value>,
    /// Smallest populated cell; absent when no cell is populated.
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Running totals for one category group.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GroupAccumulator {
    pub count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for GroupAccumulator {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl GroupAccumulator {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn aggregate(&self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Sum => self.sum,
            Aggregation::Avg => self.sum / self.count as f64,
            Aggregation::Count => self.count as f64,
            Aggregation::Min => self.min,
            Aggregation::Max => self.max,
        }
    }
}

/// The cell at `field`, with an absent key read as null.
pub(crate) fn field<'a>(row: &'a Row, field: &str) -> &'a Value {
    static NULL: Value = Value::Null;
    row.get(field).unwrap_or(&NULL)
}

/// Dispatch a [`ChartRequest`] to its generator.
pub fn generate(rows: &[Row], request: &ChartRequest) -> ChartResult {
    match request {
        ChartRequest::Bar {
            category_field,
            value_field,
            aggregation,
        } => bar_chart(rows, category_field, value_field, *aggregation),
        ChartRequest::Line {
            time_field,
            value_fields,
            aggregation,
        } => line_chart(rows, time_field, value_fields, *aggregation),
        ChartRequest::Pie {
            category_field,
            value_field,
        } => pie_chart(rows, category_field, value_field),
        ChartRequest::Scatter {
            x_field,
            y_field,
            label_field,
            size_field,
        } => scatter_chart(
            rows,
            x_field,
            y_field,
            label_field.as_deref(),
            size_field.as_deref(),
        ),
        ChartRequest::Heatmap {
            row_field,
            column_field,
            value_field,
        } => heatmap_chart(rows, row_field, column_field, value_field),
    }
}

/// JSON for a chart result: the chart itself or the error object.
pub fn chart_json(result: &ChartResult) -> serde_json::Result<serde_json::Value> {
    match result {
        Ok(chart) => serde_json::to_value(chart),
        Err(err) => serde_json::to_value(err),
    }
}
