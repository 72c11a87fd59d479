//! Prompt construction for dataset and visualization narration.

use serde::Serialize;

use crate::types::{DatasetMetadata, Row};

/// Rows embedded in a dataset analysis prompt at most.
pub const MAX_SAMPLE_ROWS: usize = 100;

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Ask for observations, trends and health implications of a dataset.
///
/// At most [`MAX_SAMPLE_ROWS`] of `sample` are embedded.
pub fn dataset_analysis_prompt(metadata: &DatasetMetadata, sample: &[Row]) -> String {
    let sample = &sample[..sample.len().min(MAX_SAMPLE_ROWS)];
    let columns = sample
        .first()
        .map(|row| row.keys().cloned().collect::<Vec<_>>().join(", "))
        .unwrap_or_default();

    format!(
        "I have a health dataset with approximately {rows} rows and the following columns:\n\
         {columns}.\n\n\
         Here are some statistics about the dataset:\n\
         {summary}\n\n\
         Here's a sample of the data:\n\
         {sample}\n\n\
         Please analyze this health dataset and provide:\n\
         1. A summary of the key observations\n\
         2. Any patterns or trends you notice\n\
         3. Potential health insights or implications\n\
         4. Suggestions for further analysis\n",
        rows = metadata.row_count,
        columns = columns,
        summary = pretty(&metadata.summary),
        sample = pretty(sample),
    )
}

/// Ask for healthcare insights from generated chart data.
pub fn visualization_insights_prompt(visualization: &serde_json::Value) -> String {
    format!(
        "I have a health dataset visualization with the following data:\n\
         {data}\n\n\
         Please generate healthcare insights from this visualization data including:\n\
         1. Key observations from the visualization\n\
         2. Potential implications for public health\n\
         3. Recommendations based on these findings\n\
         4. Limitations or caveats to consider\n",
        data = pretty(visualization),
    )
}

/// A visualization described by the caller, to be explained in plain language.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct VisualizationDescription {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub data: serde_json::Value,
}

/// Ask for a non-technical explanation of one visualization.
pub fn explain_visualization_prompt(visualization: &VisualizationDescription, context: &str) -> String {
    format!(
        "Please explain this health data visualization in simple terms:\n\n\
         Visualization type: {kind}\n\
         Visualization title: {title}\n\
         Data context: {context}\n\n\
         Data details:\n\
         {data}\n\n\
         Please provide:\n\
         1. A simple explanation of what this visualization shows\n\
         2. Key takeaways for a non-technical audience\n\
         3. How this information could be used to improve public health\n",
        kind = visualization.kind,
        title = visualization.title,
        context = context,
        data = pretty(&visualization.data),
    )
}
