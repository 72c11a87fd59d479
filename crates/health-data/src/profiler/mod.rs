//! Dataset profiling: column types from a sample row, statistics from all rows.
//!
//! This module provides:
//! - Type inference for columns (boolean, numeric, date, string)
//! - Per-column descriptive statistics with IQR outlier counts
//! - Metadata assembly for a freshly ingested dataset

pub mod statistics;
pub mod type_inference;

use chrono::Utc;
use tracing::{debug, info};

use crate::types::{DatasetMetadata, ParsedDataset, Row};

pub use statistics::{column_statistics, summarize};
pub use type_inference::{infer_column_types, infer_value_type};

/// Builds and refreshes [`DatasetMetadata`].
pub struct DataProfiler;

impl DataProfiler {
    /// Profile a parsed upload into metadata stored under `id`.
    ///
    /// Column types come from the first row only; the summary covers every row.
    pub fn profile(id: impl Into<String>, parsed: &ParsedDataset) -> DatasetMetadata {
        let id = id.into();
        let column_types = parsed
            .rows
            .first()
            .map(infer_column_types)
            .unwrap_or_default();
        let summary = summarize(&parsed.rows);
        let now = Utc::now();

        info!(
            "Profiled '{}': {} rows, {} columns",
            parsed.name,
            parsed.rows.len(),
            column_types.len()
        );

        DatasetMetadata {
            id,
            name: parsed.name.clone(),
            description: String::new(),
            file_name: parsed.file_name.clone(),
            file_size: parsed.file_size,
            file_type: parsed.file_type,
            column_types,
            summary,
            row_count: parsed.rows.len(),
            created_at: now,
            last_modified: now,
        }
    }

    /// Recompute the summary after the row set changed.
    ///
    /// Column types are left as inferred at ingestion.
    pub fn refresh(metadata: &mut DatasetMetadata, rows: &[Row]) {
        metadata.summary = summarize(rows);
        metadata.row_count = rows.len();
        metadata.last_modified = Utc::now();
        debug!("Refreshed summary for '{}' ({} rows)", metadata.id, rows.len());
    }
}
