//! Data cleaning module.
//!
//! This module provides functionality for:
//! - Removing exact duplicate rows
//! - Handling missing values (see [`crate::imputers`])
//! - Z-score standardization of selected columns
//!
//! Requested operations always run in that order.

mod duplicates;
mod standardize;

pub use duplicates::{remove_duplicates, row_key};
pub use standardize::{ColumnScale, column_scales, standardize};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{CleaningConfig, CleaningOperation};
use crate::imputers::StatisticalImputer;
use crate::profiler::statistics::column_names;
use crate::types::Row;

/// Result of a cleaning run. The input rows are never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningOutcome {
    #[serde(skip)]
    pub rows: Vec<Row>,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns: Vec<String>,
    pub actions: Vec<String>,
}

/// Applies a [`CleaningConfig`] to a row set.
pub struct DataCleaner;

impl DataCleaner {
    /// Run the configured operations and return the new row set.
    pub fn clean(rows: &[Row], config: &CleaningConfig) -> CleaningOutcome {
        let mut actions = Vec::new();
        let mut current = rows.to_vec();

        info!("Cleaning {} rows with {:?}", rows.len(), config.operations);

        if config.includes(CleaningOperation::RemoveDuplicates) {
            let before = current.len();
            current = remove_duplicates(&current);
            let removed = before - current.len();
            if removed > 0 {
                actions.push(format!("Removed {} duplicate row(s)", removed));
            } else {
                actions.push("No duplicate rows found".to_string());
            }
            debug!("Duplicate removal dropped {} rows", removed);
        }

        if config.includes(CleaningOperation::HandleMissingValues) {
            current =
                StatisticalImputer::apply(&current, config.missing_value_strategy, &mut actions);
        }

        if config.includes(CleaningOperation::Standardize) {
            if config.columns_to_standardize.is_empty() {
                actions.push("No columns selected for standardization".to_string());
            } else {
                current = standardize(&current, &config.columns_to_standardize);
                actions.push(format!(
                    "Standardized column(s): {}",
                    config.columns_to_standardize.join(", ")
                ));
            }
        }

        info!("Cleaning finished: {} -> {} rows", rows.len(), current.len());

        CleaningOutcome {
            rows_before: rows.len(),
            rows_after: current.len(),
            columns: column_names(&current),
            actions,
            rows: current,
        }
    }
}
