//! Imputation module for handling missing values.
//!
//! Statistical strategies only: whole-row removal, mean, median, mode and zero.

mod statistical;

pub use statistical::{StatisticalImputer, handle_missing_values};
