//! Health Dataset Engine
//!
//! Statistics, cleaning and chart-data generation for tabular health datasets,
//! with optional AI narration.
//!
//! # Overview
//!
//! - **Ingestion**: CSV uploads through polars; other flat files through a
//!   delimiter and header sniffing parser
//! - **Profiling**: per-column type inference and descriptive statistics
//! - **Cleaning**: duplicate removal, missing-value handling and z-score
//!   standardization, applied in a fixed order
//! - **Charts**: bar, line, pie, scatter and heatmap data ready for a renderer
//! - **AI Narration**: prompts for dataset analysis and visualization insights,
//!   sent through any [`ai::AIProvider`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use health_data::{ChartRequest, CleaningConfig, DatasetService, MissingValueStrategy};
//!
//! let service = DatasetService::in_memory();
//! let dataset = service.upload(&std::fs::read("heart.csv")?, "heart.csv", None)?;
//!
//! let config = CleaningConfig::builder()
//!     .remove_duplicates(true)
//!     .missing_values(MissingValueStrategy::Median)
//!     .standardize(["chol"])
//!     .build()?;
//! service.clean(&dataset.id, &config)?;
//!
//! let chart = service.chart(
//!     &dataset.id,
//!     &ChartRequest::Pie {
//!         category_field: "sex".into(),
//!         value_field: "age".into(),
//!     },
//! )?;
//! ```
//!
//! The engine functions can also be used directly on rows:
//!
//! ```rust,ignore
//! use health_data::{DataCleaner, parser, profiler};
//!
//! let rows = parser::parse_delimited_text("63,1,145\n41,0,130\n");
//! let summary = profiler::summarize(&rows);
//! ```

pub mod ai;
pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod parser;
pub mod profiler;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::{ChartData, ChartError, ChartResult};
pub use cleaner::{CleaningOutcome, DataCleaner};
pub use config::{
    Aggregation, ChartRequest, CleaningConfig, CleaningConfigBuilder, CleaningOperation,
    CleaningRequest, ConfigValidationError, MissingValueStrategy, ServiceConfig,
};
pub use error::{DatasetError, Result as DatasetResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use parser::{ParseOptions, ingest};
pub use profiler::DataProfiler;
pub use service::{DatasetPage, DatasetService};
pub use store::{DatasetStore, InMemoryStore};
pub use types::{
    CategoricalStatistics, ColumnStatistics, ColumnType, DatasetMetadata, FileType,
    NumericStatistics, ParsedDataset, Row, Summary, Value,
};
