//! Request-handler layer over a [`DatasetStore`].
//!
//! [`DatasetService`] is what an HTTP handler or the CLI calls: it ingests
//! uploads, pages through rows, runs cleaning and chart generation against
//! stored datasets, exports CSV and forwards prompts to an [`AIProvider`].
//!
//! # Concurrency
//!
//! Cleaning is a read-modify-write of the whole row set. The service holds
//! one mutex per dataset id for the duration of fetch, clean, replace and
//! metadata refresh, so two cleans of the same dataset never interleave.
//! Different datasets do not contend.
//!
//! # Example
//!
//! ```rust,ignore
//! use health_data::config::CleaningConfig;
//! use health_data::service::DatasetService;
//!
//! let service = DatasetService::in_memory();
//! let metadata = service.upload(&bytes, "vitals.csv", None)?;
//!
//! let config = CleaningConfig::builder().remove_duplicates(true).build()?;
//! let outcome = service.clean(&metadata.id, &config)?;
//! println!("{} -> {} rows", outcome.rows_before, outcome.rows_after);
//! ```

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::ai::{AIProvider, VisualizationDescription, prompts};
use crate::charts::{self, ChartResult};
use crate::cleaner::{CleaningOutcome, DataCleaner};
use crate::config::{ChartRequest, CleaningConfig, CleaningRequest, ServiceConfig};
use crate::error::{DatasetError, Result, ResultExt};
use crate::parser::{self, ParseOptions, csv::write_csv};
use crate::profiler::DataProfiler;
use crate::store::{DatasetStore, InMemoryStore};
use crate::types::{DatasetMetadata, Row, Summary};

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

fn next_dataset_id() -> String {
    format!("ds-{}", NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed))
}

/// One page of rows together with the dataset's metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetPage {
    #[serde(flatten)]
    pub dataset: DatasetMetadata,
    pub data: Vec<Row>,
    pub total_rows: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

/// Dataset operations over a store, with optional AI narration.
pub struct DatasetService<S: DatasetStore = InMemoryStore> {
    store: S,
    config: ServiceConfig,
    ai_provider: Option<Arc<dyn AIProvider>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

static_assertions::assert_impl_all!(DatasetService: Send, Sync);

impl DatasetService<InMemoryStore> {
    /// Service over a fresh [`InMemoryStore`] with default settings.
    pub fn in_memory() -> Self {
        Self {
            store: InMemoryStore::new(),
            config: ServiceConfig::default(),
            ai_provider: None,
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<S: DatasetStore> DatasetService<S> {
    /// Create a service over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidConfig`] if `config` does not validate.
    pub fn new(store: S, config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            ai_provider: None,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Attach the provider used by the narration operations.
    pub fn with_ai_provider(mut self, provider: Arc<dyn AIProvider>) -> Self {
        self.ai_provider = Some(provider);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `f` while holding the lock of an existing dataset.
    ///
    /// Unknown ids fail before a lock entry is created, and the entry is
    /// dropped once the dataset no longer exists.
    fn with_dataset_lock<T>(&self, id: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.store.row_count(id)?;

        let lock = self
            .locks
            .lock()
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock();
            f()
        };

        if self.store.row_count(id).is_err() {
            self.locks.lock().remove(id);
        }
        result
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.locks.lock().len()
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strict: self.config.strict_parsing,
        }
    }

    // =========================================================================
    // Datasets
    // =========================================================================

    /// Parse, profile and store an upload.
    pub fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        description: Option<&str>,
    ) -> Result<DatasetMetadata> {
        let parsed = parser::ingest(bytes, file_name, self.parse_options())
            .context(format!("Uploading '{}'", file_name))?;

        let mut metadata = DataProfiler::profile(next_dataset_id(), &parsed);
        metadata.description = description.unwrap_or_default().to_string();

        self.store.insert(metadata.clone(), parsed.rows)?;
        info!("Stored dataset {} ({} rows)", metadata.id, metadata.row_count);
        Ok(metadata)
    }

    /// Every dataset, newest first, without per-column category frequencies.
    pub fn list(&self) -> Vec<DatasetMetadata> {
        self.store
            .list()
            .iter()
            .map(DatasetMetadata::without_categories)
            .collect()
    }

    pub fn metadata(&self, id: &str) -> Result<DatasetMetadata> {
        self.store.metadata(id)
    }

    /// One page of rows. `page` is 1-based; `None` or 0 means the first page
    /// and a missing or zero `limit` uses the configured default.
    pub fn get_page(&self, id: &str, page: Option<usize>, limit: Option<usize>) -> Result<DatasetPage> {
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(self.config.default_page_limit);
        let page = page.filter(|p| *p > 0).unwrap_or(1);

        let dataset = self.store.metadata(id)?;
        let total_rows = self.store.row_count(id)?;
        let offset = (page - 1).saturating_mul(limit);
        let data = self.store.rows_page(id, offset, limit)?;

        debug!("Page {} of {} for {} ({} rows)", page, limit, id, data.len());

        Ok(DatasetPage {
            dataset,
            data,
            total_rows,
            total_pages: total_rows.div_ceil(limit),
            current_page: page,
        })
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.with_dataset_lock(id, || self.store.delete(id))?;
        info!("Deleted dataset {}", id);
        Ok(())
    }

    // =========================================================================
    // Cleaning, statistics and export
    // =========================================================================

    /// Validate a string-typed request, then [`clean`](Self::clean).
    pub fn clean_request(&self, id: &str, request: &CleaningRequest) -> Result<CleaningOutcome> {
        let config = CleaningConfig::from_request(request)?;
        self.clean(id, &config)
    }

    /// Clean a stored dataset in place and refresh its summary.
    pub fn clean(&self, id: &str, config: &CleaningConfig) -> Result<CleaningOutcome> {
        config.validate()?;

        let outcome = self.with_dataset_lock(id, || {
            let mut metadata = self.store.metadata(id)?;
            let rows = self.store.rows(id)?;
            let outcome = DataCleaner::clean(&rows, config);

            self.store.replace_rows(id, outcome.rows.clone())?;
            DataProfiler::refresh(&mut metadata, &outcome.rows);
            self.store.update_metadata(metadata)?;
            Ok(outcome)
        })?;

        info!(
            "Cleaned dataset {}: {} -> {} rows",
            id, outcome.rows_before, outcome.rows_after
        );
        Ok(outcome)
    }

    /// The stored summary statistics.
    pub fn statistics(&self, id: &str) -> Result<Summary> {
        Ok(self.store.metadata(id)?.summary)
    }

    /// Chart data for a stored dataset.
    ///
    /// The outer `Result` fails only when the dataset cannot be read; invalid
    /// chart parameters come back as the inner [`ChartResult`] error.
    pub fn chart(&self, id: &str, request: &ChartRequest) -> Result<ChartResult> {
        let rows = self.store.rows(id)?;
        let result = charts::generate(&rows, request);
        if result.is_err() {
            warn!("Chart request for {} rejected: {:?}", id, request);
        }
        Ok(result)
    }

    /// Current rows as CSV bytes, header first.
    pub fn download_csv(&self, id: &str) -> Result<Vec<u8>> {
        let rows = self.store.rows(id)?;
        let mut buffer = Vec::new();
        write_csv(&rows, &mut buffer).context(format!("Exporting dataset {}", id))?;
        Ok(buffer)
    }

    // =========================================================================
    // AI narration
    // =========================================================================

    fn provider(&self) -> Result<&Arc<dyn AIProvider>> {
        self.ai_provider
            .as_ref()
            .ok_or_else(|| DatasetError::AiClientError("No AI provider configured".to_string()))
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let provider = self.provider()?;
        debug!("Requesting completion from {}", provider.name());
        provider
            .complete(prompt)
            .map_err(|e| DatasetError::AiClientError(e.to_string()))
    }

    /// Narrative analysis of a dataset from its summary and a row sample.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EmptyDataset`] when the dataset has no rows.
    pub fn analyze(&self, id: &str) -> Result<String> {
        self.provider()?;
        let metadata = self.store.metadata(id)?;
        let sample = self
            .store
            .rows_page(id, 0, self.config.analysis_sample_rows)?;
        if sample.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }

        let prompt = prompts::dataset_analysis_prompt(&metadata, &sample);
        self.complete(&prompt)
    }

    /// Healthcare insights for chart data the caller already generated.
    pub fn visualization_insights(&self, visualization: &serde_json::Value) -> Result<String> {
        self.complete(&prompts::visualization_insights_prompt(visualization))
    }

    /// Plain-language explanation of one visualization.
    pub fn explain_visualization(
        &self,
        visualization: &VisualizationDescription,
        context: &str,
    ) -> Result<String> {
        self.complete(&prompts::explain_visualization_prompt(visualization, context))
    }
}
