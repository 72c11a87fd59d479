//! Configuration types for cleaning, chart generation and the dataset service.
//!
//! Cleaning is configured through [`CleaningConfig`] (builder pattern) or
//! converted from the string-typed [`CleaningRequest`] a frontend sends.

use serde::{Deserialize, Serialize};

/// One step of a cleaning run. Steps always execute in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningOperation {
    RemoveDuplicates,
    HandleMissingValues,
    Standardize,
}

impl CleaningOperation {
    /// Parse a request name; unknown names yield `None` and are ignored by callers.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "remove_duplicates" => Some(Self::RemoveDuplicates),
            "handle_missing_values" => Some(Self::HandleMissingValues),
            "standardize" => Some(Self::Standardize),
            _ => None,
        }
    }
}

/// How missing cells are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingValueStrategy {
    /// Drop every row with a missing value in any column
    #[default]
    Remove,
    /// Fill with the column mean
    Mean,
    /// Fill with the column median
    Median,
    /// Fill with the most frequent numeric value
    Mode,
    /// Fill with 0
    Zero,
    /// Any other name; missing cells are set to null
    #[serde(other)]
    Unrecognized,
}

impl MissingValueStrategy {
    /// Parse a strategy name. Unknown names map to [`MissingValueStrategy::Unrecognized`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "remove" => Self::Remove,
            "mean" => Self::Mean,
            "median" => Self::Median,
            "mode" => Self::Mode,
            "zero" => Self::Zero,
            _ => Self::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
            Self::Zero => "zero",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Cleaning request as it arrives from a client, with plain strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningRequest {
    pub operations: Vec<String>,
    #[serde(default)]
    pub missing_value_strategy: Option<String>,
    #[serde(default)]
    pub columns_to_standardize: Option<Vec<String>>,
}

/// Configuration for a cleaning run.
///
/// Use [`CleaningConfig::builder()`] to assemble one, or
/// [`CleaningConfig::from_request`] to validate a client request.
///
/// # Example
///
/// ```rust,ignore
/// use health_data::config::{CleaningConfig, MissingValueStrategy};
///
/// let config = CleaningConfig::builder()
///     .remove_duplicates(true)
///     .missing_values(MissingValueStrategy::Median)
///     .standardize(["heart_rate"])
///     .build()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningConfig {
    /// Requested operations, deduplicated.
    pub operations: Vec<CleaningOperation>,

    /// Strategy used when `HandleMissingValues` is requested.
    /// Default: Remove
    #[serde(default)]
    pub missing_value_strategy: MissingValueStrategy,

    /// Columns z-scored when `Standardize` is requested.
    #[serde(default)]
    pub columns_to_standardize: Vec<String>,
}

impl CleaningConfig {
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Convert and validate a string-typed request.
    ///
    /// Unknown operation names are ignored; an unknown strategy name is rejected.
    pub fn from_request(request: &CleaningRequest) -> Result<Self, ConfigValidationError> {
        let mut operations = Vec::new();
        for name in &request.operations {
            if let Some(op) = CleaningOperation::from_name(name)
                && !operations.contains(&op)
            {
                operations.push(op);
            }
        }

        if let Some(name) = &request.missing_value_strategy
            && MissingValueStrategy::from_name(name) == MissingValueStrategy::Unrecognized
        {
            return Err(ConfigValidationError::UnknownStrategy(name.clone()));
        }

        let config = Self {
            operations,
            missing_value_strategy: request
                .missing_value_strategy
                .as_deref()
                .map(MissingValueStrategy::from_name)
                .unwrap_or_default(),
            columns_to_standardize: request.columns_to_standardize.clone().unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn includes(&self, operation: CleaningOperation) -> bool {
        self.operations.contains(&operation)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.includes(CleaningOperation::HandleMissingValues)
            && self.missing_value_strategy == MissingValueStrategy::Unrecognized
        {
            return Err(ConfigValidationError::UnknownStrategy(
                self.missing_value_strategy.as_str().to_string(),
            ));
        }

        if self.columns_to_standardize.iter().any(|c| c.is_empty()) {
            return Err(ConfigValidationError::EmptyColumnName);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid missing value strategy: '{0}' (expected remove, mean, median, mode or zero)")]
    UnknownStrategy(String),

    #[error("Column names to standardize must not be empty")]
    EmptyColumnName,

    #[error("Invalid page limit: {0} (must be at least 1)")]
    InvalidPageLimit(usize),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    remove_duplicates: bool,
    missing_value_strategy: Option<MissingValueStrategy>,
    columns_to_standardize: Option<Vec<String>>,
}

impl CleaningConfigBuilder {
    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = remove;
        self
    }

    /// Handle missing values with the given strategy.
    pub fn missing_values(mut self, strategy: MissingValueStrategy) -> Self {
        self.missing_value_strategy = Some(strategy);
        self
    }

    /// Z-score the given columns.
    pub fn standardize<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_standardize = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let mut operations = Vec::new();
        if self.remove_duplicates {
            operations.push(CleaningOperation::RemoveDuplicates);
        }
        if self.missing_value_strategy.is_some() {
            operations.push(CleaningOperation::HandleMissingValues);
        }
        if self.columns_to_standardize.is_some() {
            operations.push(CleaningOperation::Standardize);
        }

        let config = CleaningConfig {
            operations,
            missing_value_strategy: self.missing_value_strategy.unwrap_or_default(),
            columns_to_standardize: self.columns_to_standardize.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Aggregation applied to each category group of a chart.
///
/// Unknown names deserialize to `Sum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Avg,
    Count,
    Min,
    Max,
    #[default]
    #[serde(other)]
    Sum,
}

impl Aggregation {
    pub fn from_name(name: &str) -> Self {
        match name {
            "avg" => Self::Avg,
            "count" => Self::Count,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => Self::Sum,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avg => "avg",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
        }
    }
}

/// Field selection for one chart, tagged by `chartType`.
///
/// Missing field names deserialize as empty strings so the generator can
/// answer with its error result instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chartType", rename_all = "lowercase")]
pub enum ChartRequest {
    #[serde(rename_all = "camelCase")]
    Bar {
        #[serde(default)]
        category_field: String,
        #[serde(default)]
        value_field: String,
        #[serde(default)]
        aggregation: Aggregation,
    },
    #[serde(rename_all = "camelCase")]
    Line {
        #[serde(default)]
        time_field: String,
        #[serde(default)]
        value_fields: Vec<String>,
        /// `avg` averages per time period; anything else sums. Default: avg
        #[serde(default)]
        aggregation: Option<Aggregation>,
    },
    #[serde(rename_all = "camelCase")]
    Pie {
        #[serde(default)]
        category_field: String,
        #[serde(default)]
        value_field: String,
    },
    #[serde(rename_all = "camelCase")]
    Scatter {
        #[serde(default)]
        x_field: String,
        #[serde(default)]
        y_field: String,
        #[serde(default)]
        label_field: Option<String>,
        #[serde(default)]
        size_field: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Heatmap {
        #[serde(default)]
        row_field: String,
        #[serde(default)]
        column_field: String,
        #[serde(default)]
        value_field: String,
    },
}

/// Settings for [`crate::service::DatasetService`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Rows per page when the caller gives no limit.
    /// Default: 100
    pub default_page_limit: usize,

    /// Rows embedded in the dataset analysis prompt.
    /// Default: 100
    pub analysis_sample_rows: usize,

    /// Reject ragged delimited-text rows instead of dropping them.
    /// Default: false
    pub strict_parsing: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_limit: 100,
            analysis_sample_rows: 100,
            strict_parsing: false,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.default_page_limit == 0 {
            return Err(ConfigValidationError::InvalidPageLimit(0));
        }
        Ok(())
    }
}
