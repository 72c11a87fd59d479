//! AI module for narrating datasets and visualizations.
//!
//! # Feature Flag
//!
//! The [`AIProvider`] trait and the prompt builders are always available.
//! The concrete [`AnthropicProvider`] requires the `ai` feature flag.
//!
//! ```toml
//! # Enable AI support (default)
//! health-data = { version = "0.1", features = ["ai"] }
//!
//! # Disable AI support for smaller binary
//! health-data = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use health_data::ai::AnthropicProvider;
//! use health_data::service::DatasetService;
//! use std::sync::Arc;
//!
//! let provider = Arc::new(AnthropicProvider::new("your-api-key")?);
//! let service = DatasetService::in_memory().with_ai_provider(provider);
//! let analysis = service.analyze(&dataset_id)?;
//! ```

pub mod prompts;
mod provider;

pub use prompts::VisualizationDescription;
pub use provider::AIProvider;

#[cfg(feature = "ai")]
mod anthropic;

#[cfg(feature = "ai")]
pub use anthropic::{AnthropicConfig, AnthropicConfigBuilder, AnthropicProvider, NO_RESPONSE_TEXT};
