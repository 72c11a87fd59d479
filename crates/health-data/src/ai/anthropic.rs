//! Anthropic provider implementation.
//!
//! This module provides the [`AnthropicProvider`] which implements the
//! [`AIProvider`] trait for the Anthropic Messages API
//! (<https://docs.anthropic.com/en/api/messages>).

use super::AIProvider;
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Messages API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default model.
const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// API version sent in the `anthropic-version` header.
const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default max tokens for responses.
const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Returned when the response carries no text block.
pub const NO_RESPONSE_TEXT: &str = "No response from Claude.";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first content block, or the fallback when absent or empty.
    fn into_text(self) -> String {
        self.content
            .and_then(|blocks| blocks.into_iter().next())
            .and_then(|block| block.text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string())
    }
}

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// The model to use.
    pub model: String,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
    /// Value of the `anthropic-version` header.
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl AnthropicConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnthropicConfigBuilder {
        AnthropicConfigBuilder::default()
    }
}

/// Builder for [`AnthropicConfig`].
#[derive(Default)]
pub struct AnthropicConfigBuilder {
    model: Option<String>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
    api_version: Option<String>,
}

impl AnthropicConfigBuilder {
    /// Set the model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the `anthropic-version` header value.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AnthropicConfig {
        AnthropicConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        }
    }
}

/// Anthropic Messages API provider.
///
/// # Example
///
/// ```rust,ignore
/// use health_data::ai::{AnthropicConfig, AnthropicProvider};
///
/// let provider = AnthropicProvider::new("your-api-key")?;
///
/// let config = AnthropicConfig::builder().max_tokens(1000).build();
/// let provider = AnthropicProvider::with_config("your-api-key", config)?;
/// ```
pub struct AnthropicProvider {
    api_key: String,
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, AnthropicConfig::default())
    }

    /// Create a new provider with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: impl Into<String>, config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

impl AIProvider for AnthropicProvider {
    fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Sending {} byte prompt to {} ({})",
            prompt.len(),
            self.name(),
            self.config.model
        );

        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text()?;
            warn!("Anthropic API returned {}", status);
            return Err(anyhow!("Anthropic API Error {}: {}", status, body));
        }

        let result: MessagesResponse = response.json()?;
        Ok(result.into_text())
    }

    fn name(&self) -> &str {
        "Anthropic"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}
