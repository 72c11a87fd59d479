//! AI provider trait for abstracting LLM interactions.
//!
//! The dataset service only needs "prompt in, text out"; any backend that
//! can do that implements [`AIProvider`].
//!
//! # Implementing a New Provider
//!
//! 1. Create a new file in `src/ai/` (e.g., `openai.rs`)
//! 2. Implement the [`AIProvider`] trait for your provider struct
//! 3. Export the provider in `src/ai/mod.rs`

use anyhow::Result;

/// Trait for text-completion backends used to narrate datasets and charts.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single provider can be shared
/// by concurrent requests.
pub trait AIProvider: Send + Sync {
    /// Send `prompt` and return the completion text.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or the response cannot be decoded.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}
