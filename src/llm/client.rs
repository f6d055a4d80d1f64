//! Generation client abstraction
//!
//! Every stage talks to the text-generation service through [`LLMClient`], so the
//! pipeline can run against the Gemini REST client in production and a scripted
//! client in tests.

use crate::types::{GenerationRequest, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Issue one generation request and return the raw text
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Generate from role instructions and task input with the default settings
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate(&GenerationRequest::new(system, prompt)).await
    }

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Generative Language API (`generateContent`)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Gemini(GeminiConfig {
    ///     api_key: Some("...".to_string()),
    ///     ..GeminiConfig::default()
    /// });
    /// ```
    Gemini(super::gemini::GeminiConfig),
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>> {
        match self {
            Provider::Gemini(config) => Ok(Arc::new(super::gemini::GeminiClient::new(
                config.clone(),
            )?)),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini(_) => "Gemini",
        }
    }
}
