//! Generation Service Clients
//!
//! This module provides the interface the pipeline uses to talk to the
//! external text-generation service.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The trait every stage depends on
//! - [`gemini::GeminiClient`] - REST client for the Generative Language API
//! - [`retry::BackoffPolicy`] - Transport-independent exponential backoff
//! - [`Provider`] - Runtime provider selection
//!
//! # Example
//!
//! ```ignore
//! use repurpose::llm::{LLMClient, Provider};
//! use repurpose::utils::toml_config::RepurposeConfig;
//!
//! let config = RepurposeConfig::load_or_default("repurpose.toml")?;
//! let client = Provider::Gemini(config.gemini_config()).create_client()?;
//!
//! let text = client.generate_with_system("You are a planner.", "Query: ...").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Gemini REST client.
pub mod gemini;
/// Exponential backoff policy.
pub mod retry;

pub use client::{LLMClient, Provider};
pub use gemini::{GeminiClient, GeminiConfig};
pub use retry::BackoffPolicy;
