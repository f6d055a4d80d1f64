//! # repurpose - Drug Repurposing Analysis Pipeline
//!
//! Turns a free-text question such as "Can metformin be repurposed for ovarian
//! cancer?" into a structured four-section report by chaining calls to a
//! text-generation service.
//!
//! ## Overview
//!
//! repurpose can be used in two ways:
//!
//! 1. **As a CLI** - Run the `repurpose` binary
//! 2. **As a library** - Drive [`ResearchCoordinator`] from your own code
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use repurpose::{Provider, RepurposeConfig, ResearchCoordinator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RepurposeConfig::load_or_default("repurpose.toml")?;
//!     let llm = Provider::Gemini(config.gemini_config()).create_client()?;
//!
//!     let coordinator = ResearchCoordinator::new(llm, config.refine.passes);
//!     let report = coordinator
//!         .analyze("Can metformin be repurposed for ovarian cancer?")
//!         .await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! query ──► plan ──┬──► clinical ──┐
//!                  └──► patent ────┴──► synthesis ──► report
//! ```
//!
//! Plan, clinical and patent outputs pass through a checklist-driven
//! [refiner](agents::refiner) before extraction. Every stage output is
//! [extracted](utils::extract) from free-form text and its list fields
//! [normalized](utils::normalize).
//!
//! ## Modules
//!
//! - [`agents`] - Pipeline stages and per-stage lifecycle tracking
//! - [`cli`] - Command-line parsing and terminal output
//! - [`llm`] - Generation client trait, Gemini client and backoff policy
//! - [`research`] - End-to-end orchestration
//! - [`types`] - Documents, reports and error types
//! - [`utils`] - Extraction, normalization and configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Pipeline stages.
pub mod agents;
/// Command-line interface.
pub mod cli;
/// Generation service clients.
pub mod llm;
/// Analysis orchestration.
pub mod research;
/// Core types (documents, reports, errors).
pub mod types;
/// Extraction, normalization and configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{Agent, StageName, StageState, StageTracker};
pub use llm::{BackoffPolicy, GeminiClient, GeminiConfig, LLMClient, Provider};
pub use research::ResearchCoordinator;
pub use types::{AnalysisReport, AppError, Document, ExtractionError, Result};
pub use utils::toml_config::RepurposeConfig;
