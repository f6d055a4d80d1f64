//! Analysis orchestration
//!
//! [`coordinator::ResearchCoordinator`] drives one analysis end to end:
//!
//! 1. **Plan** - decompose the query into clinical and patent tasks
//! 2. **Clinical ∥ Patent** - both domain stages run concurrently on the plan
//! 3. **Synthesis** - combine the three documents into a scored assessment
//!
//! Any stage failure aborts the analysis; no partial report is returned.
//!
//! # Usage
//!
//! ```ignore
//! use repurpose::research::coordinator::ResearchCoordinator;
//!
//! let coordinator = ResearchCoordinator::new(llm, 1);
//! let report = coordinator
//!     .analyze("Can metformin be repurposed for ovarian cancer?")
//!     .await?;
//!
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

/// Stage sequencing and concurrent fan-out.
pub mod coordinator;

pub use coordinator::ResearchCoordinator;
