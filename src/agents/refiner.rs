//! Checklist-driven self-review
//!
//! The refiner hands a stage's JSON output back to the model together with a
//! checklist and asks it to return a corrected version. Nothing here checks the
//! checklist; the result is raw text for the extractor.

use crate::llm::LLMClient;
use crate::types::{Checklist, GenerationRequest, Result};
use std::sync::Arc;
use tracing::debug;

const REFINER_PROMPT: &str = "You are a reasoning validator. Your job is to critically review the \
provided JSON output against a checklist. If issues exist, revise the JSON to fix them. \
Return ONLY valid JSON. No explanations.";

pub struct Refiner {
    llm: Arc<dyn LLMClient>,
    passes: usize,
}

impl Refiner {
    pub const DEFAULT_PASSES: usize = 1;
    pub const TEMPERATURE: f32 = 0.1;

    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self {
            llm,
            passes: Self::DEFAULT_PASSES,
        }
    }

    /// Number of review rounds. Zero disables refinement entirely.
    pub fn with_passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    fn request(content: &str, checklist: &Checklist) -> GenerationRequest {
        GenerationRequest::new(
            REFINER_PROMPT,
            format!(
                "CHECKLIST:\n{}\n\nJSON OUTPUT:\n{}",
                checklist.render(),
                content
            ),
        )
        .with_temperature(Self::TEMPERATURE)
    }

    /// Run the configured number of review passes over `content`.
    ///
    /// Each pass feeds the previous pass's raw output back in. With zero passes
    /// the input is returned unchanged.
    pub async fn refine(&self, content: &str, checklist: &Checklist) -> Result<String> {
        let mut current = content.to_string();

        for pass in 0..self.passes {
            debug!(
                pass = pass + 1,
                passes = self.passes,
                checklist_items = checklist.items().len(),
                "Refining output"
            );
            current = self.llm.generate(&Self::request(&current, checklist)).await?;
        }

        Ok(current)
    }
}
