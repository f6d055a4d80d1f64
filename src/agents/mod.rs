//! Pipeline stages
//!
//! Each stage is an [`Agent`]: a fixed role prompt, a sampling temperature and
//! an `execute` step that turns its input into a normalized document.
//!
//! - [`planner::PlannerAgent`] - query → [`Plan`](crate::types::Plan)
//! - [`clinical::ClinicalAgent`] - plan → clinical evidence report
//! - [`patent::PatentAgent`] - plan → patent landscape report
//! - [`synthesis::SynthesisAgent`] - findings → final assessment
//!
//! The first three share [`generate_and_refine`]; synthesis skips refinement
//! and instead regenerates once with a strict JSON instruction.

pub mod clinical;
pub mod patent;
pub mod planner;
pub mod refiner;
pub mod stage;
pub mod synthesis;

use crate::llm::LLMClient;
use crate::types::{Checklist, Document, GenerationRequest, Result};
use crate::utils::extract::extract;
use async_trait::async_trait;
use tracing::warn;

pub use clinical::ClinicalAgent;
pub use patent::PatentAgent;
pub use planner::PlannerAgent;
pub use refiner::Refiner;
pub use stage::{StageName, StageState, StageTracker};
pub use synthesis::SynthesisAgent;

/// Base trait for all pipeline stages
#[async_trait]
pub trait Agent: Send + Sync {
    type Input: ?Sized + Sync;
    type Output: Send;

    /// Produce the stage output, reporting progress on `tracker`
    async fn execute(&self, input: &Self::Input, tracker: &mut StageTracker)
        -> Result<Self::Output>;

    /// Get the agent's role instructions
    fn system_prompt(&self) -> String;

    fn stage(&self) -> StageName;

    fn temperature(&self) -> f32;

    /// Run the stage from `Pending` to `Done` or `Failed`
    async fn run(&self, input: &Self::Input) -> Result<Self::Output> {
        let mut tracker = StageTracker::new(self.stage());
        let result = self.execute(input, &mut tracker).await;
        tracker.finish(result)
    }
}

/// Generate, check the draft, refine it against `checklist`, then extract.
///
/// The refiner always sees the raw draft, surrounding prose included. The
/// first extraction is only diagnostic unless refinement is disabled, in which
/// case it is authoritative. Leaves `tracker` in `Extracting`; the caller
/// normalizes.
pub async fn generate_and_refine<A>(
    agent: &A,
    llm: &dyn LLMClient,
    refiner: &Refiner,
    checklist: &Checklist,
    task_input: String,
    tracker: &mut StageTracker,
) -> Result<Document>
where
    A: Agent + ?Sized,
{
    let request =
        GenerationRequest::new(agent.system_prompt(), task_input).with_temperature(agent.temperature());

    tracker.advance(StageState::Generating)?;
    let raw = llm.generate(&request).await?;

    tracker.advance(StageState::Extracting)?;
    let draft = extract(&raw);

    if refiner.passes() == 0 {
        return Ok(draft?);
    }
    if let Err(e) = &draft {
        warn!(stage = %agent.stage(), error = %e, "Draft output is not JSON, refining anyway");
    }

    tracker.advance(StageState::Refining)?;
    let refined = refiner.refine(&raw, checklist).await?;

    tracker.advance(StageState::Extracting)?;
    Ok(extract(&refined)?)
}
