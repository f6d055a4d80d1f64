use crate::{
    agents::{generate_and_refine, Agent, Refiner, StageName, StageState, StageTracker},
    llm::LLMClient,
    types::{Checklist, Plan, Result},
    utils::normalize::normalize_field,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// List fields coerced to `Vec<String>` after extraction
pub const PLAN_LIST_FIELDS: [&str; 4] =
    ["objectives", "assumptions", "constraints", "required_sources"];

/// Turns a free-text query into a structured investigation plan.
pub struct PlannerAgent {
    llm: Arc<dyn LLMClient>,
    refiner: Refiner,
}

impl PlannerAgent {
    pub const TEMPERATURE: f32 = 0.3;

    pub fn new(llm: Arc<dyn LLMClient>, refiner: Refiner) -> Self {
        Self { llm, refiner }
    }

    pub fn checklist() -> Checklist {
        Checklist::new([
            "At least one clinical task exists",
            "At least one patent task exists",
            "Tasks are answerable using public data",
            "No market or financial analysis",
        ])
    }
}

#[async_trait]
impl Agent for PlannerAgent {
    type Input = str;
    type Output = Plan;

    async fn execute(&self, query: &str, tracker: &mut StageTracker) -> Result<Plan> {
        let mut doc = generate_and_refine(
            self,
            self.llm.as_ref(),
            &self.refiner,
            &Self::checklist(),
            format!("Query: {}", query),
            tracker,
        )
        .await?;

        tracker.advance(StageState::Normalizing)?;
        for key in PLAN_LIST_FIELDS {
            normalize_field(&mut doc, key);
        }

        let plan = Plan::from_document(doc);
        for role in plan.uncovered_roles() {
            warn!(role = %role, "Plan has no task for agent");
        }
        info!(
            drug = plan.drug().unwrap_or("unknown"),
            tasks = plan.tasks().len(),
            "Plan ready"
        );

        Ok(plan)
    }

    fn system_prompt(&self) -> String {
        r#"You are a pharmaceutical AI research planner.

Decompose the user's drug repurposing query into concrete research tasks that can be answered from public data.
Route each task to exactly one agent: "clinical" for trial and literature evidence, "patent" for intellectual property.
Do not plan market, pricing or financial analysis.

Return ONLY valid JSON with this schema:
{
  "drug": "string",
  "indication": "string",
  "objectives": ["string"],
  "tasks": [
    {
      "task_id": "string",
      "agent": "clinical | patent",
      "description": "string",
      "priority": "high | medium | low"
    }
  ],
  "assumptions": ["string"],
  "constraints": ["string"],
  "required_sources": ["string"]
}"#
        .to_string()
    }

    fn stage(&self) -> StageName {
        StageName::Plan
    }

    fn temperature(&self) -> f32 {
        Self::TEMPERATURE
    }
}
