use crate::{
    agents::{generate_and_refine, Agent, Refiner, StageName, StageState, StageTracker},
    llm::LLMClient,
    types::{AppError, Checklist, ClinicalReport, Plan, Result},
    utils::normalize::normalize_field,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Assesses published clinical evidence for the planned drug and indication.
pub struct ClinicalAgent {
    llm: Arc<dyn LLMClient>,
    refiner: Refiner,
}

impl ClinicalAgent {
    pub const TEMPERATURE: f32 = 0.2;

    pub fn new(llm: Arc<dyn LLMClient>, refiner: Refiner) -> Self {
        Self { llm, refiner }
    }

    pub fn checklist() -> Checklist {
        Checklist::new([
            "Every evidence item has a source_id",
            "Claims are conservative",
            "Limitations are explicitly stated",
            "No overstated conclusions",
        ])
    }
}

#[async_trait]
impl Agent for ClinicalAgent {
    type Input = Plan;
    type Output = ClinicalReport;

    async fn execute(&self, plan: &Plan, tracker: &mut StageTracker) -> Result<ClinicalReport> {
        let task_input = serde_json::to_string(plan)
            .map_err(|e| AppError::Internal(format!("Failed to serialize plan: {}", e)))?;

        let mut doc = generate_and_refine(
            self,
            self.llm.as_ref(),
            &self.refiner,
            &Self::checklist(),
            task_input,
            tracker,
        )
        .await?;

        tracker.advance(StageState::Normalizing)?;
        normalize_field(&mut doc, "confidence_notes");
        if let Some(Value::Array(evidence)) = doc.get_mut("evidence") {
            for item in evidence.iter_mut().filter_map(Value::as_object_mut) {
                normalize_field(item, "limitations");
            }
        }

        let report = ClinicalReport::from_document(doc);
        info!(
            evidence = report.evidence().len(),
            overall_signal = report.overall_signal().unwrap_or("unknown"),
            "Clinical report ready"
        );

        Ok(report)
    }

    fn system_prompt(&self) -> String {
        r#"You are a clinical evidence analysis agent.

Review publicly available clinical trials and peer-reviewed studies relevant to the research plan.
Cite only sources you can identify. Do NOT fabricate citations.
Keep claims conservative and state limitations explicitly.

Return ONLY valid JSON with this schema:
{
  "drug": "string",
  "indication": "string",
  "evidence": [
    {
      "source_id": "string",
      "study_type": "string",
      "sample_size": "string",
      "outcome_summary": "string",
      "statistical_signal": "positive | mixed | negative | inconclusive",
      "limitations": ["string"]
    }
  ],
  "overall_signal": "strong | moderate | weak | insufficient",
  "confidence_notes": ["string"]
}"#
        .to_string()
    }

    fn stage(&self) -> StageName {
        StageName::Clinical
    }

    fn temperature(&self) -> f32 {
        Self::TEMPERATURE
    }
}
