use crate::{
    agents::{generate_and_refine, Agent, Refiner, StageName, StageState, StageTracker},
    llm::LLMClient,
    types::{AppError, Checklist, Document, PatentReport, Plan, Result},
    utils::normalize::normalize_field,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

const FREEDOM_TO_OPERATE: &str = "freedom_to_operate";

/// Shapes the model uses for freedom to operate.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FreedomToOperate {
    Status(String),
    Detailed { status: String },
}

/// Replace `{"status": "...", ...}` with the bare status string.
///
/// Other shapes are left untouched.
pub fn flatten_freedom_to_operate(doc: &mut Document) {
    let Some(value) = doc.get(FREEDOM_TO_OPERATE) else {
        return;
    };
    if let Ok(FreedomToOperate::Detailed { status }) = FreedomToOperate::deserialize(value) {
        debug!(status = %status, "Flattening detailed freedom_to_operate");
        doc.insert(FREEDOM_TO_OPERATE.to_string(), Value::String(status));
    }
}

/// Maps the patent landscape around the planned drug and indication.
pub struct PatentAgent {
    llm: Arc<dyn LLMClient>,
    refiner: Refiner,
}

impl PatentAgent {
    pub const TEMPERATURE: f32 = 0.2;

    pub fn new(llm: Arc<dyn LLMClient>, refiner: Refiner) -> Self {
        Self { llm, refiner }
    }

    pub fn checklist() -> Checklist {
        Checklist::new([
            "No legal claims made",
            "Freedom to operate matches evidence",
            "Expiry logic not overstated",
            "Risks clearly articulated",
        ])
    }
}

#[async_trait]
impl Agent for PatentAgent {
    type Input = Plan;
    type Output = PatentReport;

    async fn execute(&self, plan: &Plan, tracker: &mut StageTracker) -> Result<PatentReport> {
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
        normalize_field(&mut doc, "risks");
        normalize_field(&mut doc, "whitespace_opportunities");
        flatten_freedom_to_operate(&mut doc);

        let report = PatentReport::from_document(doc);
        info!(
            key_patents = report.key_patents().len(),
            freedom_to_operate = report.freedom_to_operate().unwrap_or("unknown"),
            "Patent report ready"
        );

        Ok(report)
    }

    fn system_prompt(&self) -> String {
        r#"You are a patent landscape analysis agent.

Identify patents relevant to the research plan and summarize coverage, expiry and jurisdiction.
Do NOT provide legal advice. Do not overstate expiry or enforceability.

Return ONLY valid JSON with this schema:
{
  "drug": "string",
  "indication": "string",
  "key_patents": [
    {
      "patent_id": "string",
      "jurisdiction": "string",
      "filing_year": "string",
      "expiry_year": "string",
      "coverage_type": "string",
      "relevance": "high | medium | low"
    }
  ],
  "freedom_to_operate": "high | moderate | low | unclear",
  "risks": ["string"],
  "whitespace_opportunities": ["string"]
}"#
        .to_string()
    }

    fn stage(&self) -> StageName {
        StageName::Patent
    }

    fn temperature(&self) -> f32 {
        Self::TEMPERATURE
    }
}
