use crate::{
    agents::{Agent, StageName, StageState, StageTracker},
    llm::LLMClient,
    types::{AppError, Document, Findings, GenerationRequest, Result, Synthesis},
    utils::{extract::extract, normalize::normalize_field},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Appended to the role instructions when the first attempt is not JSON
pub const STRICT_JSON_SUFFIX: &str = "\n\nIMPORTANT: Output ONLY raw JSON. No text.";

pub const SYNTHESIS_LIST_FIELDS: [&str; 5] = [
    "aligned_signals",
    "key_risks",
    "recommended_next_steps",
    "explicit_limitations",
    "contradictions",
];

const SCORE_KEY: &str = "hypothesis_strength_score";

/// Coerce a score to an integer: integers pass, floats truncate, numeric
/// strings are parsed.
pub fn coerce_score(value: Option<&Value>) -> Result<i64> {
    let coerced = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };

    coerced.ok_or_else(|| {
        AppError::Coercion(format!(
            "hypothesis_strength_score.value is not numeric: {}",
            value.map(Value::to_string).unwrap_or_else(|| "missing".to_string())
        ))
    })
}

fn normalize_score(doc: &mut Document) -> Result<i64> {
    let score = doc
        .get_mut(SCORE_KEY)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| AppError::Coercion(format!("{} object is missing", SCORE_KEY)))?;

    let value = coerce_score(score.get("value"))?;
    score.insert("value".to_string(), Value::from(value));
    normalize_field(score, "rationale");

    Ok(value)
}

/// Combines plan, clinical and patent findings into a scored assessment.
pub struct SynthesisAgent {
    llm: Arc<dyn LLMClient>,
}

impl SynthesisAgent {
    pub const TEMPERATURE: f32 = 0.25;
    pub const STRICT_TEMPERATURE: f32 = 0.1;

    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for SynthesisAgent {
    type Input = Findings;
    type Output = Synthesis;

    async fn execute(&self, findings: &Findings, tracker: &mut StageTracker) -> Result<Synthesis> {
        let task_input = serde_json::to_string_pretty(findings)
            .map_err(|e| AppError::Internal(format!("Failed to serialize findings: {}", e)))?;

        let request = GenerationRequest::new(self.system_prompt(), task_input.clone())
            .with_temperature(self.temperature());

        tracker.advance(StageState::Generating)?;
        let raw = self.llm.generate(&request).await?;

        tracker.advance(StageState::Extracting)?;
        let mut doc = match extract(&raw) {
            Ok(doc) => doc,
            Err(first) => {
                warn!(error = %first, "Synthesis output is not JSON, regenerating with strict instruction");

                let strict = GenerationRequest::new(
                    format!("{}{}", self.system_prompt(), STRICT_JSON_SUFFIX),
                    task_input,
                )
                .with_temperature(Self::STRICT_TEMPERATURE);

                tracker.advance(StageState::Generating)?;
                let retry = self.llm.generate(&strict).await?;

                tracker.advance(StageState::Extracting)?;
                extract(&retry)?
            }
        };

        tracker.advance(StageState::Normalizing)?;
        for key in SYNTHESIS_LIST_FIELDS {
            normalize_field(&mut doc, key);
        }
        let score = normalize_score(&mut doc)?;

        info!(score, "Synthesis ready");
        Ok(Synthesis::from_document(doc))
    }

    fn system_prompt(&self) -> String {
        r#"You are a senior pharmaceutical strategy analyst.

Combine the research plan, clinical evidence and patent landscape into a decision-oriented assessment of the repurposing hypothesis.
Score hypothesis strength from 0 to 100. Call out where clinical and patent findings agree or conflict.
Be explicit about what the evidence cannot support.

Return ONLY valid JSON with this schema:
{
  "hypothesis_strength_score": {
    "value": 0,
    "rationale": ["string"]
  },
  "aligned_signals": ["string"],
  "contradictions": ["string"],
  "key_risks": ["string"],
  "opportunity_summary": "string",
  "recommended_next_steps": ["string"],
  "explicit_limitations": ["string"]
}"#
        .to_string()
    }

    fn stage(&self) -> StageName {
        StageName::Synthesis
    }

    fn temperature(&self) -> f32 {
        Self::TEMPERATURE
    }
}
