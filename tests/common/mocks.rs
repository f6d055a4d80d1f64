//! Mock implementations for testing.
//!
//! [`ScriptedLLMClient`] answers each request through a caller-supplied
//! handler and records every request it sees, so tests can assert on call
//! counts, prompts and temperatures without a network.

use async_trait::async_trait;
use parking_lot::Mutex;
use repurpose::llm::LLMClient;
use repurpose::types::{GenerationRequest, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Which stage prompt a request was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptRole {
    Planner,
    Clinical,
    Patent,
    Refiner,
    Synthesis,
}

impl PromptRole {
    pub fn of(request: &GenerationRequest) -> Option<Self> {
        let role = request.role_instructions.as_str();
        if role.starts_with("You are a pharmaceutical AI research planner") {
            Some(PromptRole::Planner)
        } else if role.starts_with("You are a clinical evidence analysis agent") {
            Some(PromptRole::Clinical)
        } else if role.starts_with("You are a patent landscape analysis agent") {
            Some(PromptRole::Patent)
        } else if role.starts_with("You are a reasoning validator") {
            Some(PromptRole::Refiner)
        } else if role.starts_with("You are a senior pharmaceutical strategy analyst") {
            Some(PromptRole::Synthesis)
        } else {
            None
        }
    }
}

type Handler = Box<dyn Fn(&GenerationRequest) -> Result<String> + Send + Sync>;

/// Mock LLM client driven by a handler closure.
pub struct ScriptedLLMClient {
    handler: Handler,
    delays: HashMap<PromptRole, Duration>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedLLMClient {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            delays: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering requests for `role`
    pub fn with_delay(mut self, role: PromptRole, delay: Duration) -> Self {
        self.delays.insert(role, delay);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests_for(&self, role: PromptRole) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| PromptRole::of(r) == Some(role))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLMClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().push(request.clone());

        if let Some(delay) = PromptRole::of(request).and_then(|role| self.delays.get(&role)) {
            tokio::time::sleep(*delay).await;
        }

        (self.handler)(request)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Return the JSON the refiner was asked to review, unchanged
pub fn refiner_echo(request: &GenerationRequest) -> String {
    request
        .task_input
        .split_once("JSON OUTPUT:\n")
        .map(|(_, content)| content.to_string())
        .unwrap_or_default()
}

/// Answer every stage with the canned fixtures below
pub fn happy_path(request: &GenerationRequest) -> Result<String> {
    Ok(match PromptRole::of(request) {
        Some(PromptRole::Planner) => plan_json().to_string(),
        Some(PromptRole::Clinical) => clinical_json().to_string(),
        Some(PromptRole::Patent) => patent_json().to_string(),
        Some(PromptRole::Refiner) => refiner_echo(request),
        Some(PromptRole::Synthesis) => synthesis_json().to_string(),
        None => String::new(),
    })
}

pub fn plan_json() -> Value {
    json!({
        "drug": "metformin",
        "indication": "ovarian cancer",
        "objectives": ["Assess clinical evidence", {"description": "Map patent landscape"}],
        "tasks": [
            {"task_id": "T1", "agent": "clinical", "description": "Review trials", "priority": "high"},
            {"task_id": "T2", "agent": "patent", "description": "Review patents", "priority": "medium"}
        ],
        "assumptions": "Public data only",
        "constraints": [],
        "required_sources": ["ClinicalTrials.gov", "PubMed", 42]
    })
}

pub fn clinical_json() -> Value {
    json!({
        "drug": "metformin",
        "indication": "ovarian cancer",
        "evidence": [
            {
                "source_id": "NCT01579812",
                "study_type": "Phase II RCT",
                "sample_size": "38",
                "outcome_summary": "Improved progression-free survival",
                "statistical_signal": "positive",
                "limitations": [{"description": "Small sample"}, "Single centre"]
            }
        ],
        "overall_signal": "moderate",
        "confidence_notes": null
    })
}

pub fn patent_json() -> Value {
    json!({
        "drug": "metformin",
        "indication": "ovarian cancer",
        "key_patents": [],
        "freedom_to_operate": {"status": "moderate", "notes": "Composition patents expired"},
        "risks": [{"description": "Method-of-use claims"}],
        "whitespace_opportunities": "Combination therapy"
    })
}

pub fn synthesis_json() -> Value {
    json!({
        "hypothesis_strength_score": {"value": "72", "rationale": "Consistent early signals"},
        "aligned_signals": ["Positive phase II data"],
        "contradictions": [],
        "key_risks": [{"description": "Limited trial size"}],
        "opportunity_summary": "Worth a confirmatory trial",
        "recommended_next_steps": ["Design phase III"],
        "explicit_limitations": ["No proprietary data"]
    })
}
