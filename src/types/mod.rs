use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object recovered from generation output.
pub type Document = Map<String, Value>;

// ============= Generation Types =============

/// A single request to the text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Role instructions (system prompt)
    pub role_instructions: String,
    /// Task input (user prompt)
    pub task_input: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of output tokens
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;
    pub const DEFAULT_MAX_TOKENS: u32 = 2048;

    pub fn new(role_instructions: impl Into<String>, task_input: impl Into<String>) -> Self {
        Self {
            role_instructions: role_instructions.into(),
            task_input: task_input.into(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The combined prompt sent over the wire
    pub fn prompt(&self) -> String {
        format!("{}\n\n{}", self.role_instructions, self.task_input)
    }
}

/// Natural-language assertions handed to the refiner. Never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Checklist {
    items: Vec<String>,
}

impl Checklist {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render as a bullet list for inclusion in a prompt
    pub fn render(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============= Agent Types =============

/// The two downstream agents a plan task can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Clinical,
    Patent,
}

impl AgentRole {
    pub const ALL: [AgentRole; 2] = [AgentRole::Clinical, AgentRole::Patent];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Clinical => "clinical",
            AgentRole::Patent => "patent",
        }
    }

    /// Parse a role name as emitted by the planner ("Clinical", " patent ", ...)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "clinical" => Some(AgentRole::Clinical),
            "patent" => Some(AgentRole::Patent),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One task from the plan's task list.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTask {
    pub task_id: String,
    /// Parsed routing target; `None` when the planner named an unknown agent
    pub agent: Option<AgentRole>,
    pub description: String,
    /// Passed through as received ("high" | "medium" | "low")
    pub priority: String,
}

fn str_field<'a>(doc: &'a Document, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

fn string_list(doc: &Document, key: &str) -> Vec<String> {
    doc.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Investigation plan produced from the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan(Document);

impl Plan {
    pub fn from_document(doc: Document) -> Self {
        Self(doc)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    pub fn drug(&self) -> Option<&str> {
        str_field(&self.0, "drug")
    }

    pub fn indication(&self) -> Option<&str> {
        str_field(&self.0, "indication")
    }

    pub fn objectives(&self) -> Vec<String> {
        string_list(&self.0, "objectives")
    }

    pub fn assumptions(&self) -> Vec<String> {
        string_list(&self.0, "assumptions")
    }

    pub fn constraints(&self) -> Vec<String> {
        string_list(&self.0, "constraints")
    }

    pub fn required_sources(&self) -> Vec<String> {
        string_list(&self.0, "required_sources")
    }

    pub fn tasks(&self) -> Vec<PlanTask> {
        let Some(tasks) = self.0.get("tasks").and_then(Value::as_array) else {
            return Vec::new();
        };

        tasks
            .iter()
            .filter_map(Value::as_object)
            .map(|task| PlanTask {
                task_id: str_field(task, "task_id").unwrap_or_default().to_string(),
                agent: str_field(task, "agent").and_then(AgentRole::parse),
                description: str_field(task, "description")
                    .unwrap_or_default()
                    .to_string(),
                priority: str_field(task, "priority").unwrap_or_default().to_string(),
            })
            .collect()
    }

    pub fn tasks_for(&self, role: AgentRole) -> Vec<PlanTask> {
        self.tasks()
            .into_iter()
            .filter(|task| task.agent == Some(role))
            .collect()
    }

    /// Roles with no task routed to them
    pub fn uncovered_roles(&self) -> Vec<AgentRole> {
        let tasks = self.tasks();
        AgentRole::ALL
            .into_iter()
            .filter(|role| !tasks.iter().any(|t| t.agent == Some(*role)))
            .collect()
    }
}

/// Clinical evidence report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClinicalReport(Document);

impl ClinicalReport {
    pub fn from_document(doc: Document) -> Self {
        Self(doc)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn overall_signal(&self) -> Option<&str> {
        str_field(&self.0, "overall_signal")
    }

    pub fn confidence_notes(&self) -> Vec<String> {
        string_list(&self.0, "confidence_notes")
    }

    pub fn evidence(&self) -> &[Value] {
        self.0
            .get("evidence")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Patent landscape report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatentReport(Document);

impl PatentReport {
    pub fn from_document(doc: Document) -> Self {
        Self(doc)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn freedom_to_operate(&self) -> Option<&str> {
        str_field(&self.0, "freedom_to_operate")
    }

    pub fn risks(&self) -> Vec<String> {
        string_list(&self.0, "risks")
    }

    pub fn whitespace_opportunities(&self) -> Vec<String> {
        string_list(&self.0, "whitespace_opportunities")
    }

    pub fn key_patents(&self) -> &[Value] {
        self.0
            .get("key_patents")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Final decision-oriented assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Synthesis(Document);

impl Synthesis {
    pub fn from_document(doc: Document) -> Self {
        Self(doc)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    fn score_object(&self) -> Option<&Document> {
        self.0
            .get("hypothesis_strength_score")
            .and_then(Value::as_object)
    }

    /// The coerced hypothesis strength score
    pub fn score(&self) -> Option<i64> {
        self.score_object()
            .and_then(|score| score.get("value"))
            .and_then(Value::as_i64)
    }

    pub fn score_rationale(&self) -> Vec<String> {
        self.score_object()
            .map(|score| string_list(score, "rationale"))
            .unwrap_or_default()
    }

    pub fn opportunity_summary(&self) -> Option<&str> {
        str_field(&self.0, "opportunity_summary")
    }

    pub fn aligned_signals(&self) -> Vec<String> {
        string_list(&self.0, "aligned_signals")
    }

    pub fn contradictions(&self) -> Vec<String> {
        string_list(&self.0, "contradictions")
    }

    pub fn key_risks(&self) -> Vec<String> {
        string_list(&self.0, "key_risks")
    }

    pub fn recommended_next_steps(&self) -> Vec<String> {
        string_list(&self.0, "recommended_next_steps")
    }

    pub fn explicit_limitations(&self) -> Vec<String> {
        string_list(&self.0, "explicit_limitations")
    }
}

/// Everything synthesis reasons over. Serializes as `{plan, clinical, patent}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    pub plan: Plan,
    pub clinical: ClinicalReport,
    pub patent: PatentReport,
}

/// The assembled result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(rename = "master")]
    pub plan: Plan,
    pub clinical: ClinicalReport,
    pub patent: PatentReport,
    pub synthesis: Synthesis,
}

impl AnalysisReport {
    pub fn new(findings: Findings, synthesis: Synthesis) -> Self {
        Self {
            plan: findings.plan,
            clinical: findings.clinical,
            patent: findings.patent,
            synthesis,
        }
    }
}

// ============= Error Types =============

/// Failure to recover a JSON object from generation output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("Empty LLM response")]
    Empty,

    #[error("No JSON object found in LLM response")]
    NoObjectFound,

    #[error("Invalid extracted JSON: {0}")]
    InvalidObject(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Failed after {attempts} attempts due to rate limiting")]
    RetryExhausted { attempts: u32 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Coercion error: {0}")]
    Coercion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is a transient rate-limit response
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
