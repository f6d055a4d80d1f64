//! Gemini LLM client implementation
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`)
//! with the API key passed as the `key` query parameter.
//!
//! # Retry behaviour
//!
//! Only HTTP 429 responses are retried, using the configured [`BackoffPolicy`].
//! Every other failure propagates immediately.
//!
//! # Example
//!
//! ```rust,ignore
//! use repurpose::llm::gemini::{GeminiClient, GeminiConfig};
//!
//! let client = GeminiClient::new(GeminiConfig {
//!     api_key: Some(std::env::var("GEMINI_API_KEY")?),
//!     ..GeminiConfig::default()
//! })?;
//! let text = client.generate_with_system("You are terse.", "Say hi").await?;
//! ```

use crate::llm::client::LLMClient;
use crate::llm::retry::BackoffPolicy;
use crate::types::{AppError, GenerationRequest, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::{debug, info};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*\n?").expect("code fence pattern is valid"));

/// Explicit configuration for [`GeminiClient`], built once at startup.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    /// `None` makes every call fail with a configuration error
    pub api_key: Option<String>,
    /// Per-call network timeout
    pub timeout: Duration,
    /// Upper bound applied to each request's output size
    pub max_output_tokens: u32,
    pub backoff: BackoffPolicy,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-flash-latest".to_string(),
            api_key: None,
            timeout: Duration::from_secs(600),
            max_output_tokens: GenerationRequest::DEFAULT_MAX_TOKENS,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Gemini client for API-based inference
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        json!({
            "contents": [
                {
                    "parts": [
                        {"text": request.prompt()}
                    ]
                }
            ],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens.min(self.config.max_output_tokens)
            }
        })
    }

    /// One HTTP round trip, classified into the error taxonomy
    async fn send_once(&self, api_key: &str, body: &Value) -> Result<String> {
        let start = Instant::now();

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited(format!(
                "Gemini returned {} for model {}",
                status, self.config.model
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Transport(format!(
                "Gemini request failed ({}): {}",
                status, text
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| AppError::UnexpectedFormat(format!("Failed to parse response: {}", e)))?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Gemini response received"
        );

        ResponseShape::classify(&data).into_text()
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("Gemini API key is not configured".to_string())
        })?;

        let body = self.request_body(request);
        info!(
            model = %self.config.model,
            prompt_len = request.prompt().len(),
            temperature = request.temperature,
            "Sending Gemini request"
        );

        self.config
            .backoff
            .retry(AppError::is_rate_limited, |_| self.send_once(api_key, &body))
            .await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// ============= Response Parsing =============

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// The response body shapes the service is known to produce
#[derive(Debug, Clone, PartialEq)]
enum ResponseShape {
    /// `candidates[0].content.parts[0].text`
    Candidate(String),
    /// Top-level `text` or `content` string
    Flat(String),
    Unrecognized,
}

impl ResponseShape {
    fn classify(data: &Value) -> Self {
        if !data.is_object() {
            return ResponseShape::Unrecognized;
        }

        // A malformed `candidates` entry must not hide a usable flat field
        let candidates = data
            .get("candidates")
            .and_then(|v| Vec::<Candidate>::deserialize(v).ok())
            .unwrap_or_default();
        let candidate_text = candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
            .filter(|text| !text.is_empty());
        if let Some(text) = candidate_text {
            return ResponseShape::Candidate(text.to_string());
        }

        ["text", "content"]
            .into_iter()
            .find_map(|key| data.get(key).and_then(Value::as_str))
            .map(|text| ResponseShape::Flat(text.to_string()))
            .unwrap_or(ResponseShape::Unrecognized)
    }

    fn into_text(self) -> Result<String> {
        match self {
            ResponseShape::Candidate(text) => Ok(strip_code_fences(&text)),
            ResponseShape::Flat(text) => Ok(strip_code_fences(&text)),
            ResponseShape::Unrecognized => {
                debug!("Unrecognized Gemini response body");
                Err(AppError::UnexpectedFormat(
                    "Unexpected Gemini response format".to_string(),
                ))
            }
        }
    }
}

/// Remove ```` ``` ```` / ```` ```json ```` markers and surrounding whitespace
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}
