//! Gemini client tests against a mocked Generative Language API
//!
//! These tests use wiremock to validate:
//! - Rate-limit backoff and retry exhaustion
//! - Non-retryable transport failures
//! - Response shape handling and fence stripping
//! - Credential checks before any network call

use repurpose::llm::{BackoffPolicy, GeminiClient, GeminiConfig, LLMClient};
use repurpose::types::{AppError, GenerationRequest};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

// ============= Helper Functions =============

fn candidate_response(text: &str) -> Value {
    json!({
        "candidates": [
            {"content": {"parts": [{"text": text}], "role": "model"}, "finishReason": "STOP"}
        ]
    })
}

fn client_for(server: &MockServer, api_key: Option<&str>) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        base_url: format!("{}/v1beta", server.uri()),
        model: MODEL.to_string(),
        api_key: api_key.map(str::to_string),
        timeout: Duration::from_secs(5),
        max_output_tokens: 2048,
        backoff: BackoffPolicy::new(3, Duration::from_millis(10)),
    })
    .unwrap()
}

fn request() -> GenerationRequest {
    GenerationRequest::new("You are terse.", "Say hi").with_temperature(0.2)
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

// ============= Success Paths =============

#[tokio::test]
async fn test_candidate_text_returned() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "You are terse.\n\nSay hi"}]}],
            "generationConfig": {"maxOutputTokens": 2048}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_response("hi")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let text = client.generate(&request()).await.unwrap();

    assert_eq!(text, "hi");
}

#[tokio::test]
async fn test_fenced_output_is_stripped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_response("```json\n{\"drug\": \"metformin\"}\n```")),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let text = client.generate(&request()).await.unwrap();

    assert_eq!(text, "{\"drug\": \"metformin\"}");
}

#[tokio::test]
async fn test_flat_text_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "  flat  "})))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    assert_eq!(client.generate(&request()).await.unwrap(), "flat");
}

#[tokio::test]
async fn test_unrecognized_shape_is_unexpected_format() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"promptFeedback": {}})))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let result = client.generate(&request()).await;

    assert!(matches!(result, Err(AppError::UnexpectedFormat(_))));
    assert_eq!(request_count(&server).await, 1);
}

// ============= Retry Behaviour =============

#[tokio::test]
async fn test_two_rate_limits_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_response("ok")))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let text = client.generate(&request()).await.unwrap();

    assert_eq!(text, "ok");
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let result = client.generate(&request()).await;

    assert!(matches!(
        result,
        Err(AppError::RetryExhausted { attempts: 3 })
    ));
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_server_error_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let result = client.generate(&request()).await;

    match result {
        Err(AppError::Transport(message)) => {
            assert!(message.contains("500"));
            assert!(message.contains("backend exploded"));
        }
        other => panic!("expected transport error, got {:?}", other),
    }
    assert_eq!(request_count(&server).await, 1);
}

// ============= Configuration =============

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_response("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let result = client.generate(&request()).await;

    assert!(matches!(result, Err(AppError::Configuration(_))));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_output_cap_applied_to_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({"generationConfig": {"maxOutputTokens": 512}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_response("capped")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    let text = client
        .generate(&request().with_max_tokens(512))
        .await
        .unwrap();

    assert_eq!(text, "capped");
}
