//! Integration tests for the chat-completion report generator
//!
//! These tests run the client against a mock HTTP server and verify
//! request shape, response extraction, failure classification and retry.

use chrono::Utc;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use incident_router::domain::incident::{FireLevel, FireResponse, ReportSummary};
use incident_router::domain::reporting::{ReportGenerationError, ReportGenerator};
use incident_router::infrastructure::report_generators::{
    ChatCompletionConfig, ChatCompletionReportGenerator,
};
use incident_router::infrastructure::retry::RetryPolicy;

fn summary() -> ReportSummary {
    ReportSummary::from_dispatch(
        &FireResponse {
            level: FireLevel::High,
            units: 10,
        },
        Utc::now(),
    )
}

fn generator(server: &MockServer, retry: RetryPolicy) -> ChatCompletionReportGenerator {
    let config = ChatCompletionConfig::new("sk-test")
        .with_base_url(format!("{}/v1", server.uri()))
        .with_timeout(Duration::from_millis(500))
        .with_retry(retry);
    ChatCompletionReportGenerator::new(config).unwrap()
}

fn fast_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_attempts(attempts)
        .with_initial_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(20))
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "model": "deepseek-chat",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            },
            {
                "index": 1,
                "message": {"role": "assistant", "content": "second choice"},
                "finish_reason": "stop"
            }
        ]
    }))
}

#[tokio::test]
async fn test_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "deepseek-chat"})))
        .respond_with(completion("Fire contained downtown."))
        .expect(1)
        .mount(&server)
        .await;

    let report = generator(&server, RetryPolicy::single_attempt())
        .generate(&summary())
        .await
        .unwrap();

    assert_eq!(report, "Fire contained downtown.");
}

#[tokio::test]
async fn test_request_embeds_summary_in_system_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("ok"))
        .mount(&server)
        .await;

    generator(&server, RetryPolicy::single_attempt())
        .generate(&summary())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "system");
    let content = messages[0]["content"].as_str().unwrap();
    assert!(content.contains(r#""fire_level":"high""#));
    assert!(content.contains(r#""units_dispatched":10"#));
}

#[tokio::test]
async fn test_server_error_fails_after_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = generator(&server, RetryPolicy::single_attempt())
        .generate(&summary())
        .await
        .unwrap_err();

    assert!(matches!(err, ReportGenerationError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_unexpected_shape_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "text"})))
        .mount(&server)
        .await;

    let err = generator(&server, RetryPolicy::single_attempt())
        .generate(&summary())
        .await
        .unwrap_err();

    assert!(matches!(err, ReportGenerationError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_empty_choices_are_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = generator(&server, RetryPolicy::single_attempt())
        .generate(&summary())
        .await
        .unwrap_err();

    assert!(matches!(err, ReportGenerationError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_retries_transient_failure_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(completion("Recovered report"))
        .expect(1)
        .mount(&server)
        .await;

    let report = generator(&server, fast_retry(3))
        .generate(&summary())
        .await
        .unwrap();

    assert_eq!(report, "Recovered report");
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let err = generator(&server, fast_retry(3))
        .generate(&summary())
        .await
        .unwrap_err();

    assert!(matches!(err, ReportGenerationError::Status { status: 401, .. }));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("too late").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = generator(&server, RetryPolicy::single_attempt())
        .generate(&summary())
        .await
        .unwrap_err();

    assert!(matches!(err, ReportGenerationError::Timeout(_)));
}
