//! Wiremock integration tests for the OpenAI-compatible client.
//!
//! Covers the request wire shape, status-code error mapping, and the full
//! single and bulk flows through an orchestrator pointed at the mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use huginn::annotator::analysis_tool;
use huginn::error::{COMMUNICATION_MESSAGE, PROTOCOL_MESSAGE};
use huginn::{
    ChatOptions, ChatProvider, FinishReason, Huginn, HuginnError, Message, OpenAiClient,
    Orchestrator, Outcome, Record, RecordId, Sentiment,
};

/// A completion whose only content is a call to the analysis tool.
fn tool_call_completion(id: serde_json::Value) -> serde_json::Value {
    let arguments = json!({
        "analyzed_rows": [{
            "id": id,
            "sentiment": "negative",
            "tags": ["notifications", "resources"],
            "summary": "Intrusive and impossible to uninstall."
        }]
    });

    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4.1-nano",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_abc",
                    "type": "function",
                    "function": {
                        "name": "update_grid_with_analysis",
                        "arguments": arguments.to_string()
                    }
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
    })
}

fn text_completion() -> serde_json::Value {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": "This review is negative."},
            "finish_reason": "stop"
        }]
    })
}

fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::with_base_url(
        Some("sk-test".to_string()),
        server.uri(),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn orchestrator(server: &MockServer) -> Orchestrator {
    Huginn::builder()
        .api_key("sk-test")
        .base_url(server.uri())
        .build()
        .unwrap()
}

async fn chat_once(server: &MockServer) -> huginn::Result<huginn::ChatResponse> {
    client(server)
        .chat(
            &[Message::user("hello")],
            Some(std::slice::from_ref(analysis_tool())),
            &ChatOptions::default(),
        )
        .await
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn request_declares_tool_and_authenticates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1-nano",
            "tool_choice": "auto",
            "tools": [{
                "type": "function",
                "function": {"name": "update_grid_with_analysis"}
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_completion(json!(4))))
        .expect(1)
        .mount(&server)
        .await;

    let response = chat_once(&server).await.unwrap();
    assert_eq!(response.finish_reason, FinishReason::ToolCalls);
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].name, "update_grid_with_analysis");
    assert_eq!(response.model.as_deref(), Some("gpt-4.1-nano"));
    assert_eq!(response.usage.unwrap().total_tokens, 160);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_completion()))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::with_base_url(
        None,
        format!("{}/", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    assert_eq!(client.base_url(), server.uri());

    let response = client
        .chat(&[Message::user("hi")], None, &ChatOptions::default())
        .await
        .unwrap();
    assert_eq!(response.content, "This review is negative.");
    assert!(response.tool_calls.is_empty());
}

// ============================================================================
// Error mapping
// ============================================================================

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let err = chat_once(&server).await.unwrap_err();
    assert!(matches!(
        err,
        HuginnError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(7)
    ));
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = chat_once(&server).await.unwrap_err();
    assert!(matches!(err, HuginnError::AuthenticationFailed));
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = chat_once(&server).await.unwrap_err();
    assert!(matches!(err, HuginnError::Api { status: 500, .. }));
}

#[tokio::test]
async fn non_json_body_is_an_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = chat_once(&server).await.unwrap_err();
    assert!(matches!(err, HuginnError::Http(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_communication_failure() {
    // Nothing listens on port 1.
    let orchestrator = Huginn::builder()
        .base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let outcome = orchestrator.analyze_one(&Record::new("r1", "hi")).await;
    assert_eq!(
        outcome,
        Outcome::Failure {
            id: RecordId::from("r1"),
            message: COMMUNICATION_MESSAGE.to_string(),
        }
    );
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn single_record_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_completion(json!(4))))
        .mount(&server)
        .await;

    let outcome = orchestrator(&server)
        .analyze_one(&Record::new(4i64, "A very intrusive background app."))
        .await;

    let annotation = outcome.annotation().expect("success");
    assert_eq!(outcome.id(), &RecordId::from(4i64));
    assert_eq!(annotation.sentiment, Sentiment::Negative);
    assert_eq!(annotation.tags, vec!["notifications", "resources"]);
}

#[tokio::test]
async fn text_only_answer_is_a_protocol_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_completion()))
        .mount(&server)
        .await;

    let outcome = orchestrator(&server)
        .analyze_one(&Record::new(4i64, "A very intrusive background app."))
        .await;

    assert_eq!(
        outcome,
        Outcome::Failure {
            id: RecordId::from(4i64),
            message: PROTOCOL_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn bulk_run_isolates_a_failing_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("ID=4:"))
        .respond_with(ResponseTemplate::new(503))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_completion(json!(0))))
        .with_priority(2)
        .expect(6)
        .mount(&server)
        .await;

    let records: Vec<Record> = (1..=7i64)
        .map(|i| Record::new(i, format!("review number {i}")))
        .collect();

    let mut outcomes = Vec::new();
    let mut finished = 0;
    let summary = orchestrator(&server)
        .analyze_bulk(records, |o| outcomes.push(o), || finished += 1)
        .await;

    assert_eq!(finished, 1);
    assert_eq!(outcomes.len(), 7);
    assert_eq!(summary.succeeded, 6);
    assert_eq!(summary.failed, 1);

    let failed: Vec<&RecordId> = outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.id())
        .collect();
    assert_eq!(failed, vec![&RecordId::from(4i64)]);
}
