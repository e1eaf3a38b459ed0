//! HTTP-level tests for the DeepSeek completion client.

use htmltutor::config::DeepSeekConfig;
use htmltutor::error::CompletionError;
use htmltutor::events::ChatMessage;
use htmltutor::llm::{CompletionClient, DeepSeekClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> DeepSeekClient {
    let config = DeepSeekConfig {
        base_url: server.uri(),
        ..DeepSeekConfig::default()
    };
    DeepSeekClient::new(config, Some("sk-test".to_string()))
}

#[tokio::test]
async fn completion_sends_persona_and_turns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "deepseek-chat",
            "messages": [
                { "role": "system", "content": "你是小码老师" },
                { "role": "user", "content": "什么是表格" }
            ],
            "temperature": 0.7,
            "max_tokens": 2000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "表格就像 Excel！📊" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete("你是小码老师", &[ChatMessage::user("什么是表格")])
        .await
        .unwrap();
    assert_eq!(reply, "表格就像 Excel！📊");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Authentication Fails" }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete("persona", &[ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::Status(401)));
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete("persona", &[ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse));
}
