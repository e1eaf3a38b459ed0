//! HTTP-level tests for the Supabase adapter against a mock server.

use htmltutor::backend::{IdentityProvider, MessageRow, MessageStore, SupabaseClient};
use htmltutor::config::SupabaseConfig;
use htmltutor::events::{ChatMessage, Role};
use htmltutor::session::{Session, SessionState};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON_KEY: &str = "anon-key";

fn client(server: &MockServer, sessions: SessionState) -> SupabaseClient {
    let config = SupabaseConfig {
        url: server.uri(),
        anon_key: ANON_KEY.to_string(),
        messages_table: "messages".to_string(),
        redirect_to: None,
    };
    SupabaseClient::new(&config, sessions).unwrap()
}

fn signed_in() -> SessionState {
    SessionState::new(Some(Session {
        access_token: "user-token".to_string(),
        refresh_token: None,
        user_id: "user-1".to_string(),
        email: "student@example.com".to_string(),
    }))
}

fn session_body() -> serde_json::Value {
    json!({
        "access_token": "fresh-token",
        "refresh_token": "fresh-refresh",
        "token_type": "bearer",
        "user": { "id": "user-42", "email": "student@example.com" }
    })
}

#[tokio::test]
async fn send_otp_posts_email_with_anon_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/otp"))
        .and(header("apikey", ANON_KEY))
        .and(header("Authorization", "Bearer anon-key"))
        .and(body_json(json!({ "email": "student@example.com", "create_user": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = SessionState::default();
    client(&server, sessions.clone())
        .send_otp("student@example.com")
        .await
        .unwrap();
    assert!(!sessions.handle().is_signed_in());
}

#[tokio::test]
async fn verify_otp_installs_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/verify"))
        .and(body_json(json!({
            "type": "email",
            "email": "student@example.com",
            "token": "123456"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = SessionState::default();
    client(&server, sessions.clone())
        .verify_otp("student@example.com", "123456")
        .await
        .unwrap();

    let session = sessions.handle().current().unwrap();
    assert_eq!(session.user_id, "user-42");
    assert_eq!(session.access_token, "fresh-token");
    assert_eq!(session.refresh_token.as_deref(), Some("fresh-refresh"));
}

#[tokio::test]
async fn provider_error_message_is_forwarded_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let sessions = SessionState::default();
    let err = client(&server, sessions.clone())
        .sign_in_with_password("student@example.com", "wrong")
        .await
        .unwrap_err();

    assert_eq!(err.message, "Invalid login credentials");
    assert!(!sessions.handle().is_signed_in());
}

#[tokio::test]
async fn signup_without_confirmation_has_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-7",
            "email": "new@example.com"
        })))
        .mount(&server)
        .await;

    let sessions = SessionState::default();
    client(&server, sessions.clone())
        .sign_up("new@example.com", "secret1")
        .await
        .unwrap();
    assert!(!sessions.handle().is_signed_in());
}

#[tokio::test]
async fn update_password_uses_session_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", "Bearer user-token"))
        .and(body_json(json!({ "password": "newpass" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1" })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, signed_in())
        .update_password("newpass")
        .await
        .unwrap();
}

#[tokio::test]
async fn update_password_without_session_fails_locally() {
    let server = MockServer::start().await;
    let err = client(&server, SessionState::default())
        .update_password("newpass")
        .await
        .unwrap_err();
    assert_eq!(err.message, "Auth session missing!");
}

#[tokio::test]
async fn sign_out_clears_session_even_when_server_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sessions = signed_in();
    let result = client(&server, sessions.clone()).sign_out().await;

    assert!(result.is_err());
    assert!(!sessions.handle().is_signed_in());
}

#[tokio::test]
async fn load_messages_orders_by_creation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/messages"))
        .and(query_param("select", "role,content,created_at"))
        .and(query_param("order", "created_at.asc"))
        .and(header("Authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "role": "user", "content": "什么是 div", "created_at": "2024-05-01T10:00:00Z" },
            { "role": "assistant", "content": "一个盒子", "created_at": "2024-05-01T10:00:01Z" }
        ])))
        .mount(&server)
        .await;

    let messages = client(&server, signed_in()).load_messages().await.unwrap();
    assert_eq!(
        messages,
        vec![ChatMessage::user("什么是 div"), ChatMessage::assistant("一个盒子")]
    );
}

#[tokio::test]
async fn insert_messages_sends_one_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/messages"))
        .and(header("Prefer", "return=minimal"))
        .and(body_json(json!([
            { "user_id": "user-1", "role": "user", "content": "hi" },
            { "user_id": "user-1", "role": "assistant", "content": "hello!" }
        ])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let rows = vec![
        MessageRow::new("user-1", &ChatMessage::user("hi")),
        MessageRow::new("user-1", &ChatMessage::assistant("hello!")),
    ];
    assert_eq!(rows[1].role, Role::Assistant);
    client(&server, signed_in())
        .insert_messages(&rows)
        .await
        .unwrap();
}

#[tokio::test]
async fn recovery_tokens_resolve_the_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", "Bearer recovery-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-9",
            "email": "forgetful@example.com"
        })))
        .mount(&server)
        .await;

    let sessions = SessionState::default();
    client(&server, sessions.clone())
        .restore_from_tokens("recovery-token", Some("r".to_string()))
        .await
        .unwrap();

    let session = sessions.handle().current().unwrap();
    assert_eq!(session.user_id, "user-9");
    assert_eq!(session.email, "forgetful@example.com");
}
