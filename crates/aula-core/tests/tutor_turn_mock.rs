//! Tutor dialogue turns against a mock completion endpoint.

use std::time::Duration;

use aula_core::dialogue::{self, DialogueLimits, Turn};
use aula_core::providers::ProviderErrorKind;
use aula_core::providers::anthropic::{CompletionClient, CompletionConfig};
use aula_core::session::SessionStore;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const LIMITS: DialogueLimits = DialogueLimits {
    window: 8,
    retention: 20,
};

fn client_for(server: &MockServer, timeout: Duration) -> CompletionClient {
    CompletionClient::new(CompletionConfig {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
        model: "test-model".to_string(),
        max_tokens: 256,
        temperature: 0.0,
        request_timeout: timeout,
    })
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "model": "test-model",
        "stop_reason": "end_turn"
    }))
}

#[tokio::test]
async fn successful_turn_appends_both_sides() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(text_response("La semana 3 cubre inyección."))
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    let client = client_for(&server, Duration::from_secs(5));

    let reply = dialogue::run_turn(&sessions, 1, &client, "system", "¿Qué vemos esta semana?", LIMITS)
        .await
        .unwrap();
    assert_eq!(reply.as_deref(), Some("La semana 3 cubre inyección."));

    let history = sessions.with_session(1, |s| s.history.clone()).await;
    assert_eq!(
        history,
        vec![
            Turn::user("¿Qué vemos esta semana?"),
            Turn::assistant("La semana 3 cubre inyección."),
        ]
    );
}

#[tokio::test]
async fn failed_completion_leaves_history_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        })))
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    sessions
        .with_session(1, |s| {
            s.history.push(Turn::user("q1"));
            s.history.push(Turn::assistant("a1"));
        })
        .await;
    let before = sessions.with_session(1, |s| s.history.clone()).await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = dialogue::run_turn(&sessions, 1, &client, "system", "q2", LIMITS)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::HttpStatus);
    assert!(err.message.contains("Overloaded"));

    let after = sessions.with_session(1, |s| s.history.clone()).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn timeout_surfaces_as_timeout_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(text_response("tarde").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    let client = client_for(&server, Duration::from_millis(200));

    let err = dialogue::run_turn(&sessions, 1, &client, "system", "hola", LIMITS)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Timeout);

    let len = sessions.with_session(1, |s| s.history.len()).await;
    assert_eq!(len, 0);
}

#[tokio::test]
async fn long_conversations_cap_retention_and_window() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(text_response("ok"))
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    let client = client_for(&server, Duration::from_secs(5));

    for i in 1..=12 {
        let reply = dialogue::run_turn(&sessions, 1, &client, "system", &format!("q{i}"), LIMITS)
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("ok"));
    }

    // 12 turns = 24 entries, capped to the most recent 20 (turns 3..12).
    let history = sessions.with_session(1, |s| s.history.clone()).await;
    assert_eq!(history.len(), 20);
    assert_eq!(history[0], Turn::user("q3"));
    assert_eq!(history[19], Turn::assistant("ok"));

    // The last request carried at most the window: 8 pairs + the new turn.
    // Before turn 12 the retained history was q2..q11, so its window
    // starts at q4.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 12);
    let last = last_request_messages(requests.last().unwrap());
    assert_eq!(last.len(), 17);
    assert_eq!(last[0]["content"], "q4");
    assert_eq!(last[16]["content"], "q12");
}

fn last_request_messages(request: &Request) -> Vec<serde_json::Value> {
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    body["messages"].as_array().cloned().unwrap_or_default()
}
