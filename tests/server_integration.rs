//! Browser-facing routes with a scripted backend.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum_test::TestServer;
use futures::StreamExt;
use serde_json::Value;
use tower::ServiceExt;

use local_llm_chat::AppState;
use local_llm_chat::config::AppConfig;
use local_llm_chat::server::router;
use local_llm_chat::transport::{CancelHandle, ChatTransport, StreamSink};

/// Backend double: replies "Echo: <prompt>" in two tokens, or fails on "fail".
#[derive(Debug)]
struct ScriptedTransport;

impl ChatTransport for ScriptedTransport {
    fn stream(&self, prompt: &str, mut sink: Box<dyn StreamSink>) -> CancelHandle {
        if prompt == "fail" {
            sink.on_error("HTTP error: status 500".to_string());
        } else {
            sink.on_token("Echo: ".to_string());
            sink.on_token(prompt.to_string());
            sink.on_complete();
        }
        CancelHandle::new()
    }

    fn complete(&self, prompt: &str, mut sink: Box<dyn StreamSink>) -> CancelHandle {
        sink.on_token(format!("Echo: {prompt}"));
        sink.on_complete();
        CancelHandle::new()
    }
}

fn test_config() -> Arc<AppConfig> {
    Arc::new(
        AppConfig::load_from_args(["local-llm-chat", "--api-base-url", "http://127.0.0.1:9"])
            .expect("default config"),
    )
}

fn app_state() -> AppState {
    AppState::new(test_config(), Arc::new(ScriptedTransport))
}

fn test_server() -> TestServer {
    TestServer::new(router(app_state())).expect("test server")
}

/// Poll the JSON snapshot until `done` holds.
async fn wait_for(server: &TestServer, done: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..100 {
        let state: Value = server.get("/api/conversation").await.json();
        if done(&state) {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("conversation never reached the expected state");
}

#[tokio::test]
async fn test_health() {
    let server = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_index_renders_welcome() {
    let server = test_server();
    let response = server.get("/").await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("<title>Chat with Local LLM</title>"));
    assert!(html.contains("powered by a local language model"));
    assert!(html.contains(r#"sse-connect="/api/conversation/events""#));
}

#[tokio::test]
async fn test_initial_snapshot() {
    let server = test_server();
    let state: Value = server.get("/api/conversation").await.json();

    assert_eq!(state["isLoading"], false);
    assert!(state["error"].is_null());
    let messages = state["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "assistant");
    assert_eq!(messages[0]["isStreaming"], false);
}

#[tokio::test]
async fn test_send_message_streams_reply() {
    let server = test_server();
    server
        .post("/api/conversation/messages")
        .form(&[("message", "hi there")])
        .await
        .assert_status(StatusCode::ACCEPTED);

    let state = wait_for(&server, |s| {
        s["messages"].as_array().is_some_and(|m| m.len() == 3) && s["isLoading"] == false
    })
    .await;

    let messages = state["messages"].as_array().unwrap();
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "hi there");
    assert_eq!(messages[2]["role"], "assistant");
    assert_eq!(messages[2]["content"], "Echo: hi there");
    assert_eq!(messages[2]["isStreaming"], false);

    let html = server.get("/").await.text();
    assert!(html.contains("Echo: hi there"));
}

#[tokio::test]
async fn test_blank_message_is_ignored() {
    let server = test_server();
    server
        .post("/api/conversation/messages")
        .form(&[("message", "   ")])
        .await
        .assert_status(StatusCode::ACCEPTED);

    // A later submission proves the blank one was processed and dropped.
    server
        .post("/api/conversation/messages")
        .form(&[("message", "ping")])
        .await;
    let state = wait_for(&server, |s| s["isLoading"] == false && s["messages"].as_array().is_some_and(|m| m.len() == 3)).await;
    assert_eq!(state["messages"][1]["content"], "ping");
}

#[tokio::test]
async fn test_error_sets_banner_then_reset_clears() {
    let server = test_server();
    server
        .post("/api/conversation/messages")
        .form(&[("message", "fail")])
        .await
        .assert_status(StatusCode::ACCEPTED);

    let state = wait_for(&server, |s| !s["error"].is_null()).await;
    assert_eq!(state["error"], "HTTP error: status 500");
    assert_eq!(state["isLoading"], false);
    assert_eq!(state["messages"][2]["content"], "Error: HTTP error: status 500");
    assert!(server.get("/").await.text().contains(r#"role="alert""#));

    server
        .post("/api/conversation/reset")
        .await
        .assert_status(StatusCode::ACCEPTED);
    let state = wait_for(&server, |s| s["messages"].as_array().is_some_and(|m| m.len() == 1)).await;
    assert!(state["error"].is_null());
}

#[tokio::test]
async fn test_cancel_without_request_is_accepted() {
    let server = test_server();
    server
        .post("/api/conversation/cancel")
        .await
        .assert_status(StatusCode::ACCEPTED);

    let state: Value = server.get("/api/conversation").await.json();
    assert_eq!(state["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_events_stream_starts_with_current_fragments() {
    let response = router(app_state())
        .oneshot(
            Request::get("/api/conversation/events")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let mut body = response.into_body().into_data_stream();
    let mut received = String::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !received.contains("event: composer") {
            let chunk = body.next().await.expect("stream open").expect("chunk");
            received.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await
    .expect("initial fragments in time");

    assert!(received.contains("event: conversation"));
    assert!(received.contains("powered by a local language model"));
    assert!(received.contains(r#"type="submit""#));
}
