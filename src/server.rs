use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        Html, IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::WatchStream;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::conversation::ConversationState;
use crate::transport::HttpTransport;
use crate::ui::{self, COMPOSER_EVENT, CONVERSATION_EVENT};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&config.api)?;

    info!(
        name: "chat.config.loaded",
        chat_url = %transport.chat_url(),
        streaming = config.api.streaming,
        timeout_ms = config.api.timeout_ms,
        "Chat backend configuration loaded"
    );

    let state = AppState::new(Arc::clone(&config), Arc::new(transport));
    let app = router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Browser-facing routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/conversation", get(api_conversation))
        .route("/api/conversation/events", get(api_conversation_events))
        .route("/api/conversation/messages", post(api_send_message))
        .route("/api/conversation/cancel", post(api_cancel))
        .route("/api/conversation/reset", post(api_reset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Chat page.
async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(ui::render_page(&state.chat.snapshot(), &state.config.ui))
}

/// GET /health - Liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Composer form body.
#[derive(Debug, Deserialize)]
struct SendForm {
    /// User message content.
    #[serde(default)]
    message: String,
}

/// GET /api/conversation - Current conversation as JSON.
async fn api_conversation(State(state): State<AppState>) -> Json<ConversationState> {
    Json(state.chat.snapshot())
}

/// GET /api/conversation/events - Rendered fragments on every change.
async fn api_conversation_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let updates = WatchStream::new(state.chat.subscribe()).flat_map(|conversation| {
        stream::iter([
            Ok::<_, Infallible>(Event::default()
                .event(CONVERSATION_EVENT)
                .data(ui::render_conversation(&conversation))),
            Ok(Event::default()
                .event(COMPOSER_EVENT)
                .data(ui::render_composer_action(&conversation))),
        ])
    });

    Sse::new(updates).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// POST /api/conversation/messages - Submit a prompt.
async fn api_send_message(
    State(state): State<AppState>,
    Form(form): Form<SendForm>,
) -> StatusCode {
    tracing::debug!(prompt_len = form.message.len(), "Message submitted");
    state.chat.send_message(form.message);
    StatusCode::ACCEPTED
}

/// POST /api/conversation/cancel - Stop the reply in progress.
async fn api_cancel(State(state): State<AppState>) -> StatusCode {
    state.chat.cancel_stream();
    StatusCode::ACCEPTED
}

/// POST /api/conversation/reset - Clear the conversation.
async fn api_reset(State(state): State<AppState>) -> StatusCode {
    state.chat.reset();
    StatusCode::ACCEPTED
}
