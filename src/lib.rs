//! Streaming chat with a local language model.
//!
//! A small axum process that serves an HTML-first chat page, forwards each
//! submission to a backend chat endpoint and streams the reply token by
//! token back into the browser over SSE.
//!
//! # Architecture
//!
//! - **Transport**: HTTP request plus an incremental `data:` frame parser,
//!   cancellable per request
//! - **Conversation**: Ordered message list with loading and error state
//! - **Chat**: Orchestrator state machine and the task that owns it
//! - **UI**: Server-rendered HTML fragments swapped in by htmx
//!
//! # Modules
//!
//! - [`chat`]: Submission lifecycle and the chat service handle
//! - [`config`]: Layered configuration
//! - [`conversation`]: Message model and store
//! - [`normalized`]: Wire frames and stream events
//! - [`server`]: Router and HTTP handlers
//! - [`transport`]: Backend client and stream parser
//! - [`ui`]: HTML rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod normalized;
pub mod server;
pub mod transport;
pub mod ui;

use std::sync::Arc;

use crate::chat::{ChatHandle, Orchestrator, RequestMode};
use crate::config::AppConfig;
use crate::conversation::ConversationStore;
use crate::transport::ChatTransport;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Handle to the chat service that owns the conversation.
    pub chat: ChatHandle,
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Start a chat service over `transport` and wrap its handle.
    ///
    /// Must be called from within a tokio runtime. The service stops once
    /// the last clone of the returned state is dropped.
    pub fn new(config: Arc<AppConfig>, transport: Arc<dyn ChatTransport>) -> Self {
        let mode = if config.api.streaming {
            RequestMode::Streaming
        } else {
            RequestMode::Completion
        };
        let store = ConversationStore::with_welcome(config.ui.welcome_message.clone());
        let (orchestrator, events) = Orchestrator::new(store, transport, mode);
        let (chat, _task) = chat::spawn(orchestrator, events);

        Self { chat, config }
    }
}
