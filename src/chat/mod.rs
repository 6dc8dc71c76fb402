//! Chat orchestration.
//!
//! # Overview
//!
//! - [`Orchestrator`]: per-submission state machine over the store and the
//!   transport
//! - [`service`]: the task that owns the orchestrator, and the
//!   [`ChatHandle`] used to drive it
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use local_llm_chat::chat::{self, Orchestrator, RequestMode};
//! use local_llm_chat::config::AppConfig;
//! use local_llm_chat::conversation::ConversationStore;
//! use local_llm_chat::transport::HttpTransport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let transport = Arc::new(HttpTransport::new(&config.api)?);
//! let (orchestrator, events) =
//!     Orchestrator::new(ConversationStore::new(), transport, RequestMode::Streaming);
//! let (handle, _task) = chat::spawn(orchestrator, events);
//!
//! handle.send_message("Hello!");
//! # Ok(())
//! # }
//! ```

pub mod orchestrator;
pub mod service;

pub use orchestrator::{Orchestrator, Outcome, Phase, RequestId, RequestMode, TransportEvent};
pub use service::{ChatHandle, spawn};
