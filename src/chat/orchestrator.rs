//! Submission state machine.
//!
//! The orchestrator owns the [`ConversationStore`] and at most one active
//! request. Each submission walks through
//! `Idle → Sending → Streaming → (Completed | Failed | Cancelled) → Idle`.
//!
//! Transport callbacks are not applied directly: they are tagged with the
//! request they belong to and sent back through a channel, and
//! [`Orchestrator::handle_event`] applies them one at a time. Events of a
//! request that is no longer active are dropped, which makes cancellation
//! races deterministic.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::conversation::{ConversationStore, MessageId};
use crate::error::{ChatError, Result};
use crate::normalized::StreamEvent;
use crate::transport::{CancelHandle, ChatTransport, StreamSink};

/// Identifier of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// How requests are sent to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestMode {
    /// Token-by-token event stream.
    #[default]
    Streaming,
    /// Single JSON response.
    Completion,
}

/// Current phase of the orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// No request in flight.
    #[default]
    Idle,
    /// Request issued, no token received yet.
    Sending,
    /// At least one token received.
    Streaming,
}

/// How the last submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The backend finished the reply.
    Completed,
    /// The request ended with an error.
    Failed,
    /// Cancelled by the user, a newer submission or a reset.
    Cancelled,
}

/// A transport callback tagged with its request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    /// Request the callback belongs to.
    pub request_id: RequestId,
    /// The callback itself.
    pub event: StreamEvent,
}

/// Sink that forwards callbacks into the orchestrator's event channel.
#[derive(Debug)]
struct ChannelSink {
    request_id: RequestId,
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl ChannelSink {
    fn forward(&self, event: StreamEvent) {
        // The receiver only goes away when the chat service shuts down.
        let _ = self.tx.send(TransportEvent {
            request_id: self.request_id,
            event,
        });
    }
}

impl StreamSink for ChannelSink {
    fn on_token(&mut self, token: String) {
        self.forward(StreamEvent::Token { text: token });
    }

    fn on_error(&mut self, message: String) {
        self.forward(StreamEvent::Error { message });
    }

    fn on_complete(&mut self) {
        self.forward(StreamEvent::Complete);
    }
}

#[derive(Debug)]
struct ActiveRequest {
    id: RequestId,
    message_id: MessageId,
    /// Running concatenation of every token received.
    buffer: String,
    handle: CancelHandle,
}

/// Wires user submissions to the transport and the conversation store.
pub struct Orchestrator {
    store: ConversationStore,
    transport: Arc<dyn ChatTransport>,
    mode: RequestMode,
    events: mpsc::UnboundedSender<TransportEvent>,
    active: Option<ActiveRequest>,
    next_request: u64,
    phase: Phase,
    last_outcome: Option<Outcome>,
}

#[allow(clippy::missing_fields_in_debug)]
impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("transport", &self.transport)
            .field("mode", &self.mode)
            .field("phase", &self.phase)
            .field("active", &self.active.as_ref().map(|a| a.id))
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator.
    ///
    /// The returned receiver yields the transport events that must be fed
    /// back through [`Orchestrator::handle_event`].
    pub fn new(
        store: ConversationStore,
        transport: Arc<dyn ChatTransport>,
        mode: RequestMode,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            store,
            transport,
            mode,
            events,
            active: None,
            next_request: 1,
            phase: Phase::Idle,
            last_outcome: None,
        };
        (orchestrator, rx)
    }

    /// The conversation store.
    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Mutable access to the store, e.g. to subscribe.
    pub fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Outcome of the most recent finished submission.
    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// ID of the request in flight.
    #[must_use]
    pub fn active_request(&self) -> Option<RequestId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Submit a prompt.
    ///
    /// Whitespace-only prompts are rejected with [`ChatError::EmptyPrompt`]
    /// and leave the conversation untouched. A request still in flight is
    /// cancelled silently before the new one starts.
    pub fn send_message(&mut self, text: &str) -> Result<RequestId> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        if self.active.is_some() {
            tracing::debug!("Superseding active request");
            self.abort_active();
        }

        self.store.add_user_message(text);
        self.store.set_loading(true);
        self.store.set_error(None);
        let message_id = self.store.begin_assistant_message();

        let id = RequestId(self.next_request);
        self.next_request += 1;

        let sink = Box::new(ChannelSink {
            request_id: id,
            tx: self.events.clone(),
        });
        let handle = match self.mode {
            RequestMode::Streaming => self.transport.stream(text, sink),
            RequestMode::Completion => self.transport.complete(text, sink),
        };

        tracing::info!(
            request_id = %id,
            message_id = %message_id,
            mode = ?self.mode,
            prompt_len = text.len(),
            "Request started"
        );

        self.active = Some(ActiveRequest {
            id,
            message_id,
            buffer: String::new(),
            handle,
        });
        self.phase = Phase::Sending;

        Ok(id)
    }

    /// Cancel the request in flight.
    ///
    /// Returns `false` when there was nothing to cancel.
    pub fn cancel_stream(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }
        self.abort_active();
        self.store.set_loading(false);
        true
    }

    /// Cancel anything in flight and restore the initial conversation.
    pub fn reset(&mut self) {
        if self.active.is_some() {
            self.abort_active();
        }
        self.store.reset();
        tracing::info!("Conversation reset");
    }

    /// Apply one transport callback.
    pub fn handle_event(&mut self, event: TransportEvent) {
        let is_current = self
            .active
            .as_ref()
            .is_some_and(|active| active.id == event.request_id);
        if !is_current {
            tracing::debug!(request_id = %event.request_id, "Dropping event of inactive request");
            return;
        }

        match event.event {
            StreamEvent::Token { text } => self.on_token(&text),
            StreamEvent::Error { message } => self.on_error(message),
            StreamEvent::Complete => self.on_complete(),
        }
    }

    fn on_token(&mut self, text: &str) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.buffer.push_str(text);
        let (message_id, content) = (active.message_id, active.buffer.clone());

        self.phase = Phase::Streaming;
        self.store.append_assistant_content(&message_id, content);
    }

    fn on_error(&mut self, message: String) {
        let Some(active) = self.active.take() else {
            return;
        };
        tracing::warn!(request_id = %active.id, error = %message, "Request failed");

        self.store.set_error(Some(message.clone()));
        self.store.set_loading(false);
        if active.buffer.is_empty() {
            self.store
                .append_assistant_content(&active.message_id, format!("Error: {message}"));
        }
        self.store.finalize_assistant_message(&active.message_id);
        self.finish(Outcome::Failed);
    }

    fn on_complete(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        tracing::info!(
            request_id = %active.id,
            content_len = active.buffer.len(),
            "Request complete"
        );

        self.store.set_loading(false);
        self.store.finalize_assistant_message(&active.message_id);
        self.finish(Outcome::Completed);
    }

    /// Cancel the active request and finalize its partial message.
    fn abort_active(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.handle.cancel();
        tracing::info!(request_id = %active.id, "Request cancelled");

        self.store.finalize_assistant_message(&active.message_id);
        self.finish(Outcome::Cancelled);
    }

    fn finish(&mut self, outcome: Outcome) {
        self.phase = Phase::Idle;
        self.last_outcome = Some(outcome);
    }
}
