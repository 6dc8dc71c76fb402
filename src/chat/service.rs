//! Chat service: the single task that owns the orchestrator.
//!
//! Everything that mutates the conversation runs on this task. Browser
//! handlers talk to it through a cloneable [`ChatHandle`], and read state
//! from a `watch` channel that a store subscriber keeps up to date.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::conversation::ConversationState;

use super::orchestrator::{Orchestrator, TransportEvent};

/// Requests accepted by the chat service.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Send(String),
    Cancel,
    Reset,
}

/// Cloneable handle to a running chat service.
#[derive(Debug, Clone)]
pub struct ChatHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConversationState>,
}

impl ChatHandle {
    /// Submit a prompt. Empty prompts are dropped by the service.
    pub fn send_message(&self, text: impl Into<String>) {
        self.dispatch(Command::Send(text.into()));
    }

    /// Cancel the request in flight, if any.
    pub fn cancel_stream(&self) {
        self.dispatch(Command::Cancel);
    }

    /// Clear the conversation.
    pub fn reset(&self) {
        self.dispatch(Command::Reset);
    }

    /// Latest conversation state.
    #[must_use]
    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every conversation change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.clone()
    }

    fn dispatch(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::error!("Chat service is not running");
        }
    }
}

/// Start the chat service on the current runtime.
///
/// `events` is the receiver returned by [`Orchestrator::new`]. The task runs
/// until every [`ChatHandle`] has been dropped; the request in flight is
/// cancelled on the way out.
pub fn spawn(
    mut orchestrator: Orchestrator,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) -> (ChatHandle, JoinHandle<()>) {
    let (state_tx, state_rx) = watch::channel(orchestrator.store().state().clone());
    orchestrator.store_mut().subscribe(move |state| {
        state_tx.send_replace(state.clone());
    });

    let (commands, mut command_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        tracing::debug!("Chat service started");
        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    let Some(command) = command else { break };
                    apply(&mut orchestrator, command);
                }
                Some(event) = events.recv() => orchestrator.handle_event(event),
            }
        }
        orchestrator.cancel_stream();
        tracing::debug!("Chat service stopped");
    });

    (
        ChatHandle {
            commands,
            state: state_rx,
        },
        task,
    )
}

fn apply(orchestrator: &mut Orchestrator, command: Command) {
    match command {
        Command::Send(text) => {
            if let Err(e) = orchestrator.send_message(&text) {
                tracing::debug!(error = %e, "Submission ignored");
            }
        }
        Command::Cancel => {
            if !orchestrator.cancel_stream() {
                tracing::debug!("Cancel requested with no active request");
            }
        }
        Command::Reset => orchestrator.reset(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationStore;
    use crate::chat::RequestMode;
    use crate::transport::{CancelHandle, ChatTransport, StreamSink};
    use std::sync::Arc;
    use std::time::Duration;

    /// Transport that answers every prompt by echoing it back word by word.
    #[derive(Debug)]
    struct EchoTransport;

    impl ChatTransport for EchoTransport {
        fn stream(&self, prompt: &str, mut sink: Box<dyn StreamSink>) -> CancelHandle {
            for word in prompt.split_inclusive(' ') {
                sink.on_token(word.to_string());
            }
            sink.on_complete();
            CancelHandle::new()
        }

        fn complete(&self, prompt: &str, mut sink: Box<dyn StreamSink>) -> CancelHandle {
            sink.on_token(prompt.to_string());
            sink.on_complete();
            CancelHandle::new()
        }
    }

    async fn wait_until(
        rx: &mut watch::Receiver<ConversationState>,
        done: impl Fn(&ConversationState) -> bool,
    ) -> ConversationState {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let state = rx.borrow_and_update();
                    if done(&state) {
                        return state.clone();
                    }
                }
                rx.changed().await.expect("service alive");
            }
        })
        .await
        .expect("state reached in time")
    }

    #[tokio::test]
    async fn test_send_and_reset_through_handle() {
        let (orchestrator, events) = Orchestrator::new(
            ConversationStore::new(),
            Arc::new(EchoTransport),
            RequestMode::Streaming,
        );
        let (handle, _task) = spawn(orchestrator, events);
        let mut rx = handle.subscribe();

        handle.send_message("   ");
        handle.send_message("echo this back");
        let state = wait_until(&mut rx, |s| s.messages.len() == 3 && !s.is_loading).await;
        assert_eq!(state.messages[2].content, "echo this back");
        assert!(!state.messages[2].is_streaming);

        handle.reset();
        let state = wait_until(&mut rx, |s| s.messages.len() == 1).await;
        assert!(state.error.is_none());
        assert_eq!(handle.snapshot(), state);
    }

    #[tokio::test]
    async fn test_service_stops_when_handles_drop() {
        let (orchestrator, events) = Orchestrator::new(
            ConversationStore::new(),
            Arc::new(EchoTransport),
            RequestMode::Completion,
        );
        let (handle, task) = spawn(orchestrator, events);
        handle.cancel_stream();
        drop(handle);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("service stops")
            .expect("service did not panic");
    }
}
