//! Conversation store with synchronous change notification.

use std::fmt;

use serde::Serialize;

use super::message::{ChatMessage, MessageId, MessageRole};

/// Greeting shown at the top of every fresh conversation.
pub const WELCOME_MESSAGE: &str =
    "Hello! I'm an AI assistant powered by a local language model. How can I help you today?";

/// Snapshot of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    /// Messages in display order.
    pub messages: Vec<ChatMessage>,
    /// Whether a request is in flight.
    pub is_loading: bool,
    /// Most recent user-facing error.
    pub error: Option<String>,
}

impl ConversationState {
    fn fresh(welcome: &str) -> Self {
        Self {
            messages: vec![ChatMessage::complete(MessageRole::Assistant, welcome)],
            is_loading: false,
            error: None,
        }
    }

    /// Look up a message by ID.
    #[must_use]
    pub fn message(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// The message currently receiving tokens, if any.
    #[must_use]
    pub fn streaming_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.is_streaming)
    }

    /// The last message in the thread.
    #[must_use]
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// Handle returned by [`ConversationStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ConversationState) + Send>;

/// Owned conversation store.
///
/// Message order is append-only; messages are only removed by
/// [`ConversationStore::reset`].
pub struct ConversationStore {
    state: ConversationState,
    welcome: String,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// Create a store holding only the default welcome message.
    #[must_use]
    pub fn new() -> Self {
        Self::with_welcome(WELCOME_MESSAGE)
    }

    /// Create a store with a custom welcome message.
    #[must_use]
    pub fn with_welcome(welcome: impl Into<String>) -> Self {
        let welcome = welcome.into();
        Self {
            state: ConversationState::fresh(&welcome),
            welcome,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Register a callback invoked after every mutation.
    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&ConversationState) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Append a complete user message.
    pub fn add_user_message(&mut self, content: impl Into<String>) -> MessageId {
        let message = ChatMessage::complete(MessageRole::User, content);
        let id = message.id;
        self.state.messages.push(message);
        self.notify();
        id
    }

    /// Append an empty, streaming assistant message.
    pub fn begin_assistant_message(&mut self) -> MessageId {
        let message = ChatMessage::streaming_assistant();
        let id = message.id;
        self.state.messages.push(message);
        self.notify();
        id
    }

    /// Replace the content of a streaming message with `content`.
    ///
    /// Callers pass the full accumulated text, not a delta. Unknown and
    /// finalized messages are left untouched and `false` is returned.
    pub fn append_assistant_content(&mut self, id: &MessageId, content: impl Into<String>) -> bool {
        let Some(message) = self.streaming_mut(id) else {
            return false;
        };
        message.content = content.into();
        self.notify();
        true
    }

    /// Mark a streaming message as complete.
    pub fn finalize_assistant_message(&mut self, id: &MessageId) -> bool {
        let Some(message) = self.streaming_mut(id) else {
            return false;
        };
        message.is_streaming = false;
        self.notify();
        true
    }

    /// Set the loading flag.
    pub fn set_loading(&mut self, is_loading: bool) {
        self.state.is_loading = is_loading;
        self.notify();
    }

    /// Set or clear the error slot.
    pub fn set_error(&mut self, error: Option<String>) {
        self.state.error = error;
        self.notify();
    }

    /// Drop every message and start over from the welcome message.
    pub fn reset(&mut self) {
        self.state = ConversationState::fresh(&self.welcome);
        self.notify();
    }

    fn streaming_mut(&mut self, id: &MessageId) -> Option<&mut ChatMessage> {
        let message = self.state.messages.iter_mut().find(|m| &m.id == id);
        match message {
            Some(m) if m.is_streaming => Some(m),
            Some(_) => {
                tracing::debug!(message_id = %id, "Ignoring update to finalized message");
                None
            }
            None => {
                tracing::debug!(message_id = %id, "Ignoring update to unknown message");
                None
            }
        }
    }

    fn notify(&mut self) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_starts_with_welcome() {
        let store = ConversationStore::new();
        let state = store.state();

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, MessageRole::Assistant);
        assert_eq!(state.messages[0].content, WELCOME_MESSAGE);
        assert!(!state.messages[0].is_streaming);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_streaming_message_lifecycle() {
        let mut store = ConversationStore::new();
        store.add_user_message("Hi");
        let id = store.begin_assistant_message();

        assert_eq!(store.state().streaming_message().map(|m| m.id), Some(id));

        assert!(store.append_assistant_content(&id, "Hel"));
        assert!(store.append_assistant_content(&id, "Hello"));
        assert_eq!(store.state().message(&id).unwrap().content, "Hello");
        assert!(store.state().message(&id).unwrap().is_streaming);

        assert!(store.finalize_assistant_message(&id));
        assert!(store.state().streaming_message().is_none());

        // Finalized messages are immutable.
        assert!(!store.append_assistant_content(&id, "changed"));
        assert!(!store.finalize_assistant_message(&id));
        assert_eq!(store.state().message(&id).unwrap().content, "Hello");
    }

    #[test]
    fn test_unknown_message_is_ignored() {
        let mut store = ConversationStore::new();
        let stranger = MessageId::new();
        assert!(!store.append_assistant_content(&stranger, "x"));
        assert_eq!(store.state().messages.len(), 1);
    }

    #[test]
    fn test_ids_are_unique_and_order_is_append_only() {
        let mut store = ConversationStore::new();
        let a = store.add_user_message("one");
        let b = store.begin_assistant_message();
        let c = store.add_user_message("two");

        let ids: Vec<_> = store.state().messages.iter().map(|m| m.id).collect();
        assert_eq!(&ids[1..], &[a, b, c]);
        assert_ne!(ids[0], a);
    }

    #[test]
    fn test_reset_restores_welcome() {
        let mut store = ConversationStore::with_welcome("Hi there");
        store.add_user_message("question");
        store.begin_assistant_message();
        store.set_loading(true);
        store.set_error(Some("boom".to_string()));

        store.reset();

        let state = store.state();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, "Hi there");
        assert_eq!(state.messages[0].role, MessageRole::Assistant);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_every_mutation_notifies_synchronously() {
        let mut store = ConversationStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = store.subscribe(move |state| {
            sink.lock().unwrap().push(state.messages.len());
        });

        store.add_user_message("a");
        assert_eq!(*seen.lock().unwrap(), vec![2]);

        let id = store.begin_assistant_message();
        store.append_assistant_content(&id, "x");
        store.finalize_assistant_message(&id);
        store.set_loading(true);
        store.set_error(None);
        store.reset();
        assert_eq!(*seen.lock().unwrap(), vec![2, 3, 3, 3, 3, 3, 1]);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.add_user_message("b");
        assert_eq!(seen.lock().unwrap().len(), 7);
    }
}
