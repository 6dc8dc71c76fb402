//! Conversation state and its store.
//!
//! The store holds the ordered message list together with the loading flag
//! and the single user-facing error slot. It is an owned value: whoever owns
//! it is the only one mutating it, and every mutation synchronously notifies
//! the registered subscribers before returning.
//!
//! # Architecture
//!
//! - [`ChatMessage`]: One entry of the thread
//! - [`ConversationState`]: Snapshot handed to subscribers and renderers
//! - [`ConversationStore`]: Mutation operations plus subscriptions
//!
//! # Example
//!
//! ```rust
//! use local_llm_chat::conversation::ConversationStore;
//!
//! let mut store = ConversationStore::new();
//! store.add_user_message("Hello!");
//! let id = store.begin_assistant_message();
//! store.append_assistant_content(&id, "Hi");
//! store.finalize_assistant_message(&id);
//!
//! // Welcome message, user message, assistant reply.
//! assert_eq!(store.state().messages.len(), 3);
//! ```

mod message;
mod store;

pub use message::{ChatMessage, MessageId, MessageRole};
pub use store::{ConversationState, ConversationStore, SubscriptionId, WELCOME_MESSAGE};
