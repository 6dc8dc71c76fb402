//! Chat message model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Unique message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The person typing.
    User,
    /// The language model.
    Assistant,
    /// Client-generated notices.
    System,
}

impl MessageRole {
    /// Lowercase role name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// A single entry in the conversation.
///
/// Content only changes while `is_streaming` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message ID.
    pub id: MessageId,
    /// Author of the message.
    pub role: MessageRole,
    /// Text shown in the bubble.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Whether tokens are still arriving.
    pub is_streaming: bool,
}

impl ChatMessage {
    /// A complete message.
    pub(crate) fn complete(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_streaming: false,
        }
    }

    /// An empty assistant message waiting for tokens.
    pub(crate) fn streaming_assistant() -> Self {
        Self {
            is_streaming: true,
            ..Self::complete(MessageRole::Assistant, String::new())
        }
    }
}
