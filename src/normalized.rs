//! Normalized event types for streamed chat responses.
//!
//! The backend speaks a minimal Server-Sent-Events dialect: every frame is a
//! single `data:` line carrying a JSON [`StreamFrame`]. Frames are decoded
//! into [`StreamEvent`]s, which is the only shape the rest of the client sees.
//!
//! # Example
//!
//! ```rust
//! use local_llm_chat::normalized::{StreamEvent, StreamFrame, sse_frame};
//!
//! let frame = StreamFrame::token("Hello");
//! assert_eq!(sse_frame(&frame), "data: {\"token\":\"Hello\"}\n\n");
//! assert_eq!(
//!     frame.into_event(),
//!     Some(StreamEvent::Token { text: "Hello".to_string() })
//! );
//! ```

use serde::{Deserialize, Serialize};

/// The only status value that terminates a stream.
pub const STATUS_COMPLETE: &str = "complete";

/// JSON payload of a single wire frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamFrame {
    /// Incremental text fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Backend-side failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Lifecycle status; only `"complete"` is recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl StreamFrame {
    /// Frame carrying a token.
    #[must_use]
    pub fn token(text: impl Into<String>) -> Self {
        Self {
            token: Some(text.into()),
            ..Self::default()
        }
    }

    /// Frame carrying an error.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Frame carrying the completion status.
    #[must_use]
    pub fn complete() -> Self {
        Self {
            status: Some(STATUS_COMPLETE.to_string()),
            ..Self::default()
        }
    }

    /// Decode this frame into an event.
    ///
    /// `error` wins over `status`, which wins over `token`. A frame with none
    /// of them yields `None`.
    #[must_use]
    pub fn into_event(self) -> Option<StreamEvent> {
        if let Some(message) = self.error {
            return Some(StreamEvent::Error { message });
        }
        if self.status.as_deref() == Some(STATUS_COMPLETE) {
            return Some(StreamEvent::Complete);
        }
        self.token.map(|text| StreamEvent::Token { text })
    }
}

/// Semantic events produced by the stream parser.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental assistant text.
    Token {
        /// The text fragment to append.
        text: String,
    },
    /// The backend reported an error. Terminal.
    Error {
        /// Error message.
        message: String,
    },
    /// The stream finished. Terminal.
    Complete,
}

impl StreamEvent {
    /// Whether this event ends stream processing.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Complete)
    }
}

/// Encode a [`StreamFrame`] the way the backend puts it on the wire.
pub fn sse_frame(frame: &StreamFrame) -> String {
    let json = serde_json::to_string(frame).unwrap_or_else(|e| {
        serde_json::json!({ "error": e.to_string() }).to_string()
    });

    format!("data: {json}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_takes_precedence() {
        let frame = StreamFrame {
            token: Some("partial".to_string()),
            error: Some("boom".to_string()),
            status: Some(STATUS_COMPLETE.to_string()),
        };
        assert_eq!(
            frame.into_event(),
            Some(StreamEvent::Error {
                message: "boom".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_status_falls_back_to_token() {
        let frame = StreamFrame {
            token: Some("hi".to_string()),
            error: None,
            status: Some("running".to_string()),
        };
        assert_eq!(
            frame.into_event(),
            Some(StreamEvent::Token {
                text: "hi".to_string()
            })
        );
        assert_eq!(StreamFrame::default().into_event(), None);
    }

    #[test]
    fn test_sse_frame_format() {
        let sse = sse_frame(&StreamFrame::complete());
        assert_eq!(sse, "data: {\"status\":\"complete\"}\n\n");
    }

    #[test]
    fn test_terminal_events() {
        assert!(StreamEvent::Complete.is_terminal());
        assert!(
            StreamEvent::Error {
                message: String::new()
            }
            .is_terminal()
        );
        assert!(
            !StreamEvent::Token {
                text: String::new()
            }
            .is_terminal()
        );
    }
}
