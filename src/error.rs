//! Error types for the chat client.

use thiserror::Error;

/// Chat client error type.
///
/// Every variant except [`ChatError::Parse`] and [`ChatError::EmptyPrompt`]
/// ends up as the user-facing error string of the conversation.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Connection-level failure (DNS, refused, reset, timeout).
    #[error("Network error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status.
    #[error("HTTP error: status {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
    },

    /// Backend reported an error, either as an error frame or in a JSON body.
    #[error("{0}")]
    Stream(String),

    /// The response body could not be read to the end.
    #[error("Stream processing error: {0}")]
    StreamRead(String),

    /// A single frame carried invalid JSON. Recovered locally.
    #[error("Malformed stream frame: {0}")]
    Parse(#[from] serde_json::Error),

    /// The prompt was empty or whitespace only.
    #[error("Prompt is empty")]
    EmptyPrompt,

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ChatError {
    /// Normalize a reqwest failure into a plain transport error.
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::HttpStatus {
                status: status.as_u16(),
            };
        }
        if err.is_timeout() {
            return Self::Transport("request timed out".to_string());
        }
        Self::Transport(err.to_string())
    }
}

/// Result type alias for chat client operations.
pub type Result<T> = std::result::Result<T, ChatError>;
