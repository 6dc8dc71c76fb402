//! HTTP transport for the backend chat endpoint.

use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ChatError, Result};
use crate::normalized::StreamEvent;

use super::{CancelHandle, ChatTransport, Dispatcher, StreamSink, decode_stream};

/// Request body for the chat endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

/// Non-streaming response body.
#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Transport that talks to the backend over HTTP.
///
/// Streaming requests have no timeout; the non-streaming fallback is bounded
/// by the configured request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    chat_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the configured backend.
    pub fn new(api: &ApiConfig) -> Result<Self> {
        Self::with_client(api, reqwest::Client::new())
    }

    /// Create a transport with a custom reqwest client.
    pub fn with_client(api: &ApiConfig, http: reqwest::Client) -> Result<Self> {
        Ok(Self {
            http,
            chat_url: api.chat_url()?,
            timeout: Duration::from_millis(api.timeout_ms),
        })
    }

    /// Get the chat endpoint URL.
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    /// Run the non-streaming request and return the assistant content.
    pub async fn fetch_completion(&self, prompt: &str) -> Result<String> {
        let response = self
            .http
            .post(self.chat_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .json(&ChatRequest { prompt })
            .send()
            .await
            .map_err(|e| ChatError::from_reqwest(&e))?;

        let status = response.status();
        let body: ChatResponse = if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ChatError::from_reqwest(&e))?
        } else {
            // Prefer the backend's own message when the body carries one.
            let body = response.json::<ChatResponse>().await.unwrap_or_default();
            return Err(body.error.map_or(
                ChatError::HttpStatus {
                    status: status.as_u16(),
                },
                ChatError::Stream,
            ));
        };

        match body.error {
            Some(message) => Err(ChatError::Stream(message)),
            None => Ok(body.content.unwrap_or_default()),
        }
    }

    async fn run_stream(http: reqwest::Client, url: Url, prompt: String, dispatcher: &mut Dispatcher) {
        let response = match http.post(url).json(&ChatRequest { prompt: &prompt }).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                dispatcher.fail(&ChatError::Transport(e.to_string()));
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Chat request rejected");
            dispatcher.fail(&ChatError::HttpStatus {
                status: status.as_u16(),
            });
            return;
        }

        tracing::debug!(status = status.as_u16(), "Stream opened");

        let events = decode_stream(response.bytes_stream());
        futures::pin_mut!(events);
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if let StreamEvent::Token { text } = &event {
                        tracing::trace!(token_len = text.len(), "Token");
                    }
                    if !dispatcher.dispatch(event) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Stream read failed");
                    dispatcher.fail(&ChatError::StreamRead(e.to_string()));
                    break;
                }
            }
        }
    }
}

impl ChatTransport for HttpTransport {
    fn stream(&self, prompt: &str, sink: Box<dyn StreamSink>) -> CancelHandle {
        let handle = CancelHandle::new();
        let token = handle.token().clone();
        let mut dispatcher = Dispatcher::new(sink, handle.clone());
        let http = self.http.clone();
        let url = self.chat_url.clone();
        let prompt = prompt.to_string();

        let span = tracing::debug_span!("chat_stream", url = %url, prompt_len = prompt.len());
        tokio::spawn(
            async move {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        tracing::debug!("Stream cancelled");
                    }
                    () = Self::run_stream(http, url, prompt, &mut dispatcher) => {}
                }
            }
            .instrument(span),
        );

        handle
    }

    fn complete(&self, prompt: &str, sink: Box<dyn StreamSink>) -> CancelHandle {
        let handle = CancelHandle::new();
        let token = handle.token().clone();
        let mut dispatcher = Dispatcher::new(sink, handle.clone());
        let transport = self.clone();
        let prompt = prompt.to_string();

        let span = tracing::debug_span!("chat_completion", url = %self.chat_url, prompt_len = prompt.len());
        tokio::spawn(
            async move {
                let result = tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        tracing::debug!("Completion cancelled");
                        return;
                    }
                    result = transport.fetch_completion(&prompt) => result,
                };

                match result {
                    Ok(content) => {
                        if !content.is_empty() {
                            dispatcher.dispatch(StreamEvent::Token { text: content });
                        }
                        dispatcher.dispatch(StreamEvent::Complete);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Completion failed");
                        dispatcher.fail(&e);
                    }
                }
            }
            .instrument(span),
        );

        handle
    }
}
