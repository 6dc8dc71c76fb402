//! Backend transport: request issuing, stream reading and cancellation.
//!
//! # Overview
//!
//! The [`ChatTransport`] trait is the seam between the orchestrator and the
//! network. A transport starts one request per call and reports what happens
//! to a [`StreamSink`]; the returned [`CancelHandle`] silences the sink and
//! stops the request.
//!
//! # Implementations
//!
//! - [`HttpTransport`]: reqwest client speaking the backend's event stream
//!   and its non-streaming JSON fallback.

pub mod http;
pub mod parser;

pub use http::HttpTransport;
pub use parser::{FrameDecoder, decode_frame, decode_stream};

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::normalized::StreamEvent;

/// Receiver of the callbacks of a single request.
pub trait StreamSink: Send + 'static {
    /// A token arrived.
    fn on_token(&mut self, token: String);
    /// The request failed. Terminal.
    fn on_error(&mut self, message: String);
    /// The request finished. Terminal.
    fn on_complete(&mut self);
}

/// Cancellation handle for one request.
///
/// Cancelling is idempotent and also fine after the request finished.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Create a fresh, uncancelled handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the request. No sink callback fires afterwards.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`CancelHandle::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token the request task waits on.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Issues chat requests against the backend.
pub trait ChatTransport: Send + Sync + fmt::Debug {
    /// Start a streaming request for `prompt`.
    fn stream(&self, prompt: &str, sink: Box<dyn StreamSink>) -> CancelHandle;

    /// Start a non-streaming request for `prompt`.
    ///
    /// The whole answer is delivered as one token followed by completion.
    fn complete(&self, prompt: &str, sink: Box<dyn StreamSink>) -> CancelHandle;
}

/// Routes events to a sink while enforcing the callback contract.
///
/// At most one terminal callback is delivered, and nothing is delivered once
/// the request has been cancelled.
pub(crate) struct Dispatcher {
    sink: Box<dyn StreamSink>,
    cancel: CancelHandle,
    done: bool,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub(crate) fn new(sink: Box<dyn StreamSink>, cancel: CancelHandle) -> Self {
        Self {
            sink,
            cancel,
            done: false,
        }
    }

    /// Deliver `event`. Returns `false` once no further events are wanted.
    pub(crate) fn dispatch(&mut self, event: StreamEvent) -> bool {
        if self.done {
            return false;
        }
        if self.cancel.is_cancelled() {
            self.done = true;
            return false;
        }

        match event {
            StreamEvent::Token { text } => {
                self.sink.on_token(text);
                true
            }
            StreamEvent::Error { message } => {
                self.done = true;
                self.sink.on_error(message);
                false
            }
            StreamEvent::Complete => {
                self.done = true;
                self.sink.on_complete();
                false
            }
        }
    }

    /// Deliver an error built from `err`.
    pub(crate) fn fail(&mut self, err: &crate::error::ChatError) {
        self.dispatch(StreamEvent::Error {
            message: err.to_string(),
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Sink that records every callback as a [`StreamEvent`].
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) events: Arc<Mutex<Vec<StreamEvent>>>,
    }

    impl RecordingSink {
        pub(crate) fn recorded(&self) -> Vec<StreamEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl StreamSink for RecordingSink {
        fn on_token(&mut self, token: String) {
            self.events
                .lock()
                .unwrap()
                .push(StreamEvent::Token { text: token });
        }

        fn on_error(&mut self, message: String) {
            self.events
                .lock()
                .unwrap()
                .push(StreamEvent::Error { message });
        }

        fn on_complete(&mut self) {
            self.events.lock().unwrap().push(StreamEvent::Complete);
        }
    }

    #[test]
    fn test_single_terminal_callback() {
        let sink = RecordingSink::default();
        let mut dispatcher = Dispatcher::new(Box::new(sink.clone()), CancelHandle::new());

        assert!(dispatcher.dispatch(StreamEvent::Token { text: "a".into() }));
        assert!(!dispatcher.dispatch(StreamEvent::Complete));
        assert!(!dispatcher.dispatch(StreamEvent::Error {
            message: "late".into()
        }));

        assert_eq!(
            sink.recorded(),
            vec![StreamEvent::Token { text: "a".into() }, StreamEvent::Complete]
        );
    }

    #[test]
    fn test_cancel_silences_sink() {
        let sink = RecordingSink::default();
        let handle = CancelHandle::new();
        let mut dispatcher = Dispatcher::new(Box::new(sink.clone()), handle.clone());

        assert!(dispatcher.dispatch(StreamEvent::Token { text: "a".into() }));
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        assert!(!dispatcher.dispatch(StreamEvent::Token { text: "b".into() }));
        dispatcher.fail(&crate::error::ChatError::Transport("gone".into()));
        assert!(!dispatcher.dispatch(StreamEvent::Complete));

        assert_eq!(sink.recorded(), vec![StreamEvent::Token { text: "a".into() }]);
    }
}
