//! Incremental decoder for the backend's event stream.

use futures::{Stream, StreamExt};

use crate::error::ChatError;
use crate::normalized::{StreamEvent, StreamFrame};

/// Buffers raw chunks and emits [`StreamEvent`]s for every complete frame.
///
/// The decoder stops producing events after the first terminal event, and
/// [`FrameDecoder::finish`] supplies the implicit `Complete` when the input
/// ends without one, so every stream yields exactly one terminal event.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    finished: bool,
}

impl FrameDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal event has been produced.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed a chunk and collect the events of every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.buf.extend_from_slice(chunk);

        while let Some(pos) = find_double_newline(&self.buf) {
            let frame = self.buf.drain(..pos + 2).collect::<Vec<_>>();
            let text = String::from_utf8_lossy(&frame[..pos]);

            if let Some(event) = decode_frame(&text) {
                let terminal = event.is_terminal();
                events.push(event);
                if terminal {
                    self.finished = true;
                    self.buf.clear();
                    break;
                }
            }
        }

        events
    }

    /// Signal end of input.
    ///
    /// Returns the implicit `Complete` if no terminal event was seen. Any
    /// incomplete trailing frame is discarded.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }
        self.finished = true;

        if !self.buf.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!(
                trailing_bytes = self.buf.len(),
                "Discarding incomplete trailing frame"
            );
        }
        self.buf.clear();

        Some(StreamEvent::Complete)
    }
}

/// Decode a single frame (without its trailing blank line).
///
/// Frames that do not start with `data:` (including blank ones and ones
/// with leading whitespace) are ignored. Frames with malformed JSON are
/// logged and dropped.
pub fn decode_frame(frame: &str) -> Option<StreamEvent> {
    let payload = frame.strip_prefix("data:")?.trim();

    match parse_frame(payload) {
        Ok(parsed) => parsed.into_event(),
        Err(e) => {
            tracing::warn!(error = %e, frame_len = payload.len(), "Dropping malformed stream frame");
            None
        }
    }
}

fn parse_frame(payload: &str) -> Result<StreamFrame, ChatError> {
    Ok(serde_json::from_str(payload)?)
}

/// Adapt a chunk stream into a lazy, finite stream of [`StreamEvent`]s.
///
/// Read errors are passed through unchanged and end the stream.
pub fn decode_stream<S, B, E>(chunks: S) -> impl Stream<Item = Result<StreamEvent, E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    async_stream::try_stream! {
        let mut decoder = FrameDecoder::new();

        futures::pin_mut!(chunks);
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            for event in decoder.push(chunk.as_ref()) {
                yield event;
            }
            if decoder.is_finished() {
                break;
            }
        }

        if let Some(event) = decoder.finish() {
            yield event;
        }
    }
}

/// Find the position of a double newline in the buffer.
fn find_double_newline(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}
