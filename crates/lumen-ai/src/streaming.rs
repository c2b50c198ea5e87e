//! Server-Sent Events (SSE) streaming parser.
//!
//! Gemini's `streamGenerateContent?alt=sse` endpoint delivers one JSON
//! payload per SSE event. Events are exposed as a pull stream so that
//! dropping it drops the underlying HTTP body.

use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::io::StreamReader;

use crate::AiError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The `event:` field, if present.
    pub event: Option<String>,
    /// The event data; multiple `data:` lines are joined with `\n`.
    pub data: String,
}

/// Parse SSE events from any buffered async reader.
pub fn sse_events<R>(reader: R) -> impl Stream<Item = Result<SseEvent, AiError>> + Send
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async_stream::stream! {
        let mut lines = reader.lines();
        let mut current_event: Option<String> = None;
        let mut current_data = String::new();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    yield Err(AiError::NetworkError(e.to_string()));
                    return;
                }
            };

            if line.is_empty() {
                // Empty line = end of event
                if !current_data.is_empty() {
                    yield Ok(SseEvent {
                        event: current_event.take(),
                        data: std::mem::take(&mut current_data),
                    });
                }
                current_event = None;
                continue;
            }

            if let Some(event_type) = line.strip_prefix("event:") {
                current_event = Some(event_type.trim_start().to_string());
            } else if let Some(data) = line.strip_prefix("data:") {
                if !current_data.is_empty() {
                    current_data.push('\n');
                }
                current_data.push_str(data.strip_prefix(' ').unwrap_or(data));
            }
            // id:, retry: and comments are ignored
        }

        // Flush any remaining event
        if !current_data.is_empty() {
            yield Ok(SseEvent {
                event: current_event,
                data: current_data,
            });
        }
    }
}

/// SSE events from a streaming HTTP response body.
pub fn response_events(
    response: reqwest::Response,
) -> impl Stream<Item = Result<SseEvent, AiError>> + Send {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));
    sse_events(reader)
}
