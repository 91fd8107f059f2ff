//! Server-Sent Events relay for streaming document generation.
//!
//! The upstream chat-completion stream arrives as provider-specific SSE
//! chunks. Clients receive a simplified envelope instead:
//! `data: {"type":"content","content":...,"timestamp":...}` frames terminated
//! by `data: [DONE]`. Read failures become a `{"type":"error"}` event and end
//! the stream; they are never surfaced as a transport fault mid-response.

use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use serde::Deserialize;
use serde_json::json;
use std::collections::VecDeque;

use crate::core::ServiceError;

pub fn content_event(content: &str) -> Bytes {
    let data = json!({
        "type": "content",
        "content": content,
        "timestamp": Utc::now().timestamp_millis(),
    });
    Bytes::from(format!("data: {}\n\n", data))
}

pub fn error_event(message: &str) -> Bytes {
    let data = json!({
        "type": "error",
        "error": message,
        "timestamp": Utc::now().timestamp_millis(),
    });
    Bytes::from(format!("data: {}\n\n", data))
}

pub fn done_event() -> Bytes {
    Bytes::from_static(b"data: [DONE]\n\n")
}

#[derive(Deserialize)]
struct UpstreamChunk {
    choices: Option<Vec<UpstreamChoice>>,
}

#[derive(Deserialize)]
struct UpstreamChoice {
    delta: Option<UpstreamDelta>,
}

#[derive(Deserialize)]
struct UpstreamDelta {
    content: Option<String>,
}

impl UpstreamChunk {
    fn content(&self) -> Option<&str> {
        self.choices
            .as_ref()?
            .first()?
            .delta
            .as_ref()?
            .content
            .as_deref()
    }
}

struct Relay {
    upstream: reqwest::Response,
    buffer: String,
    pending: VecDeque<Bytes>,
    finished: bool,
}

/// Re-frame an upstream completion stream into client SSE frames.
///
/// Single producer, single consumer: each poll drains buffered frames before
/// suspending on the next upstream read. Dropping the stream (client
/// disconnect) drops the upstream response and aborts the completion.
pub fn relay_stream(
    upstream: reqwest::Response,
) -> impl Stream<Item = Result<Bytes, ServiceError>> {
    let relay = Relay {
        upstream,
        buffer: String::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(relay, |mut relay| async move {
        loop {
            if let Some(frame) = relay.pending.pop_front() {
                return Some((Ok(frame), relay));
            }
            if relay.finished {
                return None;
            }

            match relay.upstream.chunk().await {
                Ok(Some(chunk)) => {
                    relay.buffer.push_str(&String::from_utf8_lossy(&chunk));
                    while let Some(newline) = relay.buffer.find('\n') {
                        let line: String = relay.buffer.drain(..=newline).collect();
                        handle_line(line.trim(), &mut relay.pending, &mut relay.finished);
                        if relay.finished {
                            break;
                        }
                    }
                }
                Ok(None) => {
                    // Upstream closed; flush any incomplete final line.
                    let remaining = std::mem::take(&mut relay.buffer);
                    handle_line(remaining.trim(), &mut relay.pending, &mut relay.finished);
                    if !relay.finished {
                        relay.pending.push_back(done_event());
                        relay.finished = true;
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "error reading completion stream");
                    relay.pending.push_back(error_event(&err.to_string()));
                    relay.finished = true;
                }
            }
        }
    })
}

fn handle_line(line: &str, pending: &mut VecDeque<Bytes>, finished: &mut bool) {
    if line.is_empty() || line.starts_with(':') {
        return;
    }
    if line == "data: [DONE]" {
        pending.push_back(done_event());
        *finished = true;
        return;
    }
    let Some(data) = line.strip_prefix("data: ") else {
        return;
    };
    match serde_json::from_str::<UpstreamChunk>(data) {
        Ok(chunk) => {
            if let Some(content) = chunk.content() {
                if !content.is_empty() {
                    pending.push_back(content_event(content));
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to parse completion stream chunk");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_json(frame: &Bytes) -> serde_json::Value {
        let text = std::str::from_utf8(frame).expect("utf8 frame");
        let data = text
            .strip_prefix("data: ")
            .and_then(|t| t.strip_suffix("\n\n"))
            .expect("sse framing");
        serde_json::from_str(data).expect("json payload")
    }

    #[test]
    fn content_event_uses_sse_framing() {
        let frame = content_event("Clause 1.");
        let value = frame_json(&frame);
        assert_eq!(value["type"], "content");
        assert_eq!(value["content"], "Clause 1.");
        assert!(value["timestamp"].is_i64());
    }

    #[test]
    fn error_event_carries_the_message() {
        let frame = error_event("connection reset");
        let value = frame_json(&frame);
        assert_eq!(value["type"], "error");
        assert_eq!(value["error"], "connection reset");
    }

    #[test]
    fn upstream_delta_is_reframed_as_content() {
        let mut pending = VecDeque::new();
        let mut finished = false;
        let line = r#"data: {"choices":[{"delta":{"content":"Terms"}}]}"#;
        handle_line(line, &mut pending, &mut finished);
        assert_eq!(pending.len(), 1);
        assert!(!finished);
        assert_eq!(frame_json(&pending[0])["content"], "Terms");
    }

    #[test]
    fn upstream_done_terminates_the_relay() {
        let mut pending = VecDeque::new();
        let mut finished = false;
        handle_line("data: [DONE]", &mut pending, &mut finished);
        assert!(finished);
        assert_eq!(pending.pop_front().expect("done frame"), done_event());
    }

    #[test]
    fn malformed_chunks_are_skipped() {
        let mut pending = VecDeque::new();
        let mut finished = false;
        handle_line("data: {not json", &mut pending, &mut finished);
        assert!(pending.is_empty());
        assert!(!finished);
    }

    #[test]
    fn empty_deltas_produce_no_frames() {
        let mut pending = VecDeque::new();
        let mut finished = false;
        handle_line(
            r#"data: {"choices":[{"delta":{"content":""}}]}"#,
            &mut pending,
            &mut finished,
        );
        handle_line(r#"data: {"choices":[{"delta":{}}]}"#, &mut pending, &mut finished);
        assert!(pending.is_empty());
    }

    #[test]
    fn comment_lines_are_ignored() {
        let mut pending = VecDeque::new();
        let mut finished = false;
        handle_line(": keep-alive", &mut pending, &mut finished);
        handle_line("", &mut pending, &mut finished);
        assert!(pending.is_empty());
        assert!(!finished);
    }
}
