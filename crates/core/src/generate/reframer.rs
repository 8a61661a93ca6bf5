//! NDJSON reframing of upstream generation output.
//!
//! The upstream answers with one JSON object per line. Lines are not aligned
//! with transport chunks, so incomplete bytes are carried across chunks and
//! only complete lines are decoded. The output is the concatenation of the
//! `response` fragments, with upstream errors rendered inline.

use crate::generate::base::{GenerateError, TextStream};
use bytes::{Bytes, BytesMut};
use serde::Deserialize;
use std::fmt::Display;
use tokio_stream::{Stream, StreamExt};

/// Carry-over buffer splitting a byte stream into lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: BytesMut,
    /// Prefix of `pending` already known to hold no newline.
    scanned: usize,
}

impl LineBuffer {
    /// Append a chunk and return every line it completed, without the
    /// trailing newline. The unterminated tail stays buffered.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(offset) = self.pending[self.scanned..].iter().position(|b| *b == b'\n') {
            let pos = self.scanned + offset;
            let mut line = self.pending.split_to(pos + 1);
            line.truncate(pos);
            lines.push(line.freeze());
            self.scanned = 0;
        }
        self.scanned = self.pending.len();
        lines
    }

    /// Take whatever is left after the last newline.
    pub fn take_remainder(&mut self) -> Bytes {
        self.scanned = 0;
        self.pending.split().freeze()
    }
}

/// One record of the upstream protocol. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct UpstreamFrame {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub done: bool,
}

impl UpstreamFrame {
    /// Decode one line. Blank and malformed lines yield `None`.
    pub fn parse(line: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(line).ok()?.trim();
        if text.is_empty() {
            return None;
        }

        match serde_json::from_str(text) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed upstream line");
                None
            }
        }
    }

    /// Output bytes for this record: the inline error marker first, then
    /// the text fragment.
    pub fn render(&self) -> Vec<Bytes> {
        let mut out = Vec::new();

        if let Some(message) = self.error_message() {
            out.push(Bytes::from(format!("\n[error] {message}\n")));
        }
        if let Some(fragment) = self.response.as_deref().filter(|f| !f.is_empty()) {
            out.push(Bytes::copy_from_slice(fragment.as_bytes()));
        }
        out
    }

    /// Falsy values (`null`, `false`, zero, empty string) mean no error.
    fn error_message(&self) -> Option<String> {
        use serde_json::Value;

        match self.error.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Turn an upstream NDJSON byte stream into a flat text stream.
///
/// The output ends after a record with `done: true`, or when the upstream
/// ends (after one last attempt to decode the buffered tail). A transport
/// error from the upstream becomes a final `UpstreamInterrupted` item.
///
/// Dropping the returned stream drops `upstream`.
pub fn reframe<S, E>(upstream: S) -> TextStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut upstream = Box::pin(upstream);
        let mut buffer = LineBuffer::default();

        while let Some(chunk) = upstream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::warn!(error = %e, "upstream stream interrupted");
                    yield Err(GenerateError::UpstreamInterrupted(e.to_string()));
                    return;
                }
            };

            for line in buffer.push(&chunk) {
                let Some(frame) = UpstreamFrame::parse(&line) else {
                    continue;
                };
                for bytes in frame.render() {
                    yield Ok(bytes);
                }
                if frame.done {
                    return;
                }
            }
        }

        if let Some(frame) = UpstreamFrame::parse(&buffer.take_remainder()) {
            for bytes in frame.render() {
                yield Ok(bytes);
            }
        }
    };

    Box::pin(stream)
}
