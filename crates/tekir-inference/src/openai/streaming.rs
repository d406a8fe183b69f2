//! SSE stream parsing for OpenAI-compatible streaming responses.

use futures::{stream, Stream, StreamExt};
use tracing::trace;

use tekir_core::{Error, GenerationStream, Result, StreamPart};

use super::error::{to_tekir_error, UpstreamErrorKind};
use super::types::ChatCompletionChunk;

/// Outcome of a single SSE line.
#[derive(Debug)]
enum SseLine {
    Parts(Vec<StreamPart>),
    Done,
    Skip,
    Failed(Error),
}

/// Line-buffered decoder for `text/event-stream` bodies.
///
/// Network chunks do not respect line boundaries, so incomplete lines are
/// kept until their newline arrives.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `data: [DONE]` has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Decode every complete line in `bytes`.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<StreamPart>> {
        if self.done {
            return Vec::new();
        }
        self.pending.extend_from_slice(bytes);

        let mut out = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if self.consume_line(&line, &mut out) {
                self.pending.clear();
                break;
            }
        }
        out
    }

    /// Decode a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Vec<Result<StreamPart>> {
        let mut out = Vec::new();
        if !self.done && !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.consume_line(&line, &mut out);
        }
        out
    }

    /// Returns true when the stream is complete.
    fn consume_line(&mut self, line: &[u8], out: &mut Vec<Result<StreamPart>>) -> bool {
        match parse_sse_line(&String::from_utf8_lossy(line)) {
            SseLine::Parts(parts) => out.extend(parts.into_iter().map(Ok)),
            SseLine::Failed(e) => out.push(Err(e)),
            SseLine::Skip => {}
            SseLine::Done => {
                self.done = true;
                return true;
            }
        }
        false
    }
}

/// Parse one SSE line into stream parts.
fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();

    // Skip empty lines and comments
    if line.is_empty() || line.starts_with(':') {
        return SseLine::Skip;
    }

    let Some(data) = line.strip_prefix("data:") else {
        // event:, id:, retry: fields carry nothing we use
        return SseLine::Skip;
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return SseLine::Done;
    }

    let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return SseLine::Failed(Error::Inference(format!(
                "Failed to parse SSE chunk: {}",
                e
            )))
        }
    };

    if let Some(error) = chunk.error {
        let kind = UpstreamErrorKind::classify(200, &error);
        return SseLine::Failed(to_tekir_error(
            kind,
            &format!("Upstream stream error: {}", error.message),
        ));
    }

    let mut parts = Vec::new();
    for choice in chunk.choices {
        if let Some(reasoning) = choice.delta.reasoning.filter(|r| !r.is_empty()) {
            parts.push(StreamPart::ReasoningDelta(reasoning));
        }
        if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
            parts.push(StreamPart::TextDelta(content));
        }
        if let Some(reason) = choice.finish_reason {
            parts.push(StreamPart::Finish(Some(reason)));
        }
    }

    if parts.is_empty() {
        SseLine::Skip
    } else {
        SseLine::Parts(parts)
    }
}

/// Parse SSE stream from OpenAI-compatible endpoint.
pub fn parse_sse_stream(
    body: impl Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> GenerationStream {
    let body = Box::pin(body);

    let batches = stream::unfold(Some((body, SseDecoder::new())), |state| async move {
        let (mut body, mut decoder) = state?;

        match body.next().await {
            Some(Ok(bytes)) => {
                trace!(bytes = bytes.len(), "SSE chunk");
                let batch = decoder.push(&bytes);
                let next = if decoder.is_done() {
                    None
                } else {
                    Some((body, decoder))
                };
                Some((batch, next))
            }
            Some(Err(e)) => Some((
                vec![Err(Error::Inference(format!("Stream error: {}", e)))],
                None,
            )),
            None => Some((decoder.finish(), None)),
        }
    });

    Box::pin(batches.flat_map(stream::iter))
}
