//! Core traits for Tekir model abstractions.
//!
//! These traits define the interface that every bound model implements,
//! whether it is a network client, a test double, or a wrapper around
//! another model.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::{ChatRequest, Generation, Result, StreamPart};

/// Stream of generation parts.
pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<StreamPart>> + Send>>;

/// Shared, invokable handle to a bound model.
pub type ModelHandle = Arc<dyn LanguageModel>;

// =============================================================================
// LANGUAGE MODEL TRAIT
// =============================================================================

/// A callable chat model.
///
/// Cancellation is dropping the returned future or stream; implementations
/// hold no state between calls.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Upstream model name (e.g. "openai/gpt-4o-mini").
    fn model_id(&self) -> &str;

    /// Short name of the backend kind, used in logs.
    fn provider_name(&self) -> &str;

    /// Tag whose spans are moved into the reasoning channel, if any.
    fn reasoning_tag(&self) -> Option<&str> {
        None
    }

    /// Whether output is split into reasoning and answer channels.
    fn extracts_reasoning(&self) -> bool {
        self.reasoning_tag().is_some()
    }

    /// Generate a complete response.
    async fn generate(&self, request: &ChatRequest) -> Result<Generation>;

    /// Generate a response as a stream of parts.
    async fn stream(&self, request: &ChatRequest) -> Result<GenerationStream>;
}

/// Drain a generation stream into a single [`Generation`].
///
/// Stops at the first error.
pub async fn collect_stream(mut stream: GenerationStream) -> Result<Generation> {
    let mut text = String::new();
    let mut reasoning = String::new();
    let mut finish_reason = None;

    while let Some(part) = stream.next().await {
        match part? {
            StreamPart::TextDelta(delta) => text.push_str(&delta),
            StreamPart::ReasoningDelta(delta) => reasoning.push_str(&delta),
            StreamPart::Finish(reason) => finish_reason = reason,
        }
    }

    Ok(Generation {
        text,
        reasoning: if reasoning.is_empty() {
            None
        } else {
            Some(reasoning)
        },
        finish_reason,
        usage: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn parts(items: Vec<Result<StreamPart>>) -> GenerationStream {
        Box::pin(futures::stream::iter(items))
    }

    #[tokio::test]
    async fn test_collect_stream_separates_channels() {
        let stream = parts(vec![
            Ok(StreamPart::ReasoningDelta("think ".to_string())),
            Ok(StreamPart::ReasoningDelta("hard".to_string())),
            Ok(StreamPart::TextDelta("The answer".to_string())),
            Ok(StreamPart::TextDelta(" is 42.".to_string())),
            Ok(StreamPart::Finish(Some("stop".to_string()))),
        ]);

        let generation = collect_stream(stream).await.unwrap();
        assert_eq!(generation.text, "The answer is 42.");
        assert_eq!(generation.reasoning.as_deref(), Some("think hard"));
        assert_eq!(generation.finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_collect_stream_without_reasoning() {
        let stream = parts(vec![Ok(StreamPart::TextDelta("Hello".to_string()))]);

        let generation = collect_stream(stream).await.unwrap();
        assert_eq!(generation.text, "Hello");
        assert!(generation.reasoning.is_none());
        assert!(generation.finish_reason.is_none());
    }

    #[tokio::test]
    async fn test_collect_stream_stops_on_error() {
        let stream = parts(vec![
            Ok(StreamPart::TextDelta("partial".to_string())),
            Err(Error::Inference("connection reset".to_string())),
            Ok(StreamPart::TextDelta("never seen".to_string())),
        ]);

        let result = collect_stream(stream).await;
        assert!(matches!(result, Err(Error::Inference(_))));
    }
}
