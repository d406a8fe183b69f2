//! Reasoning-extraction wrapper for bound models.
//!
//! [`ExtractReasoning`] decorates any [`LanguageModel`] and moves tagged
//! reasoning text out of the answer channel, for both complete and streamed
//! generations. It is itself a `LanguageModel`, so callers cannot tell a
//! wrapped handle from a plain one except through
//! [`LanguageModel::extracts_reasoning`].

use async_trait::async_trait;
use futures::{stream, StreamExt};
use tracing::{debug, instrument};

use tekir_core::defaults::REASONING_TAG;
use tekir_core::logging;
use tekir_core::{
    ChatRequest, Generation, GenerationStream, LanguageModel, ModelHandle, Result, StreamPart,
};

use crate::thinking::{parse_tagged_response, ReasoningTag, TagSplitter};

/// A model whose output is split into reasoning and answer channels.
pub struct ExtractReasoning {
    inner: ModelHandle,
    tag: ReasoningTag,
}

impl ExtractReasoning {
    pub fn new(inner: ModelHandle, tag_name: &str) -> Self {
        debug!(
            model = inner.model_id(),
            tag = tag_name,
            "Wrapping model with reasoning extraction"
        );
        Self {
            inner,
            tag: ReasoningTag::new(tag_name),
        }
    }

    /// Wrap using the default `think` tag.
    pub fn think(inner: ModelHandle) -> Self {
        Self::new(inner, REASONING_TAG)
    }

    pub fn tag(&self) -> &ReasoningTag {
        &self.tag
    }

    pub fn inner(&self) -> &ModelHandle {
        &self.inner
    }
}

#[async_trait]
impl LanguageModel for ExtractReasoning {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn reasoning_tag(&self) -> Option<&str> {
        Some(self.tag.name())
    }

    #[instrument(skip(self, request), fields(subsystem = "inference", component = "reasoning", op = "generate", model = %self.inner.model_id(), reasoning_len = tracing::field::Empty))]
    async fn generate(&self, request: &ChatRequest) -> Result<Generation> {
        let generation = self.inner.generate(request).await?;
        let parsed = parse_tagged_response(&generation.text, &self.tag);

        // Reasoning the backend reported natively comes first
        let reasoning = match (generation.reasoning, parsed.thinking_content) {
            (Some(native), Some(extracted)) => Some(format!("{}\n{}", native, extracted)),
            (native, extracted) => native.or(extracted),
        };

        tracing::Span::current().record(
            logging::REASONING_LEN,
            reasoning.as_ref().map(String::len).unwrap_or(0),
        );

        Ok(Generation {
            text: parsed.answer_content,
            reasoning,
            finish_reason: generation.finish_reason,
            usage: generation.usage,
        })
    }

    async fn stream(&self, request: &ChatRequest) -> Result<GenerationStream> {
        let inner = self.inner.stream(request).await?;
        Ok(split_reasoning_stream(inner, self.tag.clone()))
    }
}

/// Route text deltas of `inner` through a [`TagSplitter`].
///
/// Held-back text is flushed before `Finish` and at end of stream. Parts
/// other than text deltas pass through untouched; native reasoning deltas
/// also count as reasoning output, so extracted reasoning after them starts
/// on a new line. The stream ends after the first error.
pub fn split_reasoning_stream(inner: GenerationStream, tag: ReasoningTag) -> GenerationStream {
    let batches = stream::unfold(Some((inner, TagSplitter::new(tag))), |state| async move {
        let (mut inner, mut splitter) = state?;

        let batch: Vec<Result<StreamPart>> = match inner.next().await {
            Some(Ok(StreamPart::TextDelta(delta))) => {
                splitter.push(&delta).into_iter().map(Ok).collect()
            }
            Some(Ok(StreamPart::Finish(reason))) => splitter
                .finish()
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Ok(StreamPart::Finish(reason))))
                .collect(),
            Some(Ok(StreamPart::ReasoningDelta(delta))) => {
                if !delta.is_empty() {
                    splitter.mark_reasoning_started();
                }
                vec![Ok(StreamPart::ReasoningDelta(delta))]
            }
            Some(Err(e)) => return Some((vec![Err(e)], None)),
            None => return Some((splitter.finish().into_iter().map(Ok).collect(), None)),
        };

        Some((batch, Some((inner, splitter))))
    });

    Box::pin(batches.flat_map(stream::iter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLanguageModel;
    use std::sync::Arc;
    use tekir_core::{collect_stream, Error};

    fn parts(items: Vec<Result<StreamPart>>) -> GenerationStream {
        Box::pin(stream::iter(items))
    }

    async fn drain(stream: GenerationStream) -> Vec<Result<StreamPart>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_generate_splits_channels() {
        let inner = MockLanguageModel::new("deepseek/deepseek-r1")
            .with_fixed_response("<think>Consider the question.</think>\n\nParis.");
        let model = ExtractReasoning::think(Arc::new(inner));

        let generation = model
            .generate(&ChatRequest::from_prompt("Capital of France?"))
            .await
            .unwrap();

        assert_eq!(generation.text, "Paris.");
        assert_eq!(
            generation.reasoning.as_deref(),
            Some("Consider the question.")
        );
        assert_eq!(generation.finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_generate_without_tags_is_unchanged() {
        let inner = MockLanguageModel::new("m").with_fixed_response("Plain answer");
        let model = ExtractReasoning::think(Arc::new(inner));

        let generation = model.generate(&ChatRequest::from_prompt("hi")).await.unwrap();
        assert_eq!(generation.text, "Plain answer");
        assert!(generation.reasoning.is_none());
    }

    #[tokio::test]
    async fn test_generate_keeps_native_reasoning_first() {
        let inner = MockLanguageModel::new("m")
            .with_fixed_response("<think>extracted</think>answer")
            .with_native_reasoning("native");
        let model = ExtractReasoning::think(Arc::new(inner));

        let generation = model.generate(&ChatRequest::from_prompt("hi")).await.unwrap();
        assert_eq!(generation.reasoning.as_deref(), Some("native\nextracted"));
        assert_eq!(generation.text, "answer");
    }

    #[tokio::test]
    async fn test_generate_propagates_errors() {
        let inner = MockLanguageModel::new("m").with_failure("upstream down");
        let model = ExtractReasoning::think(Arc::new(inner));

        let result = model.generate(&ChatRequest::from_prompt("hi")).await;
        assert!(matches!(result, Err(Error::Inference(_))));
    }

    #[tokio::test]
    async fn test_stream_splits_channels() {
        let inner = MockLanguageModel::new("m")
            .with_fixed_response("<think>I should greet back.</think>Hello there!")
            .with_chunk_size(3);
        let model = ExtractReasoning::think(Arc::new(inner));

        let stream = model.stream(&ChatRequest::from_prompt("hi")).await.unwrap();
        let generation = collect_stream(stream).await.unwrap();

        assert_eq!(generation.reasoning.as_deref(), Some("I should greet back."));
        assert_eq!(generation.text, "Hello there!");
        assert_eq!(generation.finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_stream_flushes_before_finish() {
        let inner = parts(vec![
            Ok(StreamPart::TextDelta("tail <".to_string())),
            Ok(StreamPart::Finish(Some("length".to_string()))),
        ]);

        let out = drain(split_reasoning_stream(inner, ReasoningTag::new("think"))).await;
        let out: Vec<StreamPart> = out.into_iter().map(|p| p.unwrap()).collect();
        assert_eq!(
            out,
            vec![
                StreamPart::TextDelta("tail".to_string()),
                StreamPart::TextDelta(" <".to_string()),
                StreamPart::Finish(Some("length".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_and_generate_agree() {
        let responses = [
            "<think>first</think>Part A. <think>second</think>Part B.",
            "Intro <think>hmm</think> outro",
            "  plain  ",
            "<think>\nweigh options\n</think>\n\nPick B.",
        ];
        let request = ChatRequest::from_prompt("hi");

        for response in responses {
            for chunk_size in [1, 4, 64] {
                let inner = MockLanguageModel::new("m")
                    .with_fixed_response(response)
                    .with_native_reasoning("native")
                    .with_chunk_size(chunk_size);
                let model = ExtractReasoning::think(Arc::new(inner));

                let generated = model.generate(&request).await.unwrap();
                let streamed = collect_stream(model.stream(&request).await.unwrap())
                    .await
                    .unwrap();

                assert_eq!(streamed.text, generated.text, "{response:?}");
                assert_eq!(streamed.reasoning, generated.reasoning, "{response:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_stream_separates_reasoning_blocks() {
        let inner = MockLanguageModel::new("m")
            .with_fixed_response("<think>first</think>Part A. <think>second</think>Part B.")
            .with_chunk_size(5);
        let model = ExtractReasoning::think(Arc::new(inner));

        let stream = model.stream(&ChatRequest::from_prompt("hi")).await.unwrap();
        let generation = collect_stream(stream).await.unwrap();
        assert_eq!(generation.reasoning.as_deref(), Some("first\nsecond"));
        assert_eq!(generation.text, "Part A.\nPart B.");
    }

    #[tokio::test]
    async fn test_stream_passes_native_reasoning() {
        let inner = parts(vec![
            Ok(StreamPart::ReasoningDelta("native".to_string())),
            Ok(StreamPart::TextDelta("answer".to_string())),
        ]);

        let out = drain(split_reasoning_stream(inner, ReasoningTag::new("think"))).await;
        let out: Vec<StreamPart> = out.into_iter().map(|p| p.unwrap()).collect();
        assert_eq!(
            out,
            vec![
                StreamPart::ReasoningDelta("native".to_string()),
                StreamPart::TextDelta("answer".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_ends_after_error() {
        let inner = parts(vec![
            Ok(StreamPart::TextDelta("<think>partial".to_string())),
            Err(Error::Inference("reset".to_string())),
            Ok(StreamPart::TextDelta("ignored".to_string())),
        ]);

        let out = drain(split_reasoning_stream(inner, ReasoningTag::new("think"))).await;
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], Ok(StreamPart::ReasoningDelta(d)) if d == "partial"));
        assert!(out[1].is_err());
    }

    #[test]
    fn test_wrapper_reports_inner_identity() {
        let inner: ModelHandle = Arc::new(MockLanguageModel::new("deepseek/deepseek-r1"));
        let model = ExtractReasoning::think(inner);
        assert_eq!(model.model_id(), "deepseek/deepseek-r1");
        assert_eq!(model.provider_name(), "mock");
        assert!(model.extracts_reasoning());
        assert_eq!(model.tag().name(), "think");
        assert_eq!(model.reasoning_tag(), Some("think"));
        assert!(!model.inner().extracts_reasoning());
        assert!(model.inner().reasoning_tag().is_none());
    }
}
