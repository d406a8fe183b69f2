//! Deterministic in-process language models.
//!
//! These stand in for network backends in the test binding table and in
//! unit tests. Responses are fixed or keyed by the last user message, so
//! every call is reproducible.
//!
//! ## Usage
//!
//! ```rust
//! use tekir_inference::mock::MockLanguageModel;
//! use tekir_core::{ChatRequest, LanguageModel};
//!
//! #[tokio::main]
//! async fn main() {
//!     let model = MockLanguageModel::new("chat-model").with_fixed_response("Test response");
//!     let generation = model.generate(&ChatRequest::from_prompt("hi")).await.unwrap();
//!     assert_eq!(generation.text, "Test response");
//!     assert_eq!(model.generate_call_count(), 1);
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use tracing::trace;

use tekir_core::defaults::{ARTIFACT_MODEL, REASONING_TAG, TITLE_MODEL};
use tekir_core::{ChatRequest, Error, Generation, GenerationStream, LanguageModel, Result, StreamPart};

/// Response of the plain chat test doubles.
pub const MOCK_CHAT_RESPONSE: &str = "Hello, world!";

/// Reasoning emitted by the reasoning test doubles.
pub const MOCK_REASONING: &str = "I need to think about this problem carefully.";

/// Response of the title test double.
pub const MOCK_TITLE: &str = "This is a test title";

/// Response of the artifact test double.
pub const MOCK_ARTIFACT: &str = "This is a test artifact";

/// Mock language model for testing.
#[derive(Clone)]
pub struct MockLanguageModel {
    model_id: String,
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    fixed_responses: HashMap<String, String>,
    default_response: String,
    native_reasoning: Option<String>,
    chunk_size: Option<usize>,
    latency_ms: u64,
    failure: Option<String>,
}

/// A recorded call to the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub input: String,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fixed_responses: HashMap::new(),
            default_response: "Mock response".to_string(),
            native_reasoning: None,
            chunk_size: None,
            latency_ms: 0,
            failure: None,
        }
    }
}

impl MockLanguageModel {
    /// Create a new mock model with default configuration.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Plain chat double.
    pub fn chat(model_id: impl Into<String>) -> Self {
        Self::new(model_id).with_fixed_response(MOCK_CHAT_RESPONSE)
    }

    /// Reasoning double: emits tagged reasoning ahead of the chat response.
    pub fn reasoning(model_id: impl Into<String>) -> Self {
        Self::new(model_id).with_fixed_response(format!(
            "<{tag}>{MOCK_REASONING}</{tag}>\n\n{MOCK_CHAT_RESPONSE}",
            tag = REASONING_TAG
        ))
    }

    /// Title generation double.
    pub fn title() -> Self {
        Self::new(TITLE_MODEL).with_fixed_response(MOCK_TITLE)
    }

    /// Artifact generation double.
    pub fn artifact() -> Self {
        Self::new(ARTIFACT_MODEL).with_fixed_response(MOCK_ARTIFACT)
    }

    /// Set a fixed response for generation requests.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Add a response mapping keyed by the last user message.
    pub fn with_response_mapping(
        mut self,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_responses
            .insert(input.into(), output.into());
        self
    }

    /// Report reasoning in the backend's own field, as some providers do.
    pub fn with_native_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).native_reasoning = Some(reasoning.into());
        self
    }

    /// Stream fixed-size chunks of `chars` characters instead of words.
    pub fn with_chunk_size(mut self, chars: usize) -> Self {
        Arc::make_mut(&mut self.config).chunk_size = Some(chars.max(1));
        self
    }

    /// Set simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Fail every call with an inference error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.calls().clear()
    }

    /// Get number of generate calls.
    pub fn generate_call_count(&self) -> usize {
        self.count("generate")
    }

    /// Get number of stream calls.
    pub fn stream_call_count(&self) -> usize {
        self.count("stream")
    }

    fn count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Vec<MockCall>> {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn log_call(&self, operation: &str, input: &str) {
        self.calls().push(MockCall {
            operation: operation.to_string(),
            input: input.to_string(),
            timestamp: std::time::Instant::now(),
        });
    }

    async fn respond(&self, operation: &str, request: &ChatRequest) -> Result<String> {
        let input = request.last_user_message().unwrap_or_default();
        self.log_call(operation, input);
        trace!(model = %self.model_id, op = operation, "Mock call");

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        if let Some(ref message) = self.config.failure {
            return Err(Error::Inference(message.clone()));
        }

        Ok(self
            .config
            .fixed_responses
            .get(input)
            .cloned()
            .unwrap_or_else(|| self.config.default_response.clone()))
    }

    fn chunks(&self, response: &str) -> Vec<String> {
        match self.config.chunk_size {
            Some(size) => {
                let chars: Vec<char> = response.chars().collect();
                chars.chunks(size).map(|c| c.iter().collect()).collect()
            }
            None => response.split_inclusive(' ').map(str::to_string).collect(),
        }
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &ChatRequest) -> Result<Generation> {
        let text = self.respond("generate", request).await?;
        Ok(Generation {
            reasoning: self.config.native_reasoning.clone(),
            ..Generation::text(text)
        })
    }

    async fn stream(&self, request: &ChatRequest) -> Result<GenerationStream> {
        let text = self.respond("stream", request).await?;

        let mut parts: Vec<Result<StreamPart>> = Vec::new();
        if let Some(ref reasoning) = self.config.native_reasoning {
            parts.push(Ok(StreamPart::ReasoningDelta(reasoning.clone())));
        }
        parts.extend(
            self.chunks(&text)
                .into_iter()
                .map(|c| Ok(StreamPart::TextDelta(c))),
        );
        parts.push(Ok(StreamPart::Finish(Some("stop".to_string()))));

        Ok(Box::pin(stream::iter(parts)))
    }
}
