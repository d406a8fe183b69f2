//! OpenAI-compatible chat backend implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use tekir_core::defaults::{
    APP_REFERER, APP_TITLE, HEALTH_CHECK_TIMEOUT_SECS, OPENROUTER_URL, REQUEST_TIMEOUT_SECS,
};
use tekir_core::logging;
use tekir_core::{
    ChatRequest, Error, Generation, GenerationStream, LanguageModel, Result,
};

use super::error::{to_tekir_error, UpstreamErrorKind};
use super::streaming::parse_sse_stream;
use super::types::*;

/// Configuration for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAICompatibleConfig {
    /// Short name used in logs (e.g. "openrouter").
    pub name: String,
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// HTTP-Referer header identifying the calling application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_referer: Option<String>,
    /// X-Title header naming the calling application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAICompatibleConfig {
    fn default() -> Self {
        Self {
            name: "openrouter".to_string(),
            base_url: OPENROUTER_URL.to_string(),
            api_key: None,
            http_referer: Some(APP_REFERER.to_string()),
            x_title: Some(APP_TITLE.to_string()),
            timeout_seconds: REQUEST_TIMEOUT_SECS,
        }
    }
}

/// A configured OpenAI-compatible endpoint.
///
/// Owns one HTTP client; every chat model created from it shares that
/// client's connection pool. Cloning is cheap.
#[derive(Clone)]
pub struct OpenAICompatibleProvider {
    client: Client,
    config: Arc<OpenAICompatibleConfig>,
}

impl OpenAICompatibleProvider {
    /// Create a new provider with the given configuration.
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            provider = %config.name,
            url = %config.base_url,
            http_referer = config.http_referer.as_deref().unwrap_or("(none)"),
            x_title = config.x_title.as_deref().unwrap_or("(none)"),
            "Initializing OpenAI-compatible provider"
        );

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAICompatibleConfig {
        &self.config
    }

    /// A chat model served by this endpoint.
    pub fn chat_model(&self, model: impl Into<String>) -> OpenAIChatModel {
        OpenAIChatModel {
            provider: self.clone(),
            model: model.into(),
        }
    }

    /// Check that the endpoint is reachable and accepts the credentials.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .build_get_request("/models")
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!(provider = %self.config.name, "Health check passed");
                Ok(true)
            }
            Ok(resp) => {
                warn!(provider = %self.config.name, status = %resp.status(), "Health check failed");
                Ok(false)
            }
            Err(e) => {
                warn!(provider = %self.config.name, error = %e, "Health check error");
                Ok(false)
            }
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Build a request with authentication and app identification headers.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.post(self.url(endpoint));

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        if let Some(ref referer) = self.config.http_referer {
            req = req.header("HTTP-Referer", referer);
        }

        if let Some(ref title) = self.config.x_title {
            req = req.header("X-Title", title);
        }

        req.header("Content-Type", "application/json")
    }

    /// Build a GET request with authentication.
    fn build_get_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(self.url(endpoint));

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req
    }

    async fn post_chat(&self, body: &ChatCompletionRequest) -> Result<Response> {
        let response = self
            .build_request("/chat/completions")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        tracing::Span::current().record(logging::HTTP_STATUS, status.as_u16());

        if status.is_success() {
            return Ok(response);
        }

        let error = response
            .json::<OpenAIErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or(OpenAIError {
                message: "Unknown error".to_string(),
                error_type: None,
                code: None,
            });
        let kind = UpstreamErrorKind::classify(status.as_u16(), &error);

        warn!(
            provider = %self.config.name,
            model = %body.model,
            status = %status,
            kind = ?kind,
            upstream_code = ?error.numeric_code(),
            retryable = kind.is_retryable(),
            "Upstream returned an error"
        );

        Err(to_tekir_error(
            kind,
            &format!("{} returned {}: {}", self.config.name, status, error.message),
        ))
    }
}

/// One upstream model on an OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAIChatModel {
    provider: OpenAICompatibleProvider,
    model: String,
}

impl OpenAIChatModel {
    pub fn provider(&self) -> &OpenAICompatibleProvider {
        &self.provider
    }

    fn completion_request(&self, request: &ChatRequest, stream: bool) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: request.messages.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAIChatModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        &self.provider.config.name
    }

    #[instrument(skip(self, request), fields(subsystem = "inference", component = "openai", op = "generate", model = %self.model, prompt_len = request.prompt_len(), http_status = tracing::field::Empty, response_len = tracing::field::Empty))]
    async fn generate(&self, request: &ChatRequest) -> Result<Generation> {
        let body = self.completion_request(request, false);
        let response = self.provider.post_chat(&body).await?;

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let Some(choice) = result.choices.into_iter().next() else {
            return Err(Error::Inference(format!(
                "{} returned no choices",
                self.model
            )));
        };

        let text = choice.message.content.unwrap_or_default();
        tracing::Span::current().record(logging::RESPONSE_LEN, text.len());
        debug!("Generation complete");

        Ok(Generation {
            text,
            reasoning: choice.message.reasoning.filter(|r| !r.is_empty()),
            finish_reason: choice.finish_reason,
            usage: result.usage.map(Into::into),
        })
    }

    #[instrument(skip(self, request), fields(subsystem = "inference", component = "openai", op = "stream", model = %self.model, prompt_len = request.prompt_len(), http_status = tracing::field::Empty))]
    async fn stream(&self, request: &ChatRequest) -> Result<GenerationStream> {
        let body = self.completion_request(request, true);
        let response = self.provider.post_chat(&body).await?;
        debug!("Stream opened");
        Ok(parse_sse_stream(response.bytes_stream()))
    }
}
