//! # tekir-inference
//!
//! Provider and model selection for Tekir chat.
//!
//! This crate provides:
//! - Model and provider registries with default fallbacks
//! - The selection resolver mapping (provider, reasoning) to a model id
//! - Test and production binding tables from model id to model handle
//! - Reasoning extraction for `<think>`-tagged output, one-shot and streamed
//! - An OpenAI-compatible client for the OpenRouter upstream
//! - Deterministic mock models for the test environment
//!
//! # Example
//!
//! ```rust,no_run
//! use tekir_inference::{ChatPreference, ChatRouter, InferenceConfig};
//! use tekir_core::{ChatRequest, LanguageModel};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = InferenceConfig::from_env().unwrap();
//!     let router = ChatRouter::from_config(&config).unwrap();
//!
//!     let preference = ChatPreference::from_stored(Some("deepseek"), Some("true"));
//!     let routed = router.route(&preference).unwrap();
//!     let generation = routed
//!         .handle
//!         .generate(&ChatRequest::from_prompt("Why is the sky blue?"))
//!         .await
//!         .unwrap();
//!
//!     println!("reasoning: {:?}", generation.reasoning);
//!     println!("answer: {}", generation.text);
//! }
//! ```

pub mod binding;
pub mod catalog;
pub mod config;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod reasoning;
pub mod router;
pub mod selector;
pub mod thinking;

// Re-export core types
pub use tekir_core::*;

pub use binding::{binding_spec, BindingSpec, ModelBindings, BINDINGS};
pub use catalog::{ModelCatalog, ModelDescriptor};
pub use config::{ConfigError, Environment, InferenceConfig};
pub use mock::MockLanguageModel;
pub use openai::{OpenAIChatModel, OpenAICompatibleConfig, OpenAICompatibleProvider};
pub use provider::{ProviderCatalog, ProviderDescriptor};
pub use reasoning::{split_reasoning_stream, ExtractReasoning};
pub use router::{ChatRouter, RoutedModel, UtilityModel};
pub use selector::{resolve_model_id, ChatPreference};
pub use thinking::{
    has_reasoning_tag, parse_tagged_response, ReasoningTag, TagSplitter, ThinkingResponse,
};
