//! OpenAI-compatible chat backend.
//!
//! Every production model is served through one OpenAI-compatible router
//! (OpenRouter by default). The endpoint is configured once and hands out
//! one [`OpenAIChatModel`] per upstream slug, all sharing a single client.
//!
//! # Example
//!
//! ```rust,no_run
//! use tekir_core::{ChatRequest, LanguageModel};
//! use tekir_inference::openai::{OpenAICompatibleConfig, OpenAICompatibleProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = OpenAICompatibleProvider::new(OpenAICompatibleConfig {
//!         api_key: std::env::var("OPENROUTER_API_KEY").ok(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//!     let model = provider.chat_model("openai/gpt-4o-mini");
//!     let generation = model
//!         .generate(&ChatRequest::from_prompt("Hello"))
//!         .await
//!         .unwrap();
//!     println!("{}", generation.text);
//! }
//! ```

mod backend;
mod error;
mod streaming;
mod types;

pub use backend::{OpenAIChatModel, OpenAICompatibleConfig, OpenAICompatibleProvider};
pub use error::{to_tekir_error, UpstreamErrorKind};
pub use streaming::{parse_sse_stream, SseDecoder};
pub use types::*;
