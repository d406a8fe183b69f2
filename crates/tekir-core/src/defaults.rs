//! Centralized default constants for Tekir chat routing.
//!
//! **This module is the single source of truth** for shared identifiers and
//! default values. The inference crate and any chat handler should reference
//! these constants instead of repeating string literals.

// =============================================================================
// MODEL IDENTIFIERS
// =============================================================================

/// Plain chat model of the primary provider.
pub const CHAT_MODEL: &str = "chat-model";

/// Reasoning variant of the primary provider.
pub const CHAT_MODEL_REASONING: &str = "chat-model-reasoning";

/// Plain chat model of the Deepseek provider.
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// Reasoning variant of the Deepseek provider.
pub const DEEPSEEK_REASONING: &str = "deepseek-reasoning";

/// Internal model used to title conversations. Not user-selectable.
pub const TITLE_MODEL: &str = "title-model";

/// Internal model used for artifact generation. Not user-selectable.
pub const ARTIFACT_MODEL: &str = "artifact-model";

/// Model used when nothing else is selected.
pub const DEFAULT_CHAT_MODEL: &str = CHAT_MODEL;

// =============================================================================
// PROVIDER IDENTIFIERS
// =============================================================================

/// Primary provider id.
pub const OPENAI_PROVIDER: &str = "openai";

/// Deepseek provider id.
pub const DEEPSEEK_PROVIDER: &str = "deepseek";

/// Provider used when the stored preference is absent.
pub const DEFAULT_CHAT_PROVIDER: &str = OPENAI_PROVIDER;

// =============================================================================
// PREFERENCE STORAGE KEYS
// =============================================================================

/// Cookie holding the selected provider id.
pub const PROVIDER_COOKIE: &str = "chat-model";

/// Client storage key holding the reasoning toggle.
pub const REASONING_STORAGE_KEY: &str = "useReasoning";

// =============================================================================
// REASONING EXTRACTION
// =============================================================================

/// Tag delimiting reasoning text in model output (`<think>...</think>`).
pub const REASONING_TAG: &str = "think";

// =============================================================================
// UPSTREAM BACKEND (OpenRouter)
// =============================================================================

/// OpenAI-compatible endpoint serving every production model.
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";

/// `HTTP-Referer` header identifying the calling application.
pub const APP_REFERER: &str = "https://tekir.co";

/// `X-Title` header identifying the calling application.
pub const APP_TITLE: &str = "Tekir";

/// Request timeout in seconds for upstream calls.
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Timeout in seconds for upstream health checks.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Upstream slug for the primary provider's models.
pub const GPT_4O_MINI_SLUG: &str = "openai/gpt-4o-mini";

/// Upstream slug for Deepseek chat.
pub const DEEPSEEK_CHAT_SLUG: &str = "deepseek/deepseek-chat-v3-0324";

/// Upstream slug for Deepseek reasoning.
pub const DEEPSEEK_R1_SLUG: &str = "deepseek/deepseek-r1";
