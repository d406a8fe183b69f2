//! Model selection from a user's chat preference.
//!
//! A preference is a provider id plus a reasoning toggle. Resolution has two
//! branches: the Deepseek provider, and everything else. The second branch is
//! the catch-all, so unknown, empty, or stale provider ids behave like the
//! primary provider instead of failing.
//!
//! | provider   | reasoning | model id               |
//! |------------|-----------|------------------------|
//! | `deepseek` | false     | `deepseek-chat`        |
//! | `deepseek` | true      | `deepseek-reasoning`   |
//! | other      | false     | `chat-model`           |
//! | other      | true      | `chat-model-reasoning` |

use serde::{Deserialize, Serialize};

use tekir_core::defaults::{
    CHAT_MODEL, CHAT_MODEL_REASONING, DEEPSEEK_CHAT, DEEPSEEK_PROVIDER, DEEPSEEK_REASONING,
    DEFAULT_CHAT_PROVIDER,
};

/// Resolve a provider id and reasoning flag to a model identifier.
///
/// Total and pure: every input maps to one of four identifiers.
///
/// # Examples
///
/// ```
/// use tekir_inference::selector::resolve_model_id;
///
/// assert_eq!(resolve_model_id("deepseek", true), "deepseek-reasoning");
/// assert_eq!(resolve_model_id("openai", false), "chat-model");
/// assert_eq!(resolve_model_id("no-such-provider", true), "chat-model-reasoning");
/// ```
pub fn resolve_model_id(provider_id: &str, reasoning_enabled: bool) -> &'static str {
    let is_deepseek = provider_id == DEEPSEEK_PROVIDER;

    if reasoning_enabled {
        if is_deepseek {
            DEEPSEEK_REASONING
        } else {
            CHAT_MODEL_REASONING
        }
    } else if is_deepseek {
        DEEPSEEK_CHAT
    } else {
        CHAT_MODEL
    }
}

/// Per-session model preference.
///
/// Read once when a chat session starts; the user may change it afterwards,
/// and each outgoing request resolves the value current at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPreference {
    pub provider_id: String,
    pub reasoning_enabled: bool,
}

impl Default for ChatPreference {
    fn default() -> Self {
        Self {
            provider_id: DEFAULT_CHAT_PROVIDER.to_string(),
            reasoning_enabled: false,
        }
    }
}

impl ChatPreference {
    pub fn new(provider_id: impl Into<String>, reasoning_enabled: bool) -> Self {
        Self {
            provider_id: provider_id.into(),
            reasoning_enabled,
        }
    }

    /// Build a preference from raw stored values.
    ///
    /// `provider_cookie` is the provider cookie's value; a missing or blank
    /// value selects the default provider. Any other value is kept exactly,
    /// so it is compared without trimming or case folding. `reasoning_flag` is the stored
    /// toggle text, where only `"true"` enables reasoning.
    pub fn from_stored(provider_cookie: Option<&str>, reasoning_flag: Option<&str>) -> Self {
        let provider_id = provider_cookie
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_CHAT_PROVIDER);

        Self {
            provider_id: provider_id.to_string(),
            reasoning_enabled: parse_reasoning_flag(reasoning_flag),
        }
    }

    /// Change the provider. Takes effect on the next resolution.
    pub fn set_provider(&mut self, provider_id: impl Into<String>) {
        self.provider_id = provider_id.into();
    }

    /// Change the reasoning toggle. Takes effect on the next resolution.
    pub fn set_reasoning(&mut self, enabled: bool) {
        self.reasoning_enabled = enabled;
    }

    /// Model identifier for the current preference.
    pub fn model_id(&self) -> &'static str {
        resolve_model_id(&self.provider_id, self.reasoning_enabled)
    }
}

/// Stored toggles are JSON booleans; anything unreadable means off.
fn parse_reasoning_flag(value: Option<&str>) -> bool {
    value
        .and_then(|v| serde_json::from_str::<bool>(v.trim()).ok())
        .unwrap_or(false)
}
