//! Provider registry: the upstream model families a user can choose from.
//!
//! Each provider implicitly owns a plain and a reasoning model id. That
//! mapping lives in [`crate::selector`], not here:
//!
//! ```text
//! "openai"   → chat-model      / chat-model-reasoning
//! "deepseek" → deepseek-chat   / deepseek-reasoning
//! ```
//!
//! Unknown provider ids are never fatal. Display code falls back to the
//! default provider through [`ProviderCatalog::get_or_default`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tekir_core::defaults::{DEEPSEEK_PROVIDER, DEFAULT_CHAT_PROVIDER, OPENAI_PROVIDER};
use tekir_core::{Error, Result};

// ---------------------------------------------------------------------------
// Provider descriptor
// ---------------------------------------------------------------------------

/// Display metadata for a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Provider identifier (e.g., "openai", "deepseek").
    pub id: String,
    pub name: String,
    pub description: String,
}

impl ProviderDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

// ---------------------------------------------------------------------------
// Provider catalog
// ---------------------------------------------------------------------------

/// Ordered, immutable catalog of providers.
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    providers: Vec<ProviderDescriptor>,
    default_index: usize,
}

impl ProviderCatalog {
    /// The providers shipped with Tekir, primary provider first.
    pub fn builtin() -> Self {
        Self {
            providers: vec![
                ProviderDescriptor::new(OPENAI_PROVIDER, "ChatGPT", "Advanced models from OpenAI"),
                ProviderDescriptor::new(
                    DEEPSEEK_PROVIDER,
                    "Deepseek",
                    "Open source models from Deepseek",
                ),
            ],
            default_index: 0,
        }
    }

    /// Build a catalog from an explicit list.
    ///
    /// Fails on an empty list, duplicate ids, or a default id that is not listed.
    pub fn new(providers: Vec<ProviderDescriptor>, default_id: &str) -> Result<Self> {
        if providers.is_empty() {
            return Err(Error::Config("Provider catalog cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.id.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate provider id in catalog: {}",
                    provider.id
                )));
            }
        }

        let default_index = providers
            .iter()
            .position(|p| p.id == default_id)
            .ok_or_else(|| {
                Error::Config(format!(
                    "Default provider {} is not in the catalog",
                    default_id
                ))
            })?;

        Ok(Self {
            providers,
            default_index,
        })
    }

    /// Get a provider by ID.
    pub fn get(&self, id: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.id == id)
    }

    /// Get a provider by ID, or the default provider when the id is unknown.
    pub fn get_or_default(&self, id: &str) -> &ProviderDescriptor {
        match self.get(id) {
            Some(provider) => provider,
            None => {
                debug!(
                    provider_id = id,
                    fallback = %self.default_provider().id,
                    "Unknown provider id, using default"
                );
                self.default_provider()
            }
        }
    }

    pub fn default_provider(&self) -> &ProviderDescriptor {
        &self.providers[self.default_index]
    }

    /// Check if a provider is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All provider ids in catalog order.
    pub fn ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a ProviderCatalog {
    type Item = &'a ProviderDescriptor;
    type IntoIter = std::slice::Iter<'a, ProviderDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.providers.iter()
    }
}
