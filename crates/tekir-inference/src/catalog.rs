//! Model registry: the user-selectable chat models.
//!
//! The catalog is built once at startup and shared read-only. Lookups that
//! miss are not errors; callers fall back to [`ModelCatalog::default_model`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use tekir_core::defaults::{
    CHAT_MODEL, CHAT_MODEL_REASONING, DEEPSEEK_CHAT, DEEPSEEK_REASONING, DEFAULT_CHAT_MODEL,
};
use tekir_core::{Error, Result};

/// Display metadata for a model identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Stable identifier sent with each chat request.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// One-line description shown in selectors.
    pub description: String,
}

impl ModelDescriptor {
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

/// Ordered, immutable catalog of chat models.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
    default_index: usize,
}

impl ModelCatalog {
    /// The four chat models shipped with Tekir.
    pub fn builtin() -> Self {
        Self {
            models: vec![
                ModelDescriptor::new(
                    CHAT_MODEL,
                    "Chat model",
                    "Primary model for all-purpose chat",
                ),
                ModelDescriptor::new(
                    CHAT_MODEL_REASONING,
                    "Reasoning model",
                    "Uses advanced reasoning",
                ),
                ModelDescriptor::new(DEEPSEEK_CHAT, "Deepseek Chat", "Deepseek chat model"),
                ModelDescriptor::new(
                    DEEPSEEK_REASONING,
                    "Deepseek Reasoning",
                    "Deepseek reasoning model",
                ),
            ],
            default_index: 0,
        }
    }

    /// Build a catalog from an explicit list.
    ///
    /// Fails on an empty list, duplicate ids, or a default id that is not listed.
    pub fn new(models: Vec<ModelDescriptor>, default_id: &str) -> Result<Self> {
        if models.is_empty() {
            return Err(Error::Config("Model catalog cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for model in &models {
            if !seen.insert(model.id.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate model id in catalog: {}",
                    model.id
                )));
            }
        }

        let default_index = models
            .iter()
            .position(|m| m.id == default_id)
            .ok_or_else(|| {
                Error::Config(format!("Default model {} is not in the catalog", default_id))
            })?;

        Ok(Self {
            models,
            default_index,
        })
    }

    /// Look up a model by id.
    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Look up a model by id, falling back to the default model.
    pub fn get_or_default(&self, id: &str) -> &ModelDescriptor {
        self.get(id).unwrap_or_else(|| self.default_model())
    }

    /// The model used when nothing is selected.
    pub fn default_model(&self) -> &ModelDescriptor {
        &self.models[self.default_index]
    }

    /// Whether a model id is listed.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All model ids in catalog order.
    pub fn ids(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a ModelCatalog {
    type Item = &'a ModelDescriptor;
    type IntoIter = std::slice::Iter<'a, ModelDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let catalog = ModelCatalog::builtin();
        assert_eq!(
            catalog.ids(),
            vec![
                "chat-model",
                "chat-model-reasoning",
                "deepseek-chat",
                "deepseek-reasoning"
            ]
        );
    }

    #[test]
    fn test_builtin_default_is_chat_model() {
        let catalog = ModelCatalog::builtin();
        assert_eq!(catalog.default_model().id, DEFAULT_CHAT_MODEL);
        assert_eq!(catalog.default_model().name, "Chat model");
    }

    #[test]
    fn test_get_existing() {
        let catalog = ModelCatalog::builtin();
        let model = catalog.get("deepseek-reasoning").unwrap();
        assert_eq!(model.name, "Deepseek Reasoning");
        assert_eq!(model.description, "Deepseek reasoning model");
    }

    #[test]
    fn test_get_missing_is_none() {
        let catalog = ModelCatalog::builtin();
        assert!(catalog.get("gpt-5").is_none());
        assert!(!catalog.contains("gpt-5"));
    }

    #[test]
    fn test_get_or_default_falls_back() {
        let catalog = ModelCatalog::builtin();
        assert_eq!(catalog.get_or_default("unknown").id, "chat-model");
        assert_eq!(catalog.get_or_default("deepseek-chat").id, "deepseek-chat");
    }

    #[test]
    fn test_title_model_not_selectable() {
        let catalog = ModelCatalog::builtin();
        assert!(!catalog.contains("title-model"));
        assert!(!catalog.contains("artifact-model"));
    }

    #[test]
    fn test_new_rejects_empty() {
        let result = ModelCatalog::new(vec![], "chat-model");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let result = ModelCatalog::new(
            vec![
                ModelDescriptor::new("a", "A", "first"),
                ModelDescriptor::new("a", "A again", "second"),
            ],
            "a",
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Duplicate model id"));
    }

    #[test]
    fn test_new_rejects_unknown_default() {
        let result = ModelCatalog::new(vec![ModelDescriptor::new("a", "A", "first")], "b");
        assert!(result.is_err());
    }

    #[test]
    fn test_new_custom_default() {
        let catalog = ModelCatalog::new(
            vec![
                ModelDescriptor::new("a", "A", "first"),
                ModelDescriptor::new("b", "B", "second"),
            ],
            "b",
        )
        .unwrap();
        assert_eq!(catalog.default_model().id, "b");
        assert_eq!(catalog.len(), 2);
        assert_eq!((&catalog).into_iter().count(), 2);
    }
}
