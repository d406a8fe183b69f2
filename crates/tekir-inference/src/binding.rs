//! Model binding tables.
//!
//! A binding table maps every model identifier the application can request
//! to an invokable [`ModelHandle`]. Two tables exist:
//!
//! - **test**: deterministic in-process doubles, no network
//! - **production**: one shared OpenAI-compatible client, one handle per
//!   upstream slug, reasoning variants wrapped in [`ExtractReasoning`]
//!
//! Tables are built once and never mutated afterwards. A lookup for an id
//! with no entry is a deployment defect and is reported, never substituted.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, info};

use tekir_core::defaults::{
    ARTIFACT_MODEL, CHAT_MODEL, CHAT_MODEL_REASONING, DEEPSEEK_CHAT, DEEPSEEK_CHAT_SLUG,
    DEEPSEEK_R1_SLUG, DEEPSEEK_REASONING, GPT_4O_MINI_SLUG, REASONING_TAG, TITLE_MODEL,
};
use tekir_core::{Error, ModelHandle, Result};

use crate::catalog::ModelCatalog;
use crate::config::{Environment, InferenceConfig};
use crate::mock::MockLanguageModel;
use crate::openai::{OpenAICompatibleConfig, OpenAICompatibleProvider};
use crate::provider::ProviderCatalog;
use crate::reasoning::ExtractReasoning;
use crate::selector::resolve_model_id;

// ---------------------------------------------------------------------------
// Production binding table
// ---------------------------------------------------------------------------

/// One row of the production binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingSpec {
    /// Stable model identifier.
    pub model_id: &'static str,
    /// Upstream slug on the OpenAI-compatible router.
    pub upstream: &'static str,
    /// Reasoning tag to extract, for reasoning variants.
    pub reasoning_tag: Option<&'static str>,
}

/// Production bindings, in display order.
pub const BINDINGS: &[BindingSpec] = &[
    BindingSpec {
        model_id: CHAT_MODEL,
        upstream: GPT_4O_MINI_SLUG,
        reasoning_tag: None,
    },
    BindingSpec {
        model_id: CHAT_MODEL_REASONING,
        upstream: GPT_4O_MINI_SLUG,
        reasoning_tag: Some(REASONING_TAG),
    },
    BindingSpec {
        model_id: DEEPSEEK_CHAT,
        upstream: DEEPSEEK_CHAT_SLUG,
        reasoning_tag: None,
    },
    BindingSpec {
        model_id: DEEPSEEK_REASONING,
        upstream: DEEPSEEK_R1_SLUG,
        reasoning_tag: Some(REASONING_TAG),
    },
    BindingSpec {
        model_id: TITLE_MODEL,
        upstream: GPT_4O_MINI_SLUG,
        reasoning_tag: None,
    },
    BindingSpec {
        model_id: ARTIFACT_MODEL,
        upstream: GPT_4O_MINI_SLUG,
        reasoning_tag: None,
    },
];

/// Look up the production binding row for a model id.
pub fn binding_spec(model_id: &str) -> Option<&'static BindingSpec> {
    BINDINGS.iter().find(|spec| spec.model_id == model_id)
}

// ---------------------------------------------------------------------------
// Binding table
// ---------------------------------------------------------------------------

/// Immutable map from model identifier to handle.
#[derive(Clone)]
pub struct ModelBindings {
    environment: Environment,
    table: BTreeMap<String, ModelHandle>,
}

impl std::fmt::Debug for ModelBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBindings")
            .field("environment", &self.environment)
            .field("models", &self.model_ids())
            .finish()
    }
}

impl ModelBindings {
    /// Create an empty table for the given environment.
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            table: BTreeMap::new(),
        }
    }

    /// Add or replace a binding. Used while assembling a table.
    pub fn bind(mut self, model_id: impl Into<String>, handle: ModelHandle) -> Self {
        let model_id = model_id.into();
        debug!(
            model_id = %model_id,
            model = handle.model_id(),
            extracts_reasoning = handle.extracts_reasoning(),
            "Binding model"
        );
        self.table.insert(model_id, handle);
        self
    }

    /// Deterministic test doubles for every model id.
    ///
    /// Reasoning doubles emit tagged output and are wrapped like their
    /// production counterparts, so both tables expose the same channels.
    pub fn test() -> Self {
        let mut bindings = Self::new(Environment::Test);
        for spec in BINDINGS {
            let double = match spec.model_id {
                TITLE_MODEL => MockLanguageModel::title(),
                ARTIFACT_MODEL => MockLanguageModel::artifact(),
                id if spec.reasoning_tag.is_some() => MockLanguageModel::reasoning(id),
                id => MockLanguageModel::chat(id),
            };
            bindings = bindings.bind(spec.model_id, wrap(Arc::new(double), spec));
        }

        info!(environment = %Environment::Test, models = bindings.len(), "Built binding table");
        bindings
    }

    /// Upstream models behind one shared OpenAI-compatible client.
    pub fn production(config: &OpenAICompatibleConfig) -> Result<Self> {
        let provider = OpenAICompatibleProvider::new(config.clone())?;

        let mut bindings = Self::new(Environment::Production);
        for spec in BINDINGS {
            let model = provider.chat_model(spec.upstream);
            bindings = bindings.bind(spec.model_id, wrap(Arc::new(model), spec));
        }

        info!(
            environment = %Environment::Production,
            provider = %config.name,
            models = bindings.len(),
            "Built binding table"
        );
        Ok(bindings)
    }

    /// Build the table selected by `config.environment`.
    pub fn for_environment(config: &InferenceConfig) -> Result<Self> {
        match config.environment {
            Environment::Test => Ok(Self::test()),
            Environment::Production => Self::production(&config.openrouter),
        }
    }

    /// Get the handle bound to `model_id`.
    ///
    /// A missing entry is a configuration defect: the caller asked for an id
    /// this deployment does not serve. No other handle is substituted.
    pub fn resolve(&self, model_id: &str) -> Result<ModelHandle> {
        match self.table.get(model_id) {
            Some(handle) => {
                debug!(
                    model_id = model_id,
                    model = handle.model_id(),
                    environment = %self.environment,
                    "Resolved model binding"
                );
                Ok(Arc::clone(handle))
            }
            None => {
                error!(
                    model_id = model_id,
                    environment = %self.environment,
                    "No binding for model id"
                );
                Err(Error::UnboundModel(model_id.to_string()))
            }
        }
    }

    /// Get the handle bound to `model_id`, if any.
    pub fn get(&self, model_id: &str) -> Option<&ModelHandle> {
        self.table.get(model_id)
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.table.contains_key(model_id)
    }

    /// Bound model ids in sorted order.
    pub fn model_ids(&self) -> Vec<&str> {
        self.table.keys().map(String::as_str).collect()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Check that every id the resolver can produce is bound.
    ///
    /// Covers each registered provider with reasoning on and off, plus every
    /// model registry entry. Reports all gaps at once.
    pub fn verify(&self, providers: &ProviderCatalog, models: &ModelCatalog) -> Result<()> {
        let mut missing: Vec<String> = Vec::new();

        for provider in providers {
            for reasoning in [false, true] {
                let model_id = resolve_model_id(&provider.id, reasoning);
                if !self.contains(model_id) {
                    missing.push(format!(
                        "{} (provider {}, reasoning {})",
                        model_id, provider.id, reasoning
                    ));
                }
            }
        }

        for model in models {
            if !self.contains(&model.id) {
                missing.push(format!("{} (model registry)", model.id));
            }
        }

        if missing.is_empty() {
            debug!(
                environment = %self.environment,
                providers = providers.len(),
                models = models.len(),
                "Binding table complete"
            );
            return Ok(());
        }

        error!(
            environment = %self.environment,
            missing = ?missing,
            "Binding table incomplete"
        );
        Err(Error::UnboundModel(missing.join(", ")))
    }
}

fn wrap(model: ModelHandle, spec: &BindingSpec) -> ModelHandle {
    match spec.reasoning_tag {
        Some(tag) => Arc::new(ExtractReasoning::new(model, tag)),
        None => model,
    }
}
