//! Chat request routing.
//!
//! [`ChatRouter`] ties the registries, the resolver and the active binding
//! table together. It is built once at startup, checked for completeness,
//! and shared by reference across concurrent requests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use tekir_core::defaults::{ARTIFACT_MODEL, TITLE_MODEL};
use tekir_core::logging;
use tekir_core::{ModelHandle, Result};

use crate::binding::ModelBindings;
use crate::catalog::{ModelCatalog, ModelDescriptor};
use crate::config::InferenceConfig;
use crate::provider::{ProviderCatalog, ProviderDescriptor};
use crate::selector::ChatPreference;

/// Internal models that are bound but never user-selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilityModel {
    /// Conversation titling.
    Title,
    /// Artifact generation.
    Artifact,
}

impl UtilityModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Title => TITLE_MODEL,
            Self::Artifact => ARTIFACT_MODEL,
        }
    }
}

/// Outcome of routing one request.
#[derive(Clone)]
pub struct RoutedModel {
    /// Resolved model identifier.
    pub model_id: &'static str,
    /// Handle to invoke.
    pub handle: ModelHandle,
}

impl std::fmt::Debug for RoutedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutedModel")
            .field("model_id", &self.model_id)
            .field("upstream", &self.handle.model_id())
            .field("extracts_reasoning", &self.handle.extracts_reasoning())
            .finish()
    }
}

/// Resolves chat preferences to bound model handles.
#[derive(Debug, Clone)]
pub struct ChatRouter {
    models: Arc<ModelCatalog>,
    providers: Arc<ProviderCatalog>,
    bindings: Arc<ModelBindings>,
}

impl ChatRouter {
    /// Create a router, failing if any reachable model id is unbound.
    pub fn new(
        models: Arc<ModelCatalog>,
        providers: Arc<ProviderCatalog>,
        bindings: Arc<ModelBindings>,
    ) -> Result<Self> {
        bindings.verify(&providers, &models)?;

        info!(
            environment = %bindings.environment(),
            providers = providers.len(),
            models = models.len(),
            bindings = bindings.len(),
            "Chat router ready"
        );

        Ok(Self {
            models,
            providers,
            bindings,
        })
    }

    /// Validate `config`, build the binding table it selects and a router
    /// over the built-in registries.
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        config.validate()?;
        let bindings = ModelBindings::for_environment(config)?;
        Self::new(
            Arc::new(ModelCatalog::builtin()),
            Arc::new(ProviderCatalog::builtin()),
            Arc::new(bindings),
        )
    }

    /// Resolve the preference current at send time to a handle.
    #[instrument(skip(self, preference), fields(subsystem = "routing", op = "route", provider_id = %preference.provider_id, reasoning = preference.reasoning_enabled, model_id = tracing::field::Empty))]
    pub fn route(&self, preference: &ChatPreference) -> Result<RoutedModel> {
        let model_id = preference.model_id();
        tracing::Span::current().record(logging::MODEL_ID, model_id);

        let handle = self.bindings.resolve(model_id)?;
        debug!(model = handle.model_id(), "Routed chat request");

        Ok(RoutedModel { model_id, handle })
    }

    /// Handle for an internal utility model.
    pub fn utility(&self, utility: UtilityModel) -> Result<ModelHandle> {
        self.bindings.resolve(utility.model_id())
    }

    /// Provider shown as selected; unknown ids display the default.
    pub fn selected_provider(&self, preference: &ChatPreference) -> &ProviderDescriptor {
        self.providers.get_or_default(&preference.provider_id)
    }

    /// Model shown as selected; ids outside the registry display the default.
    pub fn selected_model(&self, preference: &ChatPreference) -> &ModelDescriptor {
        self.models.get_or_default(preference.model_id())
    }

    pub fn models(&self) -> &ModelCatalog {
        &self.models
    }

    pub fn providers(&self) -> &ProviderCatalog {
        &self.providers
    }

    pub fn bindings(&self) -> &ModelBindings {
        &self.bindings
    }
}
