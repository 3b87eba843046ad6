//! Model registry for managing available LLM providers

use super::{all_models, LlmService, LoggingService, ModelDef, Provider};
use std::collections::HashMap;
use std::sync::Arc;

/// Model used when none is configured and it is available
pub const PREFERRED_DEFAULT_MODEL: &str = "llama3-70b";

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Overrides every provider's API root (e.g. a local proxy)
    pub base_url: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            groq_api_key: std::env::var(Provider::Groq.api_key_env_var()).ok(),
            openai_api_key: std::env::var(Provider::OpenAI.api_key_env_var()).ok(),
            base_url: std::env::var("DRAFTER_BASE_URL").ok(),
            default_model: std::env::var("DRAFTER_MODEL").ok(),
        }
    }

    fn api_key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Groq => self.groq_api_key.as_deref(),
            Provider::OpenAI => self.openai_api_key.as_deref(),
        }
        .filter(|key| !key.trim().is_empty())
    }
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_def in all_models() {
            if let Some(service) = Self::try_create_model(model_def, config) {
                services.insert(model_def.id.to_string(), service);
            }
        }

        let default_model = config
            .default_model
            .clone()
            .or_else(|| {
                if services.contains_key(PREFERRED_DEFAULT_MODEL) {
                    Some(PREFERRED_DEFAULT_MODEL.to_string())
                } else {
                    let mut ids: Vec<_> = services.keys().cloned().collect();
                    ids.sort();
                    ids.into_iter().next()
                }
            })
            .unwrap_or_else(|| PREFERRED_DEFAULT_MODEL.to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Try to create a model service; `None` when its provider has no key
    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        let api_key = config.api_key(model_def.provider)?;

        match model_def.create(api_key, config.base_url.as_deref()) {
            Ok(service) => {
                tracing::debug!(
                    model = model_def.id,
                    provider = model_def.provider.display_name(),
                    description = model_def.description,
                    "Model available"
                );
                Some(Arc::new(LoggingService::new(service)))
            }
            Err(e) => {
                tracing::warn!(model = model_def.id, error = %e, "Failed to create model service");
                None
            }
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }
}
