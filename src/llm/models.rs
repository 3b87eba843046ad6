//! Centralized model definitions for all LLM providers

use super::openai::OpenAIService;
use super::LlmService;
use std::sync::Arc;

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    OpenAI,
}

impl Provider {
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::OpenAI => "https://api.openai.com/v1",
        }
    }
}

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID
    pub id: &'static str,
    pub provider: Provider,
    /// Name sent on the wire
    pub api_name: &'static str,
    pub description: &'static str,
}

impl ModelDef {
    /// Build the service for this model
    pub fn create(
        &self,
        api_key: &str,
        base_url: Option<&str>,
    ) -> Result<Arc<dyn LlmService>, String> {
        let base_url = base_url.unwrap_or_else(|| self.provider.default_base_url());
        OpenAIService::new(api_key, self.id, self.api_name, base_url)
            .map(|service| Arc::new(service) as Arc<dyn LlmService>)
            .map_err(|e| e.to_string())
    }
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "llama3-70b",
            provider: Provider::Groq,
            api_name: "llama3-70b-8192",
            description: "Llama 3 70B on Groq",
        },
        ModelDef {
            id: "llama-3.3-70b",
            provider: Provider::Groq,
            api_name: "llama-3.3-70b-versatile",
            description: "Llama 3.3 70B on Groq",
        },
        ModelDef {
            id: "gpt-4o-mini",
            provider: Provider::OpenAI,
            api_name: "gpt-4o-mini",
            description: "GPT-4o mini",
        },
        ModelDef {
            id: "gpt-4o",
            provider: Provider::OpenAI,
            api_name: "gpt-4o",
            description: "GPT-4o",
        },
    ]
}
