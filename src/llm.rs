//! LLM provider abstraction
//!
//! Provides a common interface for `OpenAI`-compatible chat providers.

mod error;
mod models;
mod openai;
mod registry;
mod types;

pub use error::LlmError;
pub use models::{all_models, ModelDef, Provider};
pub use registry::{LlmConfig, ModelRegistry};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Wraps a model service and logs every exchange: how much document and
/// history went out, and which actions came back
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let prompt_chars: usize = request.system.iter().map(|s| s.text.len()).sum();
        tracing::debug!(
            model = %self.model_id,
            history = request.messages.len(),
            prompt_chars,
            "Requesting reply"
        );

        let started = Instant::now();
        let result = self.inner.complete(request).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(reply) => {
                let actions: Vec<&str> = reply
                    .tool_uses()
                    .iter()
                    .map(|(_, name, _)| *name)
                    .collect();
                tracing::info!(
                    model = %self.model_id,
                    elapsed_ms = %elapsed_ms,
                    input_tokens = reply.usage.input_tokens,
                    output_tokens = reply.usage.output_tokens,
                    actions = ?actions,
                    has_text = !reply.text().trim().is_empty(),
                    "Model replied"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    elapsed_ms = %elapsed_ms,
                    kind = e.kind.as_str(),
                    transient = e.kind.is_transient(),
                    error = %e,
                    "Model request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
