//! Drafter - conversational document drafting assistant
//!
//! Runs a single interactive session on the console: the user describes
//! changes, the model edits the document through the `update` action, and
//! the session ends once the document is saved.

mod llm;
mod oracle;
mod runtime;
mod state_machine;
mod system_prompt;
mod tools;

use llm::{LlmConfig, ModelRegistry};
use runtime::{
    ConsoleInput, ConsoleOutput, FsPersistence, InputError, RegistryLlmClient, SessionConfig,
    SessionError, SessionOutcome, SessionRuntime, TurnError,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for configuration and credential problems found before the session starts
const STARTUP_FAILURE: u8 = 2;

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "drafter=warn".into());
    let json = std::env::var("DRAFTER_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    // stdout carries the transcript, so logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if !llm_registry.has_models() {
        tracing::error!("No LLM API keys configured. Set GROQ_API_KEY or OPENAI_API_KEY.");
        eprintln!("drafter: no model credentials; set GROQ_API_KEY or OPENAI_API_KEY");
        return ExitCode::from(STARTUP_FAILURE);
    }
    if llm_registry.default().is_none() {
        tracing::error!(
            model = %llm_registry.default_model_id(),
            available = ?llm_registry.available_models(),
            "Configured model is not available"
        );
        eprintln!(
            "drafter: model '{}' is not available; choose one of {:?}",
            llm_registry.default_model_id(),
            llm_registry.available_models()
        );
        return ExitCode::from(STARTUP_FAILURE);
    }
    tracing::info!(
        models = ?llm_registry.available_models(),
        default = %llm_registry.default_model_id(),
        "LLM registry initialized"
    );

    let config = match SessionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            eprintln!("drafter: {e}");
            return ExitCode::from(STARTUP_FAILURE);
        }
    };

    let llm = RegistryLlmClient::new(
        llm_registry.clone(),
        llm_registry.default_model_id().to_string(),
    );
    let persistence = FsPersistence::new(config.output_dir.clone());
    let runtime = SessionRuntime::new(
        config,
        llm,
        ConsoleInput::default(),
        ConsoleOutput,
        persistence,
    );

    match runtime.run().await {
        Ok(SessionOutcome { turns, saved_to, .. }) => {
            tracing::info!(turns, saved_to = ?saved_to, "Document saved");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("drafter: {}", exit_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn exit_message(error: &SessionError) -> String {
    match error {
        SessionError::Turn(TurnError::Input(InputError::Closed)) => {
            "input closed before the document was saved".to_string()
        }
        SessionError::Turn(TurnError::Model(e)) => {
            format!("model request failed ({}): {e}", e.kind.as_str())
        }
        other => format!("session ended: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    #[test]
    fn test_exit_message_names_the_cause() {
        let closed = SessionError::Turn(TurnError::Input(InputError::Closed));
        assert_eq!(
            exit_message(&closed),
            "input closed before the document was saved"
        );

        let model = SessionError::Turn(TurnError::Model(LlmError::rate_limit("slow down")));
        assert_eq!(
            exit_message(&model),
            "model request failed (rate_limit): slow down"
        );

        let stalled = SessionError::Stalled("awaiting_turn");
        assert!(exit_message(&stalled).starts_with("session ended:"));
    }
}
