//! Runtime for executing drafting sessions
//!
//! Owns the session state, drives the pure state machine, and performs the
//! effects it asks for through the capability traits.

mod executor;
pub mod traits;
mod turn;

#[cfg(test)]
pub mod testing;

pub use executor::{SessionError, SessionOutcome, SessionRuntime};
pub use traits::*;
pub use turn::TurnError;

use crate::oracle::TerminationStrategy;
use crate::system_prompt::PromptTemplate;
use std::path::PathBuf;
use thiserror::Error;

/// Opening message used by the CLI when no kickoff is configured
pub const DEFAULT_KICKOFF: &str =
    "I'm ready to help you update a document. What would you like to create?";

/// Upper bound on tokens per model reply
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Invalid session configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read system prompt file {path}: {source}")]
    PromptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("DRAFTER_TERMINATION: {0}")]
    Termination(String),
}

/// Session configuration, constructed once at startup and handed to the runtime
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub prompt: PromptTemplate,
    /// First user message, used instead of reading input while the history is empty
    pub kickoff: Option<String>,
    pub termination: TerminationStrategy,
    /// Directory relative save paths resolve against
    pub output_dir: PathBuf,
    pub max_tokens: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: PromptTemplate::default(),
            kickoff: None,
            termination: TerminationStrategy::default(),
            output_dir: PathBuf::from("."),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let prompt = match lookup("DRAFTER_SYSTEM_PROMPT_FILE") {
            Some(path) => {
                let path = PathBuf::from(path);
                PromptTemplate::from_file(&path)
                    .map_err(|source| ConfigError::PromptFile { path, source })?
            }
            None => PromptTemplate::default(),
        };

        // Unset means the default greeting; set-but-empty disables it
        let kickoff = match lookup("DRAFTER_KICKOFF") {
            Some(text) if text.trim().is_empty() => None,
            Some(text) => Some(text),
            None => Some(DEFAULT_KICKOFF.to_string()),
        };

        let termination = match lookup("DRAFTER_TERMINATION") {
            Some(value) => value.parse().map_err(ConfigError::Termination)?,
            None => TerminationStrategy::default(),
        };

        let output_dir = lookup("DRAFTER_OUTPUT_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);

        Ok(Self {
            prompt,
            kickoff,
            termination,
            output_dir,
            ..Self::default()
        })
    }
}
