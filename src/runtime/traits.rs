//! Trait abstractions for runtime I/O
//!
//! Every collaborator the session talks to (model, input, output, disk) sits
//! behind one of these traits so the orchestrator can be driven by mocks.

use crate::llm::{LlmError, LlmRequest, LlmResponse};
use async_trait::async_trait;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Failure to obtain the next user utterance
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input stream closed")]
    Closed,
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to write a document to its destination
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PersistenceError {
    pub path: PathBuf,
    pub message: String,
}

impl PersistenceError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Client for making LLM requests
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete an LLM request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Source of user utterances (console, speech-to-text, ...)
///
/// An empty string is a valid utterance. Only end-of-stream and hard I/O
/// failures are errors.
#[async_trait]
pub trait InputSource: Send {
    async fn next_utterance(&mut self) -> Result<String, InputError>;
}

/// Sink for transcript lines (console, text-to-speech, ...). Fire-and-forget.
pub trait OutputSink: Send + Sync {
    fn emit(&self, text: &str);
}

/// Capability to write a named blob
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Write `content` as the entire contents of `path`
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), PersistenceError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).complete(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

impl<T: OutputSink + ?Sized> OutputSink for Arc<T> {
    fn emit(&self, text: &str) {
        (**self).emit(text);
    }
}

#[async_trait]
impl<T: Persistence + ?Sized> Persistence for Arc<T> {
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), PersistenceError> {
        (**self).write_file(path, content).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

use crate::llm::ModelRegistry;

/// Adapter to use `ModelRegistry` as `LlmClient`
pub struct RegistryLlmClient {
    registry: Arc<ModelRegistry>,
    model_id: String,
}

impl RegistryLlmClient {
    pub fn new(registry: Arc<ModelRegistry>, model_id: String) -> Self {
        Self { registry, model_id }
    }
}

#[async_trait]
impl LlmClient for RegistryLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let llm = self
            .registry
            .get(&self.model_id)
            .or_else(|| self.registry.default())
            .ok_or_else(|| LlmError::auth("No LLM available"))?;
        llm.complete(request).await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Line-based console input with a prompt
pub struct ConsoleInput {
    prompt: String,
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleInput {
    pub const DEFAULT_PROMPT: &'static str = "\nWhat would you like to do with the document? ";

    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROMPT)
    }
}

#[async_trait]
impl InputSource for ConsoleInput {
    async fn next_utterance(&mut self) -> Result<String, InputError> {
        {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{}", self.prompt)?;
            stdout.flush()?;
        }
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim_end_matches('\r').to_string()),
            None => Err(InputError::Closed),
        }
    }
}

/// Prints transcript lines to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl OutputSink for ConsoleOutput {
    fn emit(&self, text: &str) {
        println!("{text}");
    }
}

/// Writes documents to the filesystem, resolving relative names against a base directory
#[derive(Debug, Clone)]
pub struct FsPersistence {
    base_dir: PathBuf,
}

impl FsPersistence {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        // Absolute paths replace the base on join
        self.base_dir.join(path)
    }
}

#[async_trait]
impl Persistence for FsPersistence {
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), PersistenceError> {
        let target = self.resolve(path);
        tokio::fs::write(&target, content.as_bytes())
            .await
            .map_err(|e| PersistenceError::new(&target, e.to_string()))?;
        tracing::debug!(path = %target.display(), bytes = content.len(), "Document written");
        Ok(())
    }
}
