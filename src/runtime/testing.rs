//! Mock implementations for testing
//!
//! These mocks enable whole-session testing without real I/O.

use super::traits::*;
use crate::llm::{ContentBlock, LlmError, LlmRequest, LlmResponse, Usage};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a text-only reply
    pub fn queue_text(&self, text: &str) {
        self.queue_response(text_response(text));
    }

    /// Queue a reply requesting the given `(id, name, arguments)` calls
    pub fn queue_tool_calls(&self, text: &str, calls: &[(&str, &str, Value)]) {
        self.queue_response(tool_response(text, calls));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        content: vec![ContentBlock::text(text)],
        usage: Usage::default(),
    }
}

pub fn tool_response(text: &str, calls: &[(&str, &str, Value)]) -> LlmResponse {
    let mut content = Vec::with_capacity(calls.len() + 1);
    if !text.is_empty() {
        content.push(ContentBlock::text(text));
    }
    content.extend(
        calls
            .iter()
            .map(|(id, name, input)| ContentBlock::tool_use(*id, *name, input.clone())),
    );
    LlmResponse {
        content,
        usage: Usage::default(),
    }
}

// ============================================================================
// Scripted Input
// ============================================================================

/// Replays a fixed list of utterances, then reports the stream closed
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_utterance(&mut self) -> Result<String, InputError> {
        self.lines.pop_front().ok_or(InputError::Closed)
    }
}

// ============================================================================
// Recording Output
// ============================================================================

/// Captures every emitted transcript line
#[derive(Debug, Default)]
pub struct RecordingOutput {
    lines: Mutex<Vec<String>>,
}

impl RecordingOutput {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// True if any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }
}

impl OutputSink for RecordingOutput {
    fn emit(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// In-memory file store keyed by path
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    files: Mutex<HashMap<String, String>>,
}

impl MemoryPersistence {
    pub fn get(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), PersistenceError> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string_lossy().into_owned(), content.to_string());
        Ok(())
    }
}

/// Persistence that refuses every write, like a missing directory would
#[derive(Debug, Default)]
pub struct FailingPersistence;

#[async_trait]
impl Persistence for FailingPersistence {
    async fn write_file(&self, path: &Path, _content: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::new(
            path,
            "No such file or directory (os error 2)",
        ))
    }
}

/// Fails the first `n` writes, then behaves like `MemoryPersistence`
#[derive(Debug, Default)]
pub struct FlakyPersistence {
    failures_left: Mutex<usize>,
    inner: MemoryPersistence,
}

impl FlakyPersistence {
    pub fn failing_first(n: usize) -> Self {
        Self {
            failures_left: Mutex::new(n),
            inner: MemoryPersistence::default(),
        }
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.inner.get(path)
    }
}

#[async_trait]
impl Persistence for FlakyPersistence {
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), PersistenceError> {
        {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(PersistenceError::new(
                    path,
                    "Permission denied (os error 13)",
                ));
            }
        }
        self.inner.write_file(path, content).await
    }
}
