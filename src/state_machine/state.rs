//! Session state types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

// ============================================================================
// Action Input Types - Strongly typed arguments for each action
// ============================================================================

/// Arguments for the `update` action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInput {
    pub content: String,
}

/// Arguments for the `save` action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveInput {
    pub filename: String,
}

/// Strongly typed action input.
///
/// Parsing never fails: names outside the registry become `Unknown`, and
/// known names whose arguments do not deserialize become `Malformed`. The
/// dispatcher rejects both before any action runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_action", rename_all = "snake_case")]
pub enum ActionInput {
    Update(UpdateInput),
    Save(SaveInput),
    Unknown {
        name: String,
        input: Value,
    },
    Malformed {
        name: String,
        input: Value,
        reason: String,
    },
}

impl ActionInput {
    pub const UPDATE: &'static str = "update";
    pub const SAVE: &'static str = "save";

    /// Get the action name as the model requested it
    pub fn action_name(&self) -> &str {
        match self {
            ActionInput::Update(_) => Self::UPDATE,
            ActionInput::Save(_) => Self::SAVE,
            ActionInput::Unknown { name, .. } | ActionInput::Malformed { name, .. } => name,
        }
    }

    /// Convert to JSON Value for the model wire format
    pub fn to_value(&self) -> Value {
        match self {
            ActionInput::Update(input) => serde_json::to_value(input).unwrap_or(Value::Null),
            ActionInput::Save(input) => serde_json::to_value(input).unwrap_or(Value::Null),
            ActionInput::Unknown { input, .. } | ActionInput::Malformed { input, .. } => {
                input.clone()
            }
        }
    }

    /// Parse from action name and JSON arguments
    pub fn from_name_and_value(name: &str, value: Value) -> Self {
        match name {
            Self::UPDATE => Self::parse_known(name, value, ActionInput::Update),
            Self::SAVE => Self::parse_known(name, value, ActionInput::Save),
            _ => ActionInput::Unknown {
                name: name.to_string(),
                input: value,
            },
        }
    }

    fn parse_known<T>(name: &str, value: Value, wrap: fn(T) -> Self) -> Self
    where
        T: serde::de::DeserializeOwned,
    {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(input) => wrap(input),
            Err(e) => ActionInput::Malformed {
                name: name.to_string(),
                input: value,
                reason: e.to_string(),
            },
        }
    }
}

/// An action the assistant asked for, with the model's call id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub id: String,
    pub input: ActionInput,
}

impl ActionRequest {
    pub fn new(id: impl Into<String>, input: ActionInput) -> Self {
        Self {
            id: id.into(),
            input,
        }
    }

    pub fn name(&self) -> &str {
        self.input.action_name()
    }
}

// ============================================================================
// Tool Results
// ============================================================================

/// What a successful action did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionEffect {
    DocumentUpdated,
    DocumentSaved { path: PathBuf },
}

/// Structured outcome of an executed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(ActionEffect),
    Failure { cause: String },
}

/// Outcome record appended to history after an action executes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub action_id: String,
    pub action_name: String,
    pub text: String,
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn success(
        action_id: impl Into<String>,
        action_name: impl Into<String>,
        text: impl Into<String>,
        effect: ActionEffect,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            action_name: action_name.into(),
            text: text.into(),
            outcome: ToolOutcome::Success(effect),
        }
    }

    pub fn failure(
        action_id: impl Into<String>,
        action_name: impl Into<String>,
        text: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            action_name: action_name.into(),
            text: text.into(),
            outcome: ToolOutcome::Failure {
                cause: cause.into(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Failure { .. })
    }

    /// Path written by a successful save, if this result is one
    pub fn saved_path(&self) -> Option<&PathBuf> {
        match &self.outcome {
            ToolOutcome::Success(ActionEffect::DocumentSaved { path }) => Some(path),
            _ => None,
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Assistant reply: free text plus any requested actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub text: String,
    pub actions: Vec<ActionRequest>,
}

impl AssistantMessage {
    pub fn new(text: impl Into<String>, actions: Vec<ActionRequest>) -> Self {
        Self {
            text: text.into(),
            actions,
        }
    }

    /// No text and no actions
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.actions.is_empty()
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(ActionRequest::name).collect()
    }
}

/// One entry of the conversation history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User { text: String },
    Assistant(AssistantMessage),
    Tool(ToolResult),
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message::User { text: text.into() }
    }

    pub fn as_tool_result(&self) -> Option<&ToolResult> {
        match self {
            Message::Tool(result) => Some(result),
            _ => None,
        }
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// History plus the current document text.
///
/// `document` holds the argument of the most recent successful `update`, or
/// the empty string. Only the dispatcher's update handler replaces it; the
/// history only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    history: Vec<Message>,
    document: String,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// Number of user turns taken so far
    pub fn turn_count(&self) -> usize {
        self.history
            .iter()
            .filter(|m| matches!(m, Message::User { .. }))
            .count()
    }

    /// Consume the state, appending one message
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.history.push(message);
        self
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.history.push(message);
    }

    pub(crate) fn replace_document(&mut self, content: String) {
        self.document = content;
    }

    /// Most recent successful save target, if any
    pub fn last_saved_path(&self) -> Option<&PathBuf> {
        self.history
            .iter()
            .rev()
            .filter_map(Message::as_tool_result)
            .find_map(ToolResult::saved_path)
    }
}

// ============================================================================
// Session Phase
// ============================================================================

/// Orchestrator phase. `AwaitingTurn` and `Dispatching` are the RUNNING
/// sub-phases; `Terminated` and `Failed` are absorbing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Next step is a Turn Executor pass
    #[default]
    AwaitingTurn,

    /// Assistant replied; its actions are being dispatched
    Dispatching { actions: Vec<ActionRequest> },

    /// A successful save was observed
    Terminated { document: String },

    /// Session ended abnormally (model or input failure)
    Failed { message: String },
}

impl SessionPhase {
    /// Check if this is a terminal state (cannot transition out)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionPhase::Terminated { .. } | SessionPhase::Failed { .. }
        )
    }

    pub fn is_running(&self) -> bool {
        !self.is_terminal()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::AwaitingTurn => "awaiting_turn",
            SessionPhase::Dispatching { .. } => "dispatching",
            SessionPhase::Terminated { .. } => "terminated",
            SessionPhase::Failed { .. } => "failed",
        }
    }
}
