//! Document actions the assistant may request, and their dispatch
//!
//! The action set is closed: `update` and `save`. Requests are parsed into
//! `ActionInput` up front, so dispatch is an exhaustive match and anything
//! outside the set is rejected before a single action runs.

mod save;
mod update;

pub use save::SaveTool;
pub use update::UpdateTool;

use crate::llm::ToolDefinition;
use crate::runtime::Persistence;
use crate::state_machine::{ActionInput, ActionRequest, ConversationState, Message, ToolResult};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Why a turn's dispatch was aborted. No action of the turn has run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown action '{0}'")]
    UnknownAction(String),
    #[error("Invalid arguments for '{action}': {reason}")]
    InvalidArguments { action: String, reason: String },
}

/// Per-call context handed to a tool
pub struct ToolContext<'a> {
    /// The model's call id, echoed on the result
    pub action_id: &'a str,
    pub persistence: &'a dyn Persistence,
}

/// A registry entry: name, argument shape and handler.
///
/// Handlers take the state by value and hand back the next one together with
/// the result text.
#[async_trait]
pub trait Tool: Send + Sync {
    type Input: Send + Sync;

    /// Tool name
    fn name(&self) -> &'static str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    async fn run(
        &self,
        state: ConversationState,
        input: &Self::Input,
        ctx: &ToolContext<'_>,
    ) -> (ConversationState, ToolResult);
}

fn definition<T: Tool>(tool: &T) -> ToolDefinition {
    ToolDefinition {
        name: tool.name().to_string(),
        description: tool.description(),
        input_schema: tool.input_schema(),
    }
}

/// The fixed set of actions for a session. Not mutated at runtime.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    update: UpdateTool,
    save: SaveTool,
}

impl ToolRegistry {
    pub fn standard() -> Self {
        Self::default()
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![definition(&self.update), definition(&self.save)]
    }

    /// Reject requests outside the registry or with unusable arguments
    pub fn validate(&self, actions: &[ActionRequest]) -> Result<(), DispatchError> {
        for action in actions {
            match &action.input {
                ActionInput::Update(_) | ActionInput::Save(_) => {}
                ActionInput::Unknown { name, .. } => {
                    return Err(DispatchError::UnknownAction(name.clone()));
                }
                ActionInput::Malformed { name, reason, .. } => {
                    return Err(DispatchError::InvalidArguments {
                        action: name.clone(),
                        reason: reason.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn execute(
        &self,
        state: ConversationState,
        action: &ActionRequest,
        persistence: &dyn Persistence,
    ) -> Result<(ConversationState, ToolResult), DispatchError> {
        let ctx = ToolContext {
            action_id: &action.id,
            persistence,
        };
        match &action.input {
            ActionInput::Update(input) => Ok(self.update.run(state, input, &ctx).await),
            ActionInput::Save(input) => Ok(self.save.run(state, input, &ctx).await),
            ActionInput::Unknown { name, .. } => Err(DispatchError::UnknownAction(name.clone())),
            ActionInput::Malformed { name, reason, .. } => Err(DispatchError::InvalidArguments {
                action: name.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Executes requested actions, in order, against the registry
pub struct Dispatcher<P> {
    registry: ToolRegistry,
    persistence: P,
}

impl<P: Persistence> Dispatcher<P> {
    pub fn new(registry: ToolRegistry, persistence: P) -> Self {
        Self {
            registry,
            persistence,
        }
    }

    /// Run `actions` in order and append every result to the history.
    ///
    /// Returns a new state; `state` is left untouched, so a rejected dispatch
    /// leaves the caller's state exactly as it was.
    pub async fn dispatch(
        &self,
        state: &ConversationState,
        actions: &[ActionRequest],
    ) -> Result<(ConversationState, Vec<ToolResult>), DispatchError> {
        self.registry.validate(actions).inspect_err(|e| {
            tracing::warn!(error = %e, "Dispatch rejected");
        })?;

        let mut next = state.clone();
        let mut results = Vec::with_capacity(actions.len());

        for action in actions {
            let (updated, result) = self
                .registry
                .execute(next, action, &self.persistence)
                .await?;
            tracing::info!(
                action = %action.name(),
                action_id = %action.id,
                is_error = result.is_error(),
                "Action executed"
            );
            next = updated;
            next.push(Message::Tool(result.clone()));
            results.push(result);
        }

        Ok((next, results))
    }
}
