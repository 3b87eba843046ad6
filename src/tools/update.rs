//! Update tool - replaces the whole document

use super::{Tool, ToolContext};
use crate::state_machine::{ActionEffect, ActionInput, ConversationState, ToolResult, UpdateInput};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const UPDATE_CONFIRMATION: &str = "Document has been updated successfully.";

/// Replaces the document with the given content. Cannot fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateTool;

#[async_trait]
impl Tool for UpdateTool {
    type Input = UpdateInput;

    fn name(&self) -> &'static str {
        ActionInput::UPDATE
    }

    fn description(&self) -> String {
        "Updates the document with the provided content. Always pass the complete updated document, not a diff.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["content"],
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The full new document text"
                }
            }
        })
    }

    async fn run(
        &self,
        mut state: ConversationState,
        input: &UpdateInput,
        ctx: &ToolContext<'_>,
    ) -> (ConversationState, ToolResult) {
        state.replace_document(input.content.clone());
        let result = ToolResult::success(
            ctx.action_id,
            self.name(),
            UPDATE_CONFIRMATION,
            ActionEffect::DocumentUpdated,
        );
        (state, result)
    }
}
