//! Turn executor
//!
//! One pass: take a user utterance, show the model the history plus the
//! current document, and record both sides of the exchange.

use super::traits::{InputError, InputSource, LlmClient, OutputSink};
use crate::llm::{ContentBlock, LlmError, LlmMessage, LlmRequest, LlmResponse, SystemContent, ToolDefinition};
use crate::state_machine::{ActionInput, ActionRequest, AssistantMessage, ConversationState, Message};
use crate::system_prompt::PromptTemplate;
use std::collections::HashSet;
use thiserror::Error;

/// Failure of a turn. Both kinds end the session.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("model invocation failed: {0}")]
    Model(#[from] LlmError),
}

/// Everything a turn reads besides the state and the input source
pub struct TurnContext<'a, L, O> {
    pub llm: &'a L,
    pub output: &'a O,
    pub prompt: &'a PromptTemplate,
    pub tools: &'a [ToolDefinition],
    pub kickoff: Option<&'a str>,
    pub max_tokens: Option<u32>,
}

/// Run one turn, returning the grown state and the assistant's reply
pub async fn execute_turn<L, I, O>(
    state: ConversationState,
    input: &mut I,
    ctx: &TurnContext<'_, L, O>,
) -> Result<(ConversationState, AssistantMessage), TurnError>
where
    L: LlmClient,
    I: InputSource + ?Sized,
    O: OutputSink,
{
    let system = ctx.prompt.render(state.document());

    let utterance = match ctx.kickoff {
        Some(kickoff) if state.history().is_empty() => kickoff.to_string(),
        _ => {
            let text = input.next_utterance().await?;
            ctx.output.emit(&format!("\nUSER: {text}"));
            text
        }
    };

    let state = state.with_message(Message::user(utterance));

    let request = LlmRequest {
        system: vec![SystemContent::new(system)],
        messages: history_to_llm_messages(state.history()),
        tools: ctx.tools.to_vec(),
        max_tokens: ctx.max_tokens,
    };

    let response = ctx.llm.complete(&request).await?;
    let message = assistant_message_from_response(&response);

    if message.text.trim().is_empty() {
        tracing::warn!(
            actions = message.actions.len(),
            "Assistant reply has no text"
        );
    } else {
        ctx.output.emit(&format!("\nAI: {}", message.text));
    }

    let state = state.with_message(Message::Assistant(message.clone()));
    Ok((state, message))
}

/// Convert a model response into typed action requests
pub fn assistant_message_from_response(response: &LlmResponse) -> AssistantMessage {
    let actions = response
        .tool_uses()
        .into_iter()
        .map(|(id, name, input)| {
            let id = if id.is_empty() {
                uuid::Uuid::new_v4().to_string()
            } else {
                id.to_string()
            };
            ActionRequest::new(id, ActionInput::from_name_and_value(name, input.clone()))
        })
        .collect();

    AssistantMessage::new(response.text(), actions)
}

/// Convert session history into model messages.
///
/// Consecutive tool results share one message. Action requests that never
/// got a result (their dispatch was rejected) are left out, since a tool call
/// without a matching result is not a valid history for the model.
pub fn history_to_llm_messages(history: &[Message]) -> Vec<LlmMessage> {
    let answered: HashSet<&str> = history
        .iter()
        .filter_map(Message::as_tool_result)
        .map(|r| r.action_id.as_str())
        .collect();

    let mut messages: Vec<LlmMessage> = Vec::with_capacity(history.len());
    let mut in_tool_batch = false;

    for message in history {
        match message {
            Message::User { text } => {
                messages.push(LlmMessage::user(vec![ContentBlock::text(text.clone())]));
                in_tool_batch = false;
            }
            Message::Assistant(reply) => {
                let mut content = Vec::with_capacity(reply.actions.len() + 1);
                if !reply.text.is_empty() {
                    content.push(ContentBlock::text(reply.text.clone()));
                }
                content.extend(
                    reply
                        .actions
                        .iter()
                        .filter(|a| answered.contains(a.id.as_str()))
                        .map(|a| ContentBlock::tool_use(&a.id, a.name(), a.input.to_value())),
                );
                messages.push(LlmMessage::assistant(content));
                in_tool_batch = false;
            }
            Message::Tool(result) => {
                let block =
                    ContentBlock::tool_result(&result.action_id, &result.text, result.is_error());
                match messages.last_mut() {
                    Some(last) if in_tool_batch => last.content.push(block),
                    _ => messages.push(LlmMessage::user(vec![block])),
                }
                in_tool_batch = true;
            }
        }
    }

    messages
}
