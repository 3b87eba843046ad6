//! Pure state transition function
//!
//! Given the same phase, context and event this always produces the same
//! next phase and effect list. No I/O happens here.

use super::{ConversationState, Effect, Event, SessionPhase};
use crate::oracle::{Decision, TerminationStrategy};
use thiserror::Error;

/// Read-only view the transition function may consult
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    pub conversation: &'a ConversationState,
    pub termination: TerminationStrategy,
}

impl<'a> SessionContext<'a> {
    pub fn new(conversation: &'a ConversationState, termination: TerminationStrategy) -> Self {
        Self {
            conversation,
            termination,
        }
    }
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionPhase,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionPhase) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Session has ended ({phase}), cannot handle {event}")]
    SessionEnded {
        phase: &'static str,
        event: &'static str,
    },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &SessionPhase,
    context: &SessionContext<'_>,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    if state.is_terminal() {
        return Err(TransitionError::SessionEnded {
            phase: state.name(),
            event: event.name(),
        });
    }

    match (state, event) {
        // ============================================================
        // Turn results
        // ============================================================

        // AwaitingTurn + TurnComplete -> Dispatching, even with no actions
        (SessionPhase::AwaitingTurn, Event::TurnComplete { message }) => {
            let mut result = TransitionResult::new(SessionPhase::Dispatching {
                actions: message.actions.clone(),
            });

            if message.is_empty() {
                result = result.with_effect(Effect::warn("Model returned an empty response"));
            }
            if !message.actions.is_empty() {
                result = result.with_effect(Effect::emit(format!(
                    "USING TOOLS: [{}]",
                    message.action_names().join(", ")
                )));
            }

            Ok(result.with_effect(Effect::dispatch(message.actions)))
        }

        (SessionPhase::AwaitingTurn, Event::TurnFailed { message }) => {
            Ok(TransitionResult::new(SessionPhase::Failed { message }))
        }

        // ============================================================
        // Dispatch results
        // ============================================================

        // Results are already in the history; the oracle reads it from context
        (SessionPhase::Dispatching { .. }, Event::DispatchComplete { results }) => {
            let result = TransitionResult::new(SessionPhase::AwaitingTurn).with_effects(
                results
                    .iter()
                    .map(|r| Effect::emit(format!("TOOL RESULT: {}", r.text))),
            );

            match context
                .termination
                .should_continue(context.conversation.history())
            {
                Decision::Continue => Ok(result.with_effect(Effect::ExecuteTurn)),
                Decision::Stop => {
                    let document = context.conversation.document().to_string();
                    Ok(TransitionResult {
                        new_state: SessionPhase::Terminated {
                            document: document.clone(),
                        },
                        effects: result.effects,
                    }
                    .with_effect(Effect::Finish { document }))
                }
            }
        }

        // Nothing ran, nothing was appended; the model gets another turn
        (SessionPhase::Dispatching { .. }, Event::DispatchRejected { reason }) => {
            Ok(TransitionResult::new(SessionPhase::AwaitingTurn)
                .with_effect(Effect::emit(format!("TOOL ERROR: {reason}")))
                .with_effect(Effect::ExecuteTurn))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {}",
            state.name(),
            event.name()
        ))),
    }
}
