//! Session runtime executor

use super::traits::{InputSource, LlmClient, OutputSink, Persistence};
use super::turn::{execute_turn, TurnContext, TurnError};
use super::SessionConfig;

use crate::llm::ToolDefinition;
use crate::state_machine::{
    transition, ConversationState, Effect, Event, SessionContext, SessionPhase, TransitionError,
};
use crate::tools::{Dispatcher, ToolRegistry};
use std::collections::VecDeque;
use std::path::PathBuf;
use thiserror::Error;
use tracing::Instrument;

const START_BANNER: &str = "\n ===== DRAFTER =====";
const FINISH_BANNER: &str = "\n ===== DRAFTER FINISHED =====";

/// How a session that reached STOP ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub document: String,
    /// Target of the save that stopped the session, when it was structured
    pub saved_to: Option<PathBuf>,
    pub turns: usize,
}

/// Abnormal end of a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("session stopped unexpectedly in phase {0}")]
    Stalled(&'static str),
}

/// Drives one drafting session to completion against any model, input,
/// output and persistence implementation
pub struct SessionRuntime<L, I, O, P> {
    session_id: String,
    config: SessionConfig,
    phase: SessionPhase,
    conversation: ConversationState,
    llm: L,
    input: I,
    output: O,
    dispatcher: Dispatcher<P>,
    tools: Vec<ToolDefinition>,
    /// Cause of the most recent failed turn, surfaced once the phase is `Failed`
    failure: Option<TurnError>,
}

impl<L, I, O, P> SessionRuntime<L, I, O, P>
where
    L: LlmClient,
    I: InputSource,
    O: OutputSink,
    P: Persistence,
{
    pub fn new(config: SessionConfig, llm: L, input: I, output: O, persistence: P) -> Self {
        let registry = ToolRegistry::standard();
        let tools = registry.definitions();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            config,
            phase: SessionPhase::default(),
            conversation: ConversationState::new(),
            llm,
            input,
            output,
            dispatcher: Dispatcher::new(registry, persistence),
            tools,
            failure: None,
        }
    }

    /// Run until the oracle says STOP or a turn fails
    pub async fn run(mut self) -> Result<SessionOutcome, SessionError> {
        let span = tracing::info_span!(
            "session",
            session_id = %self.session_id,
            model = %self.llm.model_id(),
        );
        self.drive().instrument(span.clone()).await?;

        let _entered = span.enter();
        self.finish()
    }

    async fn drive(&mut self) -> Result<(), SessionError> {
        tracing::info!(
            termination = self.config.termination.as_str(),
            "Starting session"
        );
        self.output.emit(START_BANNER);

        let mut queue = VecDeque::from([Effect::ExecuteTurn]);
        while let Some(effect) = queue.pop_front() {
            let Some(event) = self.execute_effect(effect).await else {
                continue;
            };
            queue.extend(self.apply(event)?);
        }

        if self.phase.is_running() {
            tracing::warn!(phase = self.phase.name(), "No effects left while session is running");
        }
        Ok(())
    }

    fn apply(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let event_name = event.name();
        let context = SessionContext::new(&self.conversation, self.config.termination);
        let result = transition(&self.phase, &context, event)?;

        tracing::debug!(
            from = self.phase.name(),
            to = result.new_state.name(),
            event = event_name,
            effects = result.effects.len(),
            "Transition"
        );
        self.phase = result.new_state;
        Ok(result.effects)
    }

    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::ExecuteTurn => {
                let turn = self.conversation.turn_count() + 1;
                let ctx = TurnContext {
                    llm: &self.llm,
                    output: &self.output,
                    prompt: &self.config.prompt,
                    tools: &self.tools,
                    kickoff: self.config.kickoff.as_deref(),
                    max_tokens: self.config.max_tokens,
                };

                match execute_turn(self.conversation.clone(), &mut self.input, &ctx).await {
                    Ok((state, message)) => {
                        tracing::info!(
                            turn,
                            actions = ?message.action_names(),
                            "Turn complete"
                        );
                        self.conversation = state;
                        Some(Event::TurnComplete { message })
                    }
                    Err(e) => {
                        tracing::error!(turn, error = %e, "Turn failed");
                        let message = e.to_string();
                        self.failure = Some(e);
                        Some(Event::TurnFailed { message })
                    }
                }
            }

            Effect::Dispatch { actions } => {
                match self.dispatcher.dispatch(&self.conversation, &actions).await {
                    Ok((state, results)) => {
                        self.conversation = state;
                        Some(Event::DispatchComplete { results })
                    }
                    Err(e) => Some(Event::DispatchRejected {
                        reason: e.to_string(),
                    }),
                }
            }

            Effect::Emit { text } => {
                self.output.emit(&text);
                None
            }

            Effect::Warn { message } => {
                tracing::warn!(%message, "Session warning");
                self.output.emit(&format!("\nWARNING: {message}"));
                None
            }

            Effect::Finish { document } => {
                self.output.emit(FINISH_BANNER);
                self.output.emit(&format!("\nFinal document:\n{document}"));
                None
            }
        }
    }

    fn finish(mut self) -> Result<SessionOutcome, SessionError> {
        match std::mem::take(&mut self.phase) {
            SessionPhase::Terminated { document } => {
                let outcome = SessionOutcome {
                    document,
                    saved_to: self.conversation.last_saved_path().cloned(),
                    turns: self.conversation.turn_count(),
                };
                tracing::info!(
                    turns = outcome.turns,
                    saved_to = ?outcome.saved_to,
                    "Session finished"
                );
                Ok(outcome)
            }
            SessionPhase::Failed { .. } => match self.failure.take() {
                Some(e) => Err(SessionError::Turn(e)),
                None => Err(SessionError::Stalled("failed")),
            },
            phase => Err(SessionError::Stalled(phase.name())),
        }
    }
}
