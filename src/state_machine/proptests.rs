//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::oracle::{Decision, TerminationStrategy};
use proptest::prelude::*;
use std::path::PathBuf;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_action_input() -> impl Strategy<Value = ActionInput> {
    prop_oneof![
        "[a-zA-Z ,.]{0,40}".prop_map(|content| ActionInput::Update(UpdateInput { content })),
        "[a-z_]{1,12}".prop_map(|filename| ActionInput::Save(SaveInput { filename })),
        "[a-z]{3,10}".prop_map(|name| ActionInput::Unknown {
            name,
            input: serde_json::json!({}),
        }),
    ]
}

fn arb_action_request() -> impl Strategy<Value = ActionRequest> {
    ("[a-z0-9]{8}", arb_action_input()).prop_map(|(id, input)| ActionRequest::new(id, input))
}

fn arb_assistant_message() -> impl Strategy<Value = AssistantMessage> {
    (
        "[a-zA-Z ]{0,30}",
        proptest::collection::vec(arb_action_request(), 0..4),
    )
        .prop_map(|(text, actions)| AssistantMessage::new(text, actions))
}

fn arb_tool_result() -> impl Strategy<Value = ToolResult> {
    prop_oneof![
        "[a-z0-9]{8}".prop_map(|id| ToolResult::success(
            id,
            "update",
            "Document has been updated successfully.",
            ActionEffect::DocumentUpdated
        )),
        ("[a-z0-9]{8}", "[a-z]{1,8}").prop_map(|(id, name)| ToolResult::success(
            id,
            "save",
            format!("Document has been saved successfully to '{name}.txt'."),
            ActionEffect::DocumentSaved {
                path: PathBuf::from(format!("{name}.txt"))
            }
        )),
        ("[a-z0-9]{8}", "[a-zA-Z ]{1,20}").prop_map(|(id, cause)| ToolResult::failure(
            id,
            "save",
            format!("Error saving document: {cause}"),
            cause
        )),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_assistant_message().prop_map(|message| Event::TurnComplete { message }),
        "[a-zA-Z ]{1,30}".prop_map(|message| Event::TurnFailed { message }),
        proptest::collection::vec(arb_tool_result(), 0..4)
            .prop_map(|results| Event::DispatchComplete { results }),
        "[a-zA-Z ']{1,30}".prop_map(|reason| Event::DispatchRejected { reason }),
    ]
}

fn arb_running_phase() -> impl Strategy<Value = SessionPhase> {
    prop_oneof![
        Just(SessionPhase::AwaitingTurn),
        proptest::collection::vec(arb_action_request(), 0..3)
            .prop_map(|actions| SessionPhase::Dispatching { actions }),
    ]
}

fn arb_terminal_phase() -> impl Strategy<Value = SessionPhase> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(|document| SessionPhase::Terminated { document }),
        "[a-zA-Z ]{1,20}".prop_map(|message| SessionPhase::Failed { message }),
    ]
}

fn arb_conversation() -> impl Strategy<Value = ConversationState> {
    proptest::collection::vec(arb_tool_result(), 0..5).prop_map(|results| {
        results
            .into_iter()
            .fold(ConversationState::new(), |state, r| {
                state.with_message(Message::Tool(r))
            })
    })
}

fn arb_strategy() -> impl Strategy<Value = TerminationStrategy> {
    prop_oneof![
        Just(TerminationStrategy::Structured),
        Just(TerminationStrategy::Substring),
    ]
}

fn is_progress(effect: &Effect) -> bool {
    matches!(
        effect,
        Effect::ExecuteTurn | Effect::Dispatch { .. } | Effect::Finish { .. }
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Absorbing phases reject every event
    #[test]
    fn prop_terminal_phases_reject_everything(
        phase in arb_terminal_phase(),
        conv in arb_conversation(),
        strategy in arb_strategy(),
        event in arb_event(),
    ) {
        let result = transition(&phase, &SessionContext::new(&conv, strategy), event);
        let is_session_ended = matches!(result, Err(TransitionError::SessionEnded { .. }));
        prop_assert!(is_session_ended);
    }

    /// A running step either schedules exactly one next step or fails the session
    #[test]
    fn prop_one_progress_effect_per_step(
        phase in arb_running_phase(),
        conv in arb_conversation(),
        strategy in arb_strategy(),
        event in arb_event(),
    ) {
        if let Ok(result) = transition(&phase, &SessionContext::new(&conv, strategy), event) {
            let progress = result.effects.iter().filter(|e| is_progress(e)).count();
            if matches!(result.new_state, SessionPhase::Failed { .. }) {
                prop_assert_eq!(progress, 0);
            } else {
                prop_assert_eq!(progress, 1);
            }
        }
    }

    /// After dispatch the session stops exactly when the oracle says so
    #[test]
    fn prop_dispatch_outcome_follows_oracle(
        conv in arb_conversation(),
        strategy in arb_strategy(),
        results in proptest::collection::vec(arb_tool_result(), 0..3),
    ) {
        let result = transition(
            &SessionPhase::Dispatching { actions: vec![] },
            &SessionContext::new(&conv, strategy),
            Event::DispatchComplete { results },
        ).unwrap();

        match strategy.should_continue(conv.history()) {
            Decision::Stop => {
                prop_assert_eq!(
                    result.new_state,
                    SessionPhase::Terminated { document: conv.document().to_string() }
                );
            }
            Decision::Continue => {
                prop_assert_eq!(result.new_state, SessionPhase::AwaitingTurn);
            }
        }
    }

    /// Every requested action is handed to dispatch, in order
    #[test]
    fn prop_turn_dispatches_all_actions(message in arb_assistant_message()) {
        let conv = ConversationState::new();
        let result = transition(
            &SessionPhase::AwaitingTurn,
            &SessionContext::new(&conv, TerminationStrategy::default()),
            Event::TurnComplete { message: message.clone() },
        ).unwrap();

        prop_assert_eq!(
            result.effects.last(),
            Some(&Effect::dispatch(message.actions.clone()))
        );
        prop_assert_eq!(
            result.new_state,
            SessionPhase::Dispatching { actions: message.actions }
        );
    }

    /// A rejected dispatch never ends the session
    #[test]
    fn prop_rejection_keeps_running(
        phase in proptest::collection::vec(arb_action_request(), 0..3)
            .prop_map(|actions| SessionPhase::Dispatching { actions }),
        conv in arb_conversation(),
        reason in "[a-zA-Z ']{1,30}",
    ) {
        let result = transition(
            &phase,
            &SessionContext::new(&conv, TerminationStrategy::default()),
            Event::DispatchRejected { reason },
        ).unwrap();

        prop_assert!(result.new_state.is_running());
        prop_assert_eq!(result.effects.last(), Some(&Effect::ExecuteTurn));
    }
}
