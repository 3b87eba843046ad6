//! Core session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{
    ActionEffect, ActionInput, ActionRequest, AssistantMessage, ConversationState, Message,
    SaveInput, SessionPhase, ToolResult, UpdateInput,
};
pub use transition::{transition, SessionContext, TransitionError};
