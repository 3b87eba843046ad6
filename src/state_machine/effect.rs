//! Effects produced by state transitions

use super::state::ActionRequest;

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Run one Turn Executor pass
    ExecuteTurn,

    /// Dispatch the requested actions against the registry
    Dispatch { actions: Vec<ActionRequest> },

    /// Write a transcript line to the output sink
    Emit { text: String },

    /// Soft warning, shown to the user and logged
    Warn { message: String },

    /// Session stopped; report the final document
    Finish { document: String },
}

impl Effect {
    pub fn emit(text: impl Into<String>) -> Self {
        Effect::Emit { text: text.into() }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Effect::Warn {
            message: message.into(),
        }
    }

    pub fn dispatch(actions: Vec<ActionRequest>) -> Self {
        Effect::Dispatch { actions }
    }
}
