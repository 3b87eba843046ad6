//! Events that can occur in a session

use super::state::{AssistantMessage, ToolResult};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Turn events
    TurnComplete {
        message: AssistantMessage,
    },
    TurnFailed {
        message: String,
    },

    // Dispatch events
    /// All results are already appended to the conversation history
    DispatchComplete {
        results: Vec<ToolResult>,
    },
    DispatchRejected {
        reason: String,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::TurnComplete { .. } => "turn_complete",
            Event::TurnFailed { .. } => "turn_failed",
            Event::DispatchComplete { .. } => "dispatch_complete",
            Event::DispatchRejected { .. } => "dispatch_rejected",
        }
    }
}
