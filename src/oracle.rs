//! Termination oracle
//!
//! Decides from the history alone whether the session keeps going. Pure and
//! stateless: no flag outside the history is consulted, so a fresh session
//! always starts at `Continue`.

use crate::state_machine::{Message, ToolResult};
use std::str::FromStr;

/// Outcome of a termination check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop,
}

/// How a tool result is recognised as a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminationStrategy {
    /// Match on the structured outcome (`DocumentSaved`)
    #[default]
    Structured,
    /// Case-insensitive match of both "saved" and "document" in the result text
    Substring,
}

impl TerminationStrategy {
    pub fn should_continue(self, history: &[Message]) -> Decision {
        match self {
            TerminationStrategy::Structured => should_continue(history),
            TerminationStrategy::Substring => scan(history, self),
        }
    }

    pub fn is_save_confirmation(self, result: &ToolResult) -> bool {
        match self {
            TerminationStrategy::Structured => result.saved_path().is_some(),
            TerminationStrategy::Substring => {
                let text = result.text.to_lowercase();
                text.contains("saved") && text.contains("document")
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TerminationStrategy::Structured => "structured",
            TerminationStrategy::Substring => "substring",
        }
    }
}

impl FromStr for TerminationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(TerminationStrategy::Structured),
            "substring" => Ok(TerminationStrategy::Substring),
            other => Err(format!(
                "unknown termination strategy '{other}' (expected 'structured' or 'substring')"
            )),
        }
    }
}

/// STOP once any action in the history is a successful save
pub fn should_continue(history: &[Message]) -> Decision {
    scan(history, TerminationStrategy::Structured)
}

/// Scan history newest first; stop at the first matching tool result
fn scan(history: &[Message], strategy: TerminationStrategy) -> Decision {
    let stop = history
        .iter()
        .rev()
        .filter_map(Message::as_tool_result)
        .any(|result| strategy.is_save_confirmation(result));

    if stop {
        Decision::Stop
    } else {
        Decision::Continue
    }
}
