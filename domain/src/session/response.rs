//! Planner response type.
//!
//! Each planning call yields exactly one of two things:
//!
//! ```text
//! complete(transcript, tools) ─┬─▶ Answer { text }     (terminal)
//!                              └─▶ ToolCall(call)      (execute, then plan again)
//! ```

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// One planning decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannerTurn {
    /// Final text answer
    Answer { text: String },
    /// Request to run exactly one tool
    ToolCall(ToolCall),
}

impl PlannerTurn {
    pub fn answer(text: impl Into<String>) -> Self {
        PlannerTurn::Answer { text: text.into() }
    }

    pub fn tool(call: ToolCall) -> Self {
        PlannerTurn::ToolCall(call)
    }

    pub fn as_answer(&self) -> Option<&str> {
        match self {
            PlannerTurn::Answer { text } => Some(text),
            PlannerTurn::ToolCall(_) => None,
        }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            PlannerTurn::ToolCall(call) => Some(call),
            PlannerTurn::Answer { .. } => None,
        }
    }
}
