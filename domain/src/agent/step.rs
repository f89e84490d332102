//! Observable progress of one agent run.

use crate::tool::entities::ToolCall;
use crate::tool::value_objects::ToolResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of link buttons kept on a response
pub const MAX_LINK_BUTTONS: usize = 3;

/// A suggested follow-up link attached to an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl LinkButton {
    pub fn new(label: impl Into<String>, url: Option<String>) -> Self {
        Self {
            label: label.into(),
            url,
        }
    }

    /// Only buttons that carry a URL can be shown as links
    pub fn is_renderable(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// Why a run ended with an `error` step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    StepBudgetExceeded,
    PlannerUnavailable,
    MalformedResponse,
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::StepBudgetExceeded => "step_budget_exceeded",
            FailureKind::PlannerUnavailable => "planner_unavailable",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user-visible outcome of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// A grounded answer was produced
    Answered,
    /// The question was outside the documented domain
    Ignored,
    /// The run aborted
    Failed,
}

/// One observable unit of progress (tagged by `type` when serialized)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    ToolCall {
        tool_name: String,
        arguments: Map<String, Value>,
        result: ToolResult,
        label: String,
        emoji: String,
    },
    Irrelevant {
        reason: String,
    },
    Response {
        text: String,
        #[serde(default)]
        buttons: Vec<LinkButton>,
    },
    Error {
        kind: FailureKind,
        message: String,
    },
}

impl AgentStep {
    pub fn tool_call(call: &ToolCall, result: ToolResult) -> Self {
        AgentStep::ToolCall {
            tool_name: result.tool_name.clone(),
            arguments: call.arguments.clone(),
            label: crate::tool::catalog::tool_label(call),
            emoji: crate::tool::catalog::tool_emoji(&result.tool_name).to_string(),
            result,
        }
    }

    pub fn irrelevant(reason: impl Into<String>) -> Self {
        AgentStep::Irrelevant {
            reason: reason.into(),
        }
    }

    pub fn response(text: impl Into<String>, buttons: Vec<LinkButton>) -> Self {
        AgentStep::Response {
            text: text.into(),
            buttons,
        }
    }

    pub fn error(kind: FailureKind, message: impl Into<String>) -> Self {
        AgentStep::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AgentStep::ToolCall { .. })
    }

    /// Outcome of a terminal step; `None` for `tool_call`
    pub fn outcome(&self) -> Option<RunOutcome> {
        match self {
            AgentStep::ToolCall { .. } => None,
            AgentStep::Irrelevant { .. } => Some(RunOutcome::Ignored),
            AgentStep::Response { .. } => Some(RunOutcome::Answered),
            AgentStep::Error { .. } => Some(RunOutcome::Failed),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            AgentStep::ToolCall { .. } => "tool_call",
            AgentStep::Irrelevant { .. } => "irrelevant",
            AgentStep::Response { .. } => "response",
            AgentStep::Error { .. } => "error",
        }
    }
}
