//! Port for support analytics.
//!
//! Records what the agent did and how each question was resolved. Kept
//! separate from `tracing`: tracing carries diagnostics, this port carries
//! machine-readable usage records.

use docent_domain::ToolResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a question was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The agent produced an answer
    Answered,
    /// The question was judged off-topic
    Irrelevant,
    /// The agent gave up; the user should be sent to the community
    CommunityEscalation,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Answered => "answered",
            Resolution::Irrelevant => "irrelevant",
            Resolution::CommunityEscalation => "community_escalation",
        }
    }
}

/// Sink for analytics records.
///
/// Methods are synchronous and non-fallible; sink failures never disturb a run.
pub trait AnalyticsSink: Send + Sync {
    /// One executed tool call
    fn on_tool_call(
        &self,
        _run_id: u64,
        _tool_name: &str,
        _arguments: &Map<String, Value>,
        _result: &ToolResult,
    ) {
    }

    /// The run's final resolution (not reported for cancelled runs)
    fn on_resolution(&self, _run_id: u64, _question: &str, _resolution: Resolution) {}
}

/// No-op implementation for tests and when analytics is disabled.
pub struct NoAnalytics;

impl AnalyticsSink for NoAnalytics {}
