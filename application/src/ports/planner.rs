//! Planner client port
//!
//! A stateless request/response wrapper around a remote completion service.
//! All conversational state lives in the [`Transcript`] passed on each call.

use async_trait::async_trait;
use docent_domain::{PlannerTurn, ToolDefinition, Transcript};
use thiserror::Error;

/// Errors that can occur during a planning call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    /// Network or remote-service fault
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Planner request timed out")]
    Timeout,

    /// The service refused the request (non-retryable 4xx)
    #[error("Planner rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The service answered, but not with an answer or a tool call
    #[error("Malformed planner response: {0}")]
    MalformedResponse(String),
}

impl PlannerError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlannerError::Transport(_) | PlannerError::Timeout)
    }
}

/// Port for the language-model planner
#[async_trait]
pub trait PlannerClient: Send + Sync {
    /// Ask for the next move given the transcript so far.
    ///
    /// `tools` may be empty, in which case the planner must answer in text.
    async fn complete(
        &self,
        transcript: &Transcript,
        tools: &[ToolDefinition],
    ) -> Result<PlannerTurn, PlannerError>;
}
