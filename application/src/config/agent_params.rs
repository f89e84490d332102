//! Agent loop parameters.
//!
//! [`AgentParams`] groups the static parameters that control the loop in
//! [`AnswerQuestionUseCase`](crate::use_cases::answer_question::AnswerQuestionUseCase).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentParams {
    /// Name of the documented product, used in prompts
    pub product_name: String,
    /// Maximum tool executions per run (the forced relevance gate counts).
    pub max_steps: usize,
    /// Most recent conversation turns included in the transcript.
    pub max_history_turns: usize,
    /// Run `check_relevance` before the first planning call.
    pub forced_relevance_gate: bool,
    /// Upper bound on a single tool execution.
    pub tool_timeout: Duration,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            product_name: "this product".to_string(),
            max_steps: 10,
            max_history_turns: 5,
            forced_relevance_gate: true,
            tool_timeout: Duration::from_secs(20),
        }
    }
}

impl AgentParams {
    // ==================== Builder Methods ====================

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_max_history_turns(mut self, max: usize) -> Self {
        self.max_history_turns = max;
        self
    }

    pub fn with_forced_relevance_gate(mut self, enabled: bool) -> Self {
        self.forced_relevance_gate = enabled;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }
}
