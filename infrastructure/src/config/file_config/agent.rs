//! Agent configuration from TOML (`[agent]` section)

use docent_domain::RelevanceMethod;
use serde::{Deserialize, Serialize};

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// product_name = "Xenon"
/// max_steps = 10
/// max_history_turns = 5
/// search_limit = 5
/// forced_relevance_gate = true
/// relevance = "planner"            # "planner" or "corpus"
/// relevance_min_score = 1.0
/// tool_timeout_seconds = 20
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Product named in prompts
    pub product_name: String,
    /// Tool executions allowed per run
    pub max_steps: usize,
    /// Prior conversation turns sent to the planner
    pub max_history_turns: usize,
    /// Default `search_docs` result count
    pub search_limit: usize,
    /// Run `check_relevance` before the first planning call
    pub forced_relevance_gate: bool,
    pub relevance: RelevanceMethod,
    /// Minimum best-hit score for the corpus relevance classifier
    pub relevance_min_score: f64,
    pub tool_timeout_seconds: u64,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            product_name: "this product".to_string(),
            max_steps: 10,
            max_history_turns: 5,
            search_limit: 5,
            forced_relevance_gate: true,
            relevance: RelevanceMethod::default(),
            relevance_min_score: 1.0,
            tool_timeout_seconds: 20,
        }
    }
}
