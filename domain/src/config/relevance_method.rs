//! Relevance classification method

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which classifier decides `check_relevance` when the planner gives no verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceMethod {
    /// Ask the planner with a narrow yes/no prompt
    #[default]
    Planner,
    /// Relevant iff a corpus search scores above a threshold
    Corpus,
}

impl RelevanceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelevanceMethod::Planner => "planner",
            RelevanceMethod::Corpus => "corpus",
        }
    }
}

impl FromStr for RelevanceMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planner" => Ok(RelevanceMethod::Planner),
            "corpus" => Ok(RelevanceMethod::Corpus),
            other => Err(format!(
                "unknown relevance method '{}' (expected 'planner' or 'corpus')",
                other
            )),
        }
    }
}

impl std::fmt::Display for RelevanceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
