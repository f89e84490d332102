//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agent;
mod corpus;
mod output;
mod planner;

pub use agent::FileAgentConfig;
pub use corpus::{FileAnalyticsConfig, FileCorpusConfig};
pub use output::FileOutputConfig;
pub use planner::FilePlannerConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("agent.max_steps cannot be 0")]
    ZeroMaxSteps,

    #[error("{0} cannot be 0")]
    InvalidTimeout(&'static str),

    #[error("planner.model cannot be empty")]
    EmptyModelName,

    #[error("planner.temperature must be between 0 and 2, got {0}")]
    InvalidTemperature(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub planner: FilePlannerConfig,
    pub agent: FileAgentConfig,
    pub corpus: FileCorpusConfig,
    pub analytics: FileAnalyticsConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Reject values no run could work with
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.agent.max_steps == 0 {
            return Err(ConfigValidationError::ZeroMaxSteps);
        }
        if self.planner.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout("planner.timeout_seconds"));
        }
        if self.agent.tool_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout(
                "agent.tool_timeout_seconds",
            ));
        }
        if self.planner.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if !(0.0..=2.0).contains(&self.planner.temperature) {
            return Err(ConfigValidationError::InvalidTemperature(
                self.planner.temperature.to_string(),
            ));
        }
        Ok(())
    }
}
