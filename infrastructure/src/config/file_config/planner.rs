//! Planner configuration from TOML (`[planner]` section)

use serde::{Deserialize, Serialize};

/// Raw planner configuration from TOML
///
/// # Example
///
/// ```toml
/// [planner]
/// endpoint = "https://openrouter.ai/api/v1/chat/completions"
/// model = "openai/gpt-5.1"
/// api_key_env = "OPENROUTER_API_KEY"
/// temperature = 0.3
/// timeout_seconds = 120
/// max_retries = 3
/// min_retry_delay_ms = 500
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePlannerConfig {
    /// Chat completions endpoint
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Retries for transport faults and timeouts
    pub max_retries: usize,
    pub min_retry_delay_ms: u64,
}

impl Default for FilePlannerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "openai/gpt-5.1".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            temperature: 0.3,
            timeout_seconds: 120,
            max_retries: 3,
            min_retry_delay_ms: 500,
        }
    }
}

impl FilePlannerConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}
