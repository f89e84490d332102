//! OpenRouter planner client.
//!
//! Sends the transcript to an OpenAI-compatible chat completions endpoint
//! with the documentation tools attached, and reduces the reply to a single
//! [`PlannerTurn`].
//!
//! | HTTP outcome                  | Result                           |
//! |-------------------------------|----------------------------------|
//! | 2xx, decodable                | `Ok(PlannerTurn)`                |
//! | 2xx, undecodable              | `MalformedResponse`              |
//! | 408, 429, 5xx, network fault  | `Transport` (retried)            |
//! | request timeout               | `Timeout` (retried)              |
//! | other 4xx                     | `Rejected`                       |

use std::time::Duration;

use async_trait::async_trait;
use docent_application::ports::planner::{PlannerClient, PlannerError};
use docent_application::ports::tool_schema::ToolSchemaPort;
use docent_domain::util::truncate_with_ellipsis;
use docent_domain::{PlannerTurn, ToolDefinition, Transcript};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use super::retry::{RetryPolicy, retry_planner_call};
use super::types::{ChatRequest, ChatResponse, WireMessage};
use crate::tools::JsonSchemaToolConverter;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-5.1";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Maximum bytes of an error body kept in a [`PlannerError`]
const ERROR_BODY_MAX: usize = 500;

/// Connection settings for [`OpenRouterPlanner`]
#[derive(Debug, Clone)]
pub struct PlannerSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    /// Per-attempt request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
        }
    }
}

/// [`PlannerClient`] backed by an OpenAI-compatible HTTP API.
pub struct OpenRouterPlanner {
    client: Client,
    settings: PlannerSettings,
    schema: JsonSchemaToolConverter,
}

impl OpenRouterPlanner {
    pub fn new(settings: PlannerSettings) -> Result<Self, PlannerError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| PlannerError::Transport(e.to_string()))?;

        info!(endpoint = %settings.endpoint, model = %settings.model, "Planner client ready");
        Ok(Self {
            client,
            settings,
            schema: JsonSchemaToolConverter,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn build_request(&self, transcript: &Transcript, tools: &[ToolDefinition]) -> ChatRequest {
        let has_tools = !tools.is_empty();
        ChatRequest {
            model: self.settings.model.clone(),
            messages: transcript.messages().iter().map(WireMessage::from).collect(),
            temperature: self.settings.temperature,
            tools: has_tools.then(|| self.schema.tools_schema(tools)),
            tool_choice: has_tools.then_some("auto"),
        }
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<PlannerTurn, PlannerError> {
        let mut builder = self
            .client
            .post(&self.settings.endpoint)
            .header("X-Title", "docent")
            .json(request);
        if let Some(key) = &self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::MalformedResponse(e.to_string()))?;
        parsed.into_turn()
    }
}

fn map_send_error(error: reqwest::Error) -> PlannerError {
    if error.is_timeout() {
        PlannerError::Timeout
    } else {
        PlannerError::Transport(error.to_string())
    }
}

/// Map a non-success status onto the planner error taxonomy
fn classify_status(status: StatusCode, body: &str) -> PlannerError {
    let body = truncate_with_ellipsis(body.trim(), ERROR_BODY_MAX);
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        PlannerError::Transport(format!("HTTP {}: {}", status.as_u16(), body))
    } else {
        PlannerError::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl PlannerClient for OpenRouterPlanner {
    async fn complete(
        &self,
        transcript: &Transcript,
        tools: &[ToolDefinition],
    ) -> Result<PlannerTurn, PlannerError> {
        let request = self.build_request(transcript, tools);
        debug!(
            messages = request.messages.len(),
            tools = tools.len(),
            "Sending planner request"
        );
        let request = &request;
        retry_planner_call(&self.settings.retry, move || self.send_once(request)).await
    }
}
