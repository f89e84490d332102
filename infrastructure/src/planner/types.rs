//! Chat completions wire format (OpenAI-compatible, as served by OpenRouter).

use docent_application::ports::planner::PlannerError;
use docent_domain::{Message, PlannerTurn, Role, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: WireFunction,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunction {
    pub name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    pub arguments: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        let mut wire = WireMessage {
            role: message.role.as_str(),
            content: Some(WireContent::Text(message.content.clone())),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        };

        match message.role {
            Role::User if !message.images.is_empty() => {
                let mut parts = Vec::with_capacity(message.images.len() + 1);
                if !message.content.is_empty() {
                    parts.push(ContentPart::Text {
                        text: message.content.clone(),
                    });
                }
                parts.extend(message.images.iter().map(|img| ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: img.data_url(),
                    },
                }));
                wire.content = Some(WireContent::Parts(parts));
            }
            Role::Assistant => {
                if let Some(call) = &message.tool_call {
                    wire.content = None;
                    wire.tool_calls = Some(vec![WireToolCall {
                        id: call.native_id.clone(),
                        kind: function_type(),
                        function: WireFunction {
                            name: call.tool_name.clone(),
                            arguments: Value::Object(call.arguments.clone()).to_string(),
                        },
                    }]);
                }
            }
            Role::Tool => {
                wire.tool_call_id = message.tool_call_id.clone();
                wire.name = message.tool_name.clone();
            }
            _ => {}
        }

        wire
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

impl ChatResponse {
    /// Reduce the response to one planner move.
    ///
    /// A tool call wins over text. Only the first tool call is kept.
    pub fn into_turn(self) -> Result<PlannerTurn, PlannerError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::MalformedResponse("response has no choices".into()))?;

        let mut calls = choice.message.tool_calls.unwrap_or_default();
        if !calls.is_empty() {
            if calls.len() > 1 {
                warn!(
                    dropped = calls.len() - 1,
                    "Planner requested several tools at once, keeping the first"
                );
            }
            let call = calls.swap_remove(0);
            return Ok(PlannerTurn::tool(to_tool_call(call)));
        }

        match choice.message.content {
            Some(text) => Ok(PlannerTurn::answer(text)),
            None => Err(PlannerError::MalformedResponse(format!(
                "response has neither content nor tool calls (finish_reason: {})",
                choice.finish_reason.as_deref().unwrap_or("unknown")
            ))),
        }
    }
}

fn to_tool_call(call: WireToolCall) -> ToolCall {
    let arguments = parse_arguments(&call.function.name, &call.function.arguments);
    match call.id {
        Some(id) => ToolCall::from_native(id, call.function.name, arguments),
        None => {
            let mut tool_call = ToolCall::new(call.function.name);
            tool_call.arguments = arguments;
            tool_call
        }
    }
}

/// Undecodable or non-object arguments become an empty map; the validator
/// then reports what is missing.
fn parse_arguments(tool_name: &str, raw: &str) -> Map<String, Value> {
    if raw.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(tool = tool_name, arguments = %other, "Tool arguments are not an object");
            Map::new()
        }
        Err(e) => {
            warn!(tool = tool_name, error = %e, "Could not decode tool arguments");
            Map::new()
        }
    }
}
