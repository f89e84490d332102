//! JSON Schema tool converter.
//!
//! Default implementation of [`ToolSchemaPort`] producing OpenAI-compatible
//! function specs for the chat completions `tools` field.

use docent_application::ports::tool_schema::ToolSchemaPort;
use docent_domain::tool::entities::ToolDefinition;
use serde_json::{Map, Value, json};

/// Produces `{"type": "function", "function": {...}}` entries.
pub struct JsonSchemaToolConverter;

impl ToolSchemaPort for JsonSchemaToolConverter {
    fn tool_to_schema(&self, tool: &ToolDefinition) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.param_type.as_str(),
                    "description": param.description,
                }),
            );
            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }
}
