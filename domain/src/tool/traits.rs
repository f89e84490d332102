//! Tool domain traits
//!
//! Pure validation of tool calls against their definitions. The async
//! `ToolExecutorPort` lives in the application layer.

use super::entities::{ToolCall, ToolDefinition};
use std::collections::HashSet;

/// Validator for tool calls
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String>;
}

/// Checks required parameters, rejects unknown ones, and type-checks values
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String> {
        for param in &definition.parameters {
            match call.arguments.get(&param.name) {
                None | Some(serde_json::Value::Null) if param.required => {
                    return Err(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        param.name, definition.name
                    ));
                }
                Some(value) if !value.is_null() && !param.param_type.accepts(value) => {
                    return Err(format!(
                        "Parameter '{}' for tool '{}' must be of type {}",
                        param.name, definition.name, param.param_type
                    ));
                }
                _ => {}
            }
        }

        let valid_params: HashSet<&str> =
            definition.parameters.iter().map(|p| p.name.as_str()).collect();

        for arg_name in call.arguments.keys() {
            if !valid_params.contains(arg_name.as_str()) {
                return Err(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    arg_name, definition.name
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ParamType, ToolParameter};

    fn search_definition() -> ToolDefinition {
        ToolDefinition::new("search_docs", "Search")
            .with_parameter(ToolParameter::new("query", "Query", true))
            .with_parameter(
                ToolParameter::new("limit", "Max results", false).with_type(ParamType::Integer),
            )
    }

    #[test]
    fn test_validator_missing_required() {
        let result = DefaultToolValidator.validate(&ToolCall::new("search_docs"), &search_definition());
        assert!(result.unwrap_err().contains("Missing required parameter 'query'"));
    }

    #[test]
    fn test_validator_null_required_is_missing() {
        let call = ToolCall::new("search_docs").with_arg("query", serde_json::Value::Null);
        let result = DefaultToolValidator.validate(&call, &search_definition());
        assert!(result.unwrap_err().contains("Missing required parameter"));
    }

    #[test]
    fn test_validator_unknown_param() {
        let call = ToolCall::new("search_docs")
            .with_arg("query", "backup")
            .with_arg("page", 2);
        let result = DefaultToolValidator.validate(&call, &search_definition());
        assert!(result.unwrap_err().contains("Unknown parameter 'page'"));
    }

    #[test]
    fn test_validator_wrong_type() {
        let call = ToolCall::new("search_docs")
            .with_arg("query", "backup")
            .with_arg("limit", "five");
        let result = DefaultToolValidator.validate(&call, &search_definition());
        assert!(result.unwrap_err().contains("must be of type integer"));
    }

    #[test]
    fn test_validator_valid_call() {
        let call = ToolCall::new("search_docs")
            .with_arg("query", "backup")
            .with_arg("limit", 3);
        assert!(DefaultToolValidator.validate(&call, &search_definition()).is_ok());

        let call = ToolCall::new("search_docs").with_arg("query", "backup");
        assert!(DefaultToolValidator.validate(&call, &search_definition()).is_ok());
    }
}
