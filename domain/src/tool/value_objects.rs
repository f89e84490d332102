//! Tool domain value objects: results and errors
//!
//! Every tool execution produces a [`ToolResult`]. Failures are carried as
//! values so the planner can read them and correct itself on the next turn.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Error that occurred during tool execution.
///
/// | Code | Description |
/// |------|-------------|
/// | `INVALID_ARGUMENT` | Missing or mistyped parameters |
/// | `NOT_FOUND` | Unknown tool name |
/// | `EXECUTION_FAILED` | Backend fault while running the tool |
/// | `TIMEOUT` | Tool did not finish within its time limit |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const INVALID_ARGUMENT: &'static str = "INVALID_ARGUMENT";
    pub const EXECUTION_FAILED: &'static str = "EXECUTION_FAILED";
    pub const TIMEOUT: &'static str = "TIMEOUT";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::new(Self::NOT_FOUND, format!("Unknown tool: {}", name.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_ARGUMENT, message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new(Self::EXECUTION_FAILED, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            Self::TIMEOUT,
            format!("Operation timed out: {}", operation.into()),
        )
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool execution.
///
/// On success `payload` holds a JSON object whose shape depends on the tool;
/// on failure it is `null` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Canonical name of the tool that was executed
    pub tool_name: String,
    pub success: bool,
    #[serde(default)]
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured metadata about a tool execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// For search: number of hits returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, payload: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            payload,
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            payload: Value::Null,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_match_count(mut self, count: usize) -> Self {
        self.metadata.match_count = Some(count);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Look up a top-level field of the payload
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Compact JSON text fed back to the planner as the tool message
    pub fn to_transcript_text(&self) -> String {
        match &self.error {
            Some(err) => {
                let mut error = json!({"code": err.code, "message": err.message});
                if let Some(details) = &err.details {
                    error["details"] = json!(details);
                }
                json!({ "error": error }).to_string()
            }
            None => self.payload.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error() {
        let err = ToolError::unknown_tool("browse").with_details("registered: get_doc");
        assert_eq!(err.code, ToolError::NOT_FOUND);
        assert!(err.message.contains("browse"));
        assert_eq!(err.to_string(), "[NOT_FOUND] Unknown tool: browse (registered: get_doc)");
    }

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("search_docs", json!({"results": []}))
            .with_match_count(0)
            .with_duration(4);

        assert!(result.is_success());
        assert!(result.error().is_none());
        assert_eq!(result.field("results"), Some(&json!([])));
        assert_eq!(result.metadata.match_count, Some(0));
        assert_eq!(result.to_transcript_text(), r#"{"results":[]}"#);
    }

    #[test]
    fn test_tool_result_failure_transcript_text() {
        let result = ToolResult::failure("get_doc", ToolError::invalid_argument("id is required"));

        assert!(!result.is_success());
        assert_eq!(result.payload, Value::Null);
        let text: Value = serde_json::from_str(&result.to_transcript_text()).unwrap();
        assert_eq!(text["error"]["code"], "INVALID_ARGUMENT");
        assert_eq!(text["error"]["message"], "id is required");
        assert!(text["error"].get("details").is_none());

        let result = ToolResult::failure(
            "get_doc",
            ToolError::invalid_argument("id is required").with_details("expected: id (string, required)"),
        );
        let text: Value = serde_json::from_str(&result.to_transcript_text()).unwrap();
        assert_eq!(text["error"]["details"], "expected: id (string, required)");
    }

    #[test]
    fn test_execution_failed_error() {
        let err = ToolError::execution_failed("search_docs stopped unexpectedly");
        assert_eq!(err.code, ToolError::EXECUTION_FAILED);
        assert_eq!(err.to_string(), "[EXECUTION_FAILED] search_docs stopped unexpectedly");
    }
}
