//! Tool executor port
//!
//! Executes planner-requested tools. Failures come back as error-shaped
//! [`ToolResult`]s, never as `Err`, so the planner can read and correct them.

use async_trait::async_trait;
use docent_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::ToolResult,
};

/// Port for tool execution
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool (or alias) is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().resolve(name).is_some()
    }

    /// Definitions handed to the planner, ordered by name
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.tool_spec().all().cloned().collect()
    }

    /// Execute a tool call
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}
