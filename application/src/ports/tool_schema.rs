//! Tool schema conversion port.
//!
//! The domain decides which tools exist; this port decides how they are
//! serialized for a planner API (JSON Schema function specs).

use docent_domain::tool::entities::{ToolDefinition, ToolSpec};

/// Port for converting tool definitions to planner API format
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool definition to a function spec.
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value;

    /// Convert a list of tools, preserving order.
    fn tools_schema(&self, tools: &[ToolDefinition]) -> Vec<serde_json::Value> {
        tools.iter().map(|t| self.tool_to_schema(t)).collect()
    }

    /// Convert every tool in a spec (sorted by name).
    fn all_tools_schema(&self, spec: &ToolSpec) -> Vec<serde_json::Value> {
        spec.all().map(|t| self.tool_to_schema(t)).collect()
    }
}
