//! Tool domain module
//!
//! The planner never touches the corpus directly. It asks for one of a small
//! fixed set of tools, and the controller executes it on its behalf:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (registry)   │    │ (invocation) │    │ (payload)    │
//! └──────┬───────┘    └──────────────┘    └──────────────┘
//!        │
//!        ├─ aliases: "search" → "search_docs"
//!        └─ tools:   "search_docs" → ToolDefinition
//! ```
//!
//! Planners sometimes invent near-miss tool names. The alias table in
//! [`ToolSpec`] resolves the common ones without an extra round trip; anything
//! else comes back as a `NOT_FOUND` [`ToolError`] the planner can read.
//!
//! Validation ([`ToolValidator`]) is pure; execution happens behind the
//! application layer's `ToolExecutorPort`.

pub mod catalog;
pub mod entities;
pub mod traits;
pub mod value_objects;

pub use catalog::docs_tool_spec;
pub use entities::{ParamType, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolResult, ToolResultMetadata};
