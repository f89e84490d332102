//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod analytics;
pub mod corpus;
pub mod planner;
pub mod relevance;
pub mod tool_executor;
pub mod tool_schema;
