//! Planner adapters: OpenRouter HTTP client, wire types and retry.

pub mod openrouter;
pub mod retry;
pub mod types;

pub use openrouter::{OpenRouterPlanner, PlannerSettings};
pub use retry::RetryPolicy;
