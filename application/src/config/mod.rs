//! Application-level configuration.
//!
//! - [`AgentParams`]: loop control (step budget, history window, gate, timeouts)

pub mod agent_params;

pub use agent_params::AgentParams;
