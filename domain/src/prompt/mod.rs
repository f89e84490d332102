//! Prompt domain
//!
//! Templates for the support agent's system prompt and the narrow
//! relevance-classification prompt.

pub mod support;

pub use support::SupportPromptTemplate;
