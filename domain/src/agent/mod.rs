//! Agent run domain.
//!
//! A run turns one question into a finite sequence of [`AgentStep`]s:
//! zero or more `tool_call` steps followed by exactly one terminal step
//! (`irrelevant`, `response` or `error`).

pub mod answer_parser;
pub mod relevance;
pub mod step;

pub use answer_parser::{IRRELEVANT_SENTINEL, ParsedAnswer, is_irrelevant_sentinel, parse_answer};
pub use relevance::RelevanceVerdict;
pub use step::{AgentStep, FailureKind, LinkButton, MAX_LINK_BUTTONS, RunOutcome};
