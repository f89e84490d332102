//! Domain layer for docent
//!
//! Pure types and logic with no I/O. Infrastructure and presentation
//! concerns live in the outer crates.
//!
//! # Core Concepts
//!
//! ## Corpus
//!
//! A fixed set of documentation pages ([`DocPage`]) that every answer must
//! be grounded in.
//!
//! ## Tools
//!
//! The planner reaches the corpus only through three tools
//! ([`tool::catalog`]): `check_relevance`, `search_docs` and `get_doc`.
//!
//! ## Steps
//!
//! A run is observed as a sequence of [`AgentStep`]s ending in exactly one
//! terminal step.

pub mod agent;
pub mod config;
pub mod core;
pub mod corpus;
pub mod prompt;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use agent::{
    AgentStep, FailureKind, IRRELEVANT_SENTINEL, LinkButton, ParsedAnswer, RelevanceVerdict,
    RunOutcome, is_irrelevant_sentinel, parse_answer,
};
pub use config::{OutputFormat, RelevanceMethod};
pub use core::{error::DomainError, question::Question};
pub use corpus::{DocPage, DocSection, FetchedDoc, PageSummary, SearchHit};
pub use prompt::SupportPromptTemplate;
pub use session::{ConversationTurn, ImageRef, Message, PlannerTurn, Role, Transcript};
pub use tool::{
    catalog::docs_tool_spec,
    entities::{ParamType, ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
