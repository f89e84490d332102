//! Application layer for docent
//!
//! This crate contains the loop controller use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::AgentParams;
pub use ports::{
    analytics::{AnalyticsSink, NoAnalytics, Resolution},
    corpus::CorpusStore,
    planner::{PlannerClient, PlannerError},
    relevance::{AlwaysRelevant, RelevanceClassifier},
    tool_executor::ToolExecutorPort,
    tool_schema::ToolSchemaPort,
};
pub use use_cases::answer_question::{
    AnswerQuestionUseCase, RunError, RunInput, StepStream,
};
