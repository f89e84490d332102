//! Infrastructure layer for docent
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the corpus index and loader, the documentation tools,
//! relevance classifiers, the OpenRouter planner client, the JSONL analytics
//! sink and configuration file loading.

pub mod analytics;
pub mod config;
pub mod corpus;
pub mod planner;
pub mod relevance;
pub mod tools;

// Re-export commonly used types
pub use analytics::JsonlAnalyticsSink;
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileAnalyticsConfig, FileConfig,
    FileCorpusConfig, FileOutputConfig, FilePlannerConfig,
};
pub use corpus::{CorpusIndex, CorpusLoadError, CorpusLoader, InMemoryCorpus};
pub use planner::{OpenRouterPlanner, PlannerSettings, RetryPolicy};
pub use relevance::{CorpusRelevanceClassifier, PlannerRelevanceClassifier};
pub use tools::{DocToolRegistry, JsonSchemaToolConverter};
