//! Relevance classifier adapters.

mod corpus;
mod planner;

pub use corpus::CorpusRelevanceClassifier;
pub use planner::PlannerRelevanceClassifier;
