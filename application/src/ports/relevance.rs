//! Relevance classifier port
//!
//! Decides whether a question is about the documented product when the
//! planner did not volunteer its own verdict. Infallible: adapters fall back
//! to a verdict rather than failing the run.

use async_trait::async_trait;
use docent_domain::RelevanceVerdict;

#[async_trait]
pub trait RelevanceClassifier: Send + Sync {
    async fn classify(&self, question: &str) -> RelevanceVerdict;
}

/// Classifier that accepts every question
pub struct AlwaysRelevant;

#[async_trait]
impl RelevanceClassifier for AlwaysRelevant {
    async fn classify(&self, _question: &str) -> RelevanceVerdict {
        RelevanceVerdict::relevant("relevance checking disabled")
    }
}
