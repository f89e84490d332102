use std::sync::Arc;

use async_trait::async_trait;
use docent_application::ports::corpus::CorpusStore;
use docent_application::ports::relevance::RelevanceClassifier;
use docent_domain::RelevanceVerdict;

/// Default minimum score for the best hit
pub const DEFAULT_MIN_SCORE: f64 = 1.0;

/// Heuristic classifier: a question is relevant when the corpus has a
/// sufficiently strong match for it.
pub struct CorpusRelevanceClassifier {
    corpus: Arc<dyn CorpusStore>,
    min_score: f64,
}

impl CorpusRelevanceClassifier {
    pub fn new(corpus: Arc<dyn CorpusStore>) -> Self {
        Self {
            corpus,
            min_score: DEFAULT_MIN_SCORE,
        }
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }
}

#[async_trait]
impl RelevanceClassifier for CorpusRelevanceClassifier {
    async fn classify(&self, question: &str) -> RelevanceVerdict {
        let hits = self.corpus.search(question, 1).await;
        match hits.first() {
            Some(hit) if hit.score >= self.min_score => RelevanceVerdict::relevant(format!(
                "matches documentation page \"{}\"",
                hit.title
            )),
            Some(hit) => RelevanceVerdict::irrelevant(format!(
                "best documentation match \"{}\" is too weak",
                hit.title
            )),
            None => RelevanceVerdict::irrelevant("no documentation matches the question"),
        }
    }
}
