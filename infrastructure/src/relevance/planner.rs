use std::sync::Arc;

use async_trait::async_trait;
use docent_application::ports::corpus::CorpusStore;
use docent_application::ports::planner::PlannerClient;
use docent_application::ports::relevance::RelevanceClassifier;
use docent_domain::{Message, PlannerTurn, RelevanceVerdict, SupportPromptTemplate, Transcript};
use serde_json::Value;
use tracing::warn;

/// Classifier that asks the planner a narrow yes/no question.
///
/// Fails open: an unreachable planner or an unreadable reply counts as
/// relevant, so the run continues and grounding still applies.
pub struct PlannerRelevanceClassifier {
    planner: Arc<dyn PlannerClient>,
    corpus: Arc<dyn CorpusStore>,
    product_name: String,
}

impl PlannerRelevanceClassifier {
    pub fn new(
        planner: Arc<dyn PlannerClient>,
        corpus: Arc<dyn CorpusStore>,
        product_name: impl Into<String>,
    ) -> Self {
        Self {
            planner,
            corpus,
            product_name: product_name.into(),
        }
    }

    fn parse_verdict(reply: &str) -> Option<RelevanceVerdict> {
        let start = reply.find('{')?;
        let end = reply.rfind('}')?;
        if end < start {
            return None;
        }
        let value: Value = serde_json::from_str(&reply[start..=end]).ok()?;
        RelevanceVerdict::from_payload(&value)
    }
}

#[async_trait]
impl RelevanceClassifier for PlannerRelevanceClassifier {
    async fn classify(&self, question: &str) -> RelevanceVerdict {
        let pages = self.corpus.list_pages().await;
        let mut transcript = Transcript::with_system(SupportPromptTemplate::relevance_system(
            &self.product_name,
            &pages,
        ));
        transcript.push(Message::user(SupportPromptTemplate::relevance_query(question)));

        match self.planner.complete(&transcript, &[]).await {
            Ok(PlannerTurn::Answer { text }) => Self::parse_verdict(&text).unwrap_or_else(|| {
                warn!(reply = %text, "Unreadable relevance reply, assuming relevant");
                RelevanceVerdict::relevant("relevance reply could not be read")
            }),
            Ok(PlannerTurn::ToolCall(call)) => {
                warn!(tool = %call.tool_name, "Relevance check answered with a tool call");
                RelevanceVerdict::relevant("relevance reply could not be read")
            }
            Err(e) => {
                warn!(error = %e, "Relevance check failed, assuming relevant");
                RelevanceVerdict::relevant("relevance check unavailable")
            }
        }
    }
}
