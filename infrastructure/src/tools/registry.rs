//! Documentation tool registry
//!
//! The [`DocToolRegistry`] implements [`ToolExecutorPort`] for the three
//! documentation tools. It handles alias resolution, argument validation and
//! routing to the corpus or relevance classifier.
//!
//! # Execution
//!
//! ```text
//! execute(call)
//!   ├─ resolve alias         → unknown?  NOT_FOUND
//!   ├─ validate arguments    → invalid?  INVALID_ARGUMENT
//!   └─ dispatch
//!        ├─ check_relevance  → planner verdict, else RelevanceClassifier
//!        ├─ search_docs      → CorpusStore::search
//!        └─ get_doc          → CorpusStore::fetch
//! ```
//!
//! Every failure is returned as an error-shaped [`ToolResult`] so the planner
//! can read it and correct itself.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use docent_application::ports::corpus::CorpusStore;
use docent_application::ports::relevance::RelevanceClassifier;
use docent_application::ports::tool_executor::ToolExecutorPort;
use docent_domain::RelevanceVerdict;
use docent_domain::tool::{
    catalog::{
        CHECK_RELEVANCE, DEFAULT_SEARCH_LIMIT, GET_DOC, SEARCH_DOCS, clamp_search_limit,
        docs_tool_spec,
    },
    entities::{ToolCall, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolResult},
};
use serde_json::json;
use tracing::debug;

/// Executor for the documentation tools.
pub struct DocToolRegistry {
    corpus: Arc<dyn CorpusStore>,
    classifier: Arc<dyn RelevanceClassifier>,
    tool_spec: ToolSpec,
    validator: DefaultToolValidator,
    search_limit: usize,
}

impl DocToolRegistry {
    pub fn new(corpus: Arc<dyn CorpusStore>, classifier: Arc<dyn RelevanceClassifier>) -> Self {
        Self {
            corpus,
            classifier,
            tool_spec: docs_tool_spec(),
            validator: DefaultToolValidator,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Result count used when `search_docs` is called without `limit`
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    async fn check_relevance(&self, call: &ToolCall) -> ToolResult {
        let verdict = match call.get_bool("is_relevant") {
            Some(relevant) => {
                let reason = call.get_string("reasoning").unwrap_or_default();
                if relevant {
                    RelevanceVerdict::relevant(reason)
                } else {
                    RelevanceVerdict::irrelevant(reason)
                }
            }
            None => {
                let question = call.get_string("question").unwrap_or_default();
                self.classifier.classify(question).await
            }
        };
        debug!(relevant = verdict.relevant, reason = %verdict.reason, "Relevance verdict");
        ToolResult::success(CHECK_RELEVANCE, verdict.to_payload())
    }

    async fn search_docs(&self, call: &ToolCall) -> ToolResult {
        let query = call.get_string("query").unwrap_or_default();
        if query.trim().is_empty() {
            return ToolResult::failure(
                SEARCH_DOCS,
                ToolError::invalid_argument("query must not be empty"),
            );
        }

        let limit = clamp_search_limit(call.get_i64("limit"), self.search_limit);
        let hits = self.corpus.search(query, limit).await;
        let count = hits.len();

        let payload = if hits.is_empty() {
            json!({"results": [], "message": "No matching documentation found"})
        } else {
            json!({"results": hits})
        };
        ToolResult::success(SEARCH_DOCS, payload).with_match_count(count)
    }

    async fn get_doc(&self, call: &ToolCall) -> ToolResult {
        let id = call.get_string("id").unwrap_or_default().trim();
        let doc = self.corpus.fetch(id).await;

        if doc.found {
            return ToolResult::success(
                GET_DOC,
                json!({
                    "found": true,
                    "id": doc.id,
                    "title": doc.title,
                    "url": doc.url,
                    "content": doc.full_text,
                }),
            )
            .with_match_count(1);
        }

        let available_ids: Vec<String> = self
            .corpus
            .list_pages()
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();
        ToolResult::success(
            GET_DOC,
            json!({
                "found": false,
                "id": id,
                "title": "",
                "url": "",
                "content": "",
                "message": format!("No page with id '{}'", id),
                "available_ids": available_ids,
            }),
        )
        .with_match_count(0)
    }
}

#[async_trait]
impl ToolExecutorPort for DocToolRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let start = Instant::now();

        let Some(definition) = self.tool_spec.get_resolved(&call.tool_name) else {
            return ToolResult::failure(
                call.tool_name.clone(),
                ToolError::unknown_tool(&call.tool_name),
            );
        };

        if let Err(message) = self.validator.validate(call, definition) {
            return ToolResult::failure(
                definition.name.clone(),
                ToolError::invalid_argument(message)
                    .with_details(format!("expected: {}", definition.parameter_summary())),
            );
        }

        let result = match definition.name.as_str() {
            CHECK_RELEVANCE => self.check_relevance(call).await,
            SEARCH_DOCS => self.search_docs(call).await,
            GET_DOC => self.get_doc(call).await,
            other => ToolResult::failure(other, ToolError::unknown_tool(other)),
        };

        result.with_duration(start.elapsed().as_millis() as u64)
    }
}
