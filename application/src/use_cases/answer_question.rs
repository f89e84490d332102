//! Answer Question use case.
//!
//! Runs the bounded retrieval loop for one question and exposes its progress
//! as a [`StepStream`]:
//!
//! ```text
//! INIT ──▶ [relevance gate] ──▶ PLANNING ──┬─▶ answer ─────▶ response | irrelevant
//!                                  ▲       ├─▶ error ──────▶ error
//!                                  │       └─▶ tool call
//!                                  │              │
//!                                  └── TOOL_EXEC ◀┘ ──▶ irrelevant (negative verdict)
//! ```
//!
//! Each run owns its transcript and executes in its own task. Exactly one
//! terminal step (`irrelevant`, `response` or `error`) ends every stream.

use crate::config::AgentParams;
use crate::ports::analytics::{AnalyticsSink, NoAnalytics, Resolution};
use crate::ports::corpus::CorpusStore;
use crate::ports::planner::{PlannerClient, PlannerError};
use crate::ports::tool_executor::ToolExecutorPort;
use docent_domain::tool::catalog::CHECK_RELEVANCE;
use docent_domain::util::truncate_str;
use docent_domain::{
    AgentStep, ConversationTurn, FailureKind, ImageRef, Message, PlannerTurn, Question,
    RelevanceVerdict, SupportPromptTemplate, ToolCall, ToolError, ToolResult, Transcript,
    is_irrelevant_sentinel, parse_answer,
};
use futures::{FutureExt, Stream};
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const STEP_CHANNEL_CAPACITY: usize = 16;

const BUDGET_EXCEEDED_MESSAGE: &str = "could not find an answer within the step limit";
const SENTINEL_REASON: &str = "the question is not about the documented product";

/// Errors that prevent a run from starting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("No documentation corpus has been loaded yet")]
    CorpusUninitialized,

    #[error("Question cannot be empty")]
    EmptyQuestion,
}

/// Input for the [`AnswerQuestionUseCase`].
#[derive(Debug, Clone, Default)]
pub struct RunInput {
    /// The user's question.
    pub question: String,
    /// Prior conversation; only the most recent turns are used.
    pub history: Vec<ConversationTurn>,
    /// Images attached to the question.
    pub images: Vec<ImageRef>,
}

impl RunInput {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_images(mut self, images: Vec<ImageRef>) -> Self {
        self.images = images;
        self
    }
}

/// Lazy, finite stream of the steps of one run.
///
/// Consumed once. Dropping it cancels the run.
pub struct StepStream {
    run_id: u64,
    receiver: mpsc::Receiver<AgentStep>,
    token: CancellationToken,
}

impl StepStream {
    fn new(run_id: u64, receiver: mpsc::Receiver<AgentStep>, token: CancellationToken) -> Self {
        Self {
            run_id,
            receiver,
            token,
        }
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Wait for the next step; `None` once the terminal step has been read.
    pub async fn next_step(&mut self) -> Option<AgentStep> {
        self.receiver.recv().await
    }

    /// Drain the stream into a vector.
    pub async fn collect_steps(mut self) -> Vec<AgentStep> {
        let mut steps = Vec::new();
        while let Some(step) = self.receiver.recv().await {
            steps.push(step);
        }
        steps
    }

    /// Request cancellation; the stream then ends with `error{cancelled}`.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Stream for StepStream {
    type Item = AgentStep;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for StepStream {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Marker for a run that stopped because it was cancelled.
#[derive(Debug)]
struct Cancelled;

fn check_cancelled(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        return Err(Cancelled);
    }
    Ok(())
}

/// Mutable state owned by one run.
struct RunState {
    run_id: u64,
    question: Question,
    transcript: Transcript,
    steps_used: usize,
    tx: mpsc::Sender<AgentStep>,
}

/// Use case for answering a question from the documentation.
#[derive(Clone)]
pub struct AnswerQuestionUseCase {
    planner: Arc<dyn PlannerClient>,
    tool_executor: Arc<dyn ToolExecutorPort>,
    corpus: Arc<dyn CorpusStore>,
    analytics: Arc<dyn AnalyticsSink>,
    params: AgentParams,
    next_run_id: Arc<AtomicU64>,
}

impl AnswerQuestionUseCase {
    pub fn new(
        planner: Arc<dyn PlannerClient>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        corpus: Arc<dyn CorpusStore>,
        params: AgentParams,
    ) -> Self {
        Self {
            planner,
            tool_executor,
            corpus,
            analytics: Arc::new(NoAnalytics),
            params,
            next_run_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create with an analytics sink.
    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    /// Start a run.
    pub fn run(&self, input: RunInput) -> Result<StepStream, RunError> {
        self.run_with_cancellation(input, CancellationToken::new())
    }

    /// Start a run controlled by `token`.
    ///
    /// The returned stream owns `token` and cancels it when dropped; pass a
    /// child token to keep a parent alive.
    pub fn run_with_cancellation(
        &self,
        input: RunInput,
        token: CancellationToken,
    ) -> Result<StepStream, RunError> {
        let question =
            Question::new(input.question.as_str()).map_err(|_| RunError::EmptyQuestion)?;

        if !self.corpus.is_initialized() {
            warn!("Rejecting question: corpus is not initialized");
            return Err(RunError::CorpusUninitialized);
        }

        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::channel(STEP_CHANNEL_CAPACITY);

        let this = self.clone();
        let run_token = token.clone();
        tokio::spawn(async move {
            let state = RunState {
                run_id,
                question,
                transcript: Transcript::new(),
                steps_used: 0,
                tx,
            };
            this.drive(state, input, run_token).await;
        });

        Ok(StepStream::new(run_id, rx, token))
    }

    async fn drive(&self, mut run: RunState, input: RunInput, token: CancellationToken) {
        info!(
            run_id = run.run_id,
            generation = self.corpus.generation(),
            "Starting run: {}",
            truncate_str(run.question.content(), 100)
        );

        // A terminal step that raced with cancellation is discarded
        let outcome = self
            .run_loop(&mut run, input, &token)
            .await
            .and_then(|terminal| check_cancelled(&token).map(|_| terminal));

        match outcome {
            Ok(terminal) => {
                if let Some(resolution) = resolution_for(&terminal) {
                    self.analytics
                        .on_resolution(run.run_id, run.question.content(), resolution);
                }
                info!(
                    run_id = run.run_id,
                    outcome = terminal.kind_name(),
                    steps = run.steps_used,
                    "Run finished"
                );
                if run.tx.send(terminal).await.is_err() {
                    debug!(run_id = run.run_id, "Consumer dropped before terminal step");
                }
            }
            Err(Cancelled) => {
                info!(run_id = run.run_id, steps = run.steps_used, "Run cancelled");
                // Only reaches a consumer that is still reading
                let _ = run
                    .tx
                    .try_send(AgentStep::error(FailureKind::Cancelled, "the run was cancelled"));
            }
        }
    }

    async fn run_loop(
        &self,
        run: &mut RunState,
        input: RunInput,
        token: &CancellationToken,
    ) -> Result<AgentStep, Cancelled> {
        check_cancelled(token)?;

        let pages = self.corpus.list_pages().await;
        run.transcript = Transcript::with_system(SupportPromptTemplate::system(
            &self.params.product_name,
            &pages,
            self.tool_executor.tool_spec(),
            self.params.forced_relevance_gate,
        ));
        run.transcript
            .push_history(&input.history, self.params.max_history_turns);
        run.transcript
            .push(Message::user(run.question.content()).with_images(input.images));

        let tools = self.tool_executor.definitions();

        if self.params.forced_relevance_gate {
            debug!(run_id = run.run_id, "Running relevance gate");
            let call = ToolCall::new(CHECK_RELEVANCE).with_arg("question", run.question.content());
            if let Some(terminal) = self.execute_step(run, call, token).await? {
                return Ok(terminal);
            }
        }

        loop {
            check_cancelled(token)?;
            debug!(
                run_id = run.run_id,
                steps_used = run.steps_used,
                messages = run.transcript.len(),
                "Planning"
            );

            let turn = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Cancelled),
                turn = self.planner.complete(&run.transcript, &tools) => turn,
            };

            match turn {
                Ok(PlannerTurn::Answer { text }) => return Ok(answer_step(&text)),
                Ok(PlannerTurn::ToolCall(call)) => {
                    if run.steps_used >= self.params.max_steps {
                        warn!(
                            run_id = run.run_id,
                            max_steps = self.params.max_steps,
                            tool = %call.tool_name,
                            "Step budget exhausted"
                        );
                        return Ok(AgentStep::error(
                            FailureKind::StepBudgetExceeded,
                            BUDGET_EXCEEDED_MESSAGE,
                        ));
                    }
                    if let Some(terminal) = self.execute_step(run, call, token).await? {
                        return Ok(terminal);
                    }
                }
                Err(e) => return Ok(planner_failure_step(run.run_id, e)),
            }
        }
    }

    /// Execute one tool call and record it.
    ///
    /// Returns a terminal step when the call ends the run (negative relevance
    /// verdict), otherwise emits a `tool_call` step and extends the transcript.
    async fn execute_step(
        &self,
        run: &mut RunState,
        mut call: ToolCall,
        token: &CancellationToken,
    ) -> Result<Option<AgentStep>, Cancelled> {
        check_cancelled(token)?;

        let resolved = self
            .tool_executor
            .tool_spec()
            .resolve(&call.tool_name)
            .map(str::to_owned);
        if let Some(canonical) = resolved
            && canonical != call.tool_name
        {
            debug!(alias = %call.tool_name, canonical = %canonical, "Resolved tool alias");
            call.tool_name = canonical;
        }

        let result = self.execute_tool(&call, token).await?;
        run.steps_used += 1;
        debug!(
            run_id = run.run_id,
            tool = %result.tool_name,
            success = result.is_success(),
            step = run.steps_used,
            "Tool executed"
        );
        self.analytics
            .on_tool_call(run.run_id, &result.tool_name, &call.arguments, &result);

        if result.tool_name == CHECK_RELEVANCE
            && result.is_success()
            && let Some(verdict) = RelevanceVerdict::from_payload(&result.payload)
            && !verdict.relevant
        {
            info!(run_id = run.run_id, reason = %verdict.reason, "Question judged irrelevant");
            return Ok(Some(AgentStep::irrelevant(verdict.reason)));
        }

        let transcript_text = result.to_transcript_text();
        self.emit(run, AgentStep::tool_call(&call, result), token)
            .await?;
        run.transcript.push_tool_exchange(call, transcript_text);
        Ok(None)
    }

    async fn execute_tool(
        &self,
        call: &ToolCall,
        token: &CancellationToken,
    ) -> Result<ToolResult, Cancelled> {
        let timeout = self.params.tool_timeout;
        let execution = AssertUnwindSafe(self.tool_executor.execute(call)).catch_unwind();
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Cancelled),
            outcome = tokio::time::timeout(timeout, execution) => Ok(match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => {
                    warn!(tool = %call.tool_name, "Tool execution panicked");
                    ToolResult::failure(
                        call.tool_name.clone(),
                        ToolError::execution_failed(format!(
                            "{} failed unexpectedly",
                            call.tool_name
                        )),
                    )
                }
                Err(_) => {
                    warn!(tool = %call.tool_name, ?timeout, "Tool execution timed out");
                    ToolResult::failure(call.tool_name.clone(), ToolError::timeout(&call.tool_name))
                }
            }),
        }
    }

    async fn emit(
        &self,
        run: &RunState,
        step: AgentStep,
        token: &CancellationToken,
    ) -> Result<(), Cancelled> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Cancelled),
            sent = run.tx.send(step) => sent.map_err(|_| {
                debug!(run_id = run.run_id, "Step consumer dropped");
                Cancelled
            }),
        }
    }
}

fn answer_step(text: &str) -> AgentStep {
    if is_irrelevant_sentinel(text) {
        return AgentStep::irrelevant(SENTINEL_REASON);
    }
    let parsed = parse_answer(text);
    if parsed.text.is_empty() {
        return AgentStep::error(
            FailureKind::MalformedResponse,
            "planner returned an empty answer",
        );
    }
    AgentStep::response(parsed.text, parsed.buttons)
}

fn planner_failure_step(run_id: u64, error: PlannerError) -> AgentStep {
    match &error {
        PlannerError::MalformedResponse(_) => {
            warn!(run_id, error = %error, "Planner response could not be used");
            AgentStep::error(FailureKind::MalformedResponse, error.to_string())
        }
        _ => {
            warn!(run_id, error = %error, "Planner unavailable");
            AgentStep::error(FailureKind::PlannerUnavailable, error.to_string())
        }
    }
}

fn resolution_for(step: &AgentStep) -> Option<Resolution> {
    match step {
        AgentStep::Response { .. } => Some(Resolution::Answered),
        AgentStep::Irrelevant { .. } => Some(Resolution::Irrelevant),
        AgentStep::Error {
            kind: FailureKind::Cancelled,
            ..
        } => None,
        AgentStep::Error { .. } => Some(Resolution::CommunityEscalation),
        AgentStep::ToolCall { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tool_executor::ToolExecutorPort;
    use async_trait::async_trait;
    use docent_domain::corpus::{DocPage, FetchedDoc, PageSummary, SearchHit, make_snippet};
    use docent_domain::tool::catalog::{GET_DOC, SEARCH_DOCS};
    use docent_domain::{Role, ToolDefinition, ToolSpec, docs_tool_spec};
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    // ==================== Test Mocks ====================

    struct FixtureCorpus {
        pages: Vec<DocPage>,
    }

    impl FixtureCorpus {
        fn new(pages: Vec<DocPage>) -> Self {
            Self { pages }
        }
    }

    #[async_trait]
    impl CorpusStore for FixtureCorpus {
        async fn list_pages(&self) -> Vec<PageSummary> {
            self.pages.iter().map(DocPage::summary).collect()
        }

        async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
            let terms: Vec<String> = query
                .split_whitespace()
                .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
                .filter(|t| t.len() > 3)
                .collect();
            let mut hits = Vec::new();
            for page in &self.pages {
                for section in &page.sections {
                    let haystack = format!("{} {}", page.title, section.content).to_lowercase();
                    let score = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                    if score > 0 {
                        hits.push(SearchHit {
                            id: page.id.clone(),
                            title: page.title.clone(),
                            heading: section.heading.clone(),
                            snippet: make_snippet(&section.content),
                            score: score as f64,
                        });
                    }
                }
            }
            hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
            hits.truncate(limit);
            hits
        }

        async fn fetch(&self, id: &str) -> FetchedDoc {
            self.pages
                .iter()
                .find(|p| p.id == id)
                .map(FetchedDoc::found)
                .unwrap_or_else(|| FetchedDoc::missing(id))
        }

        fn is_initialized(&self) -> bool {
            !self.pages.is_empty()
        }
    }

    /// Minimal stand-in for the tool registry.
    struct FixtureTools {
        spec: ToolSpec,
        corpus: Arc<FixtureCorpus>,
        relevant: bool,
    }

    impl FixtureTools {
        fn new(corpus: Arc<FixtureCorpus>, relevant: bool) -> Self {
            Self {
                spec: docs_tool_spec(),
                corpus,
                relevant,
            }
        }
    }

    #[async_trait]
    impl ToolExecutorPort for FixtureTools {
        fn tool_spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, call: &ToolCall) -> ToolResult {
            match self.spec.resolve(&call.tool_name) {
                Some(CHECK_RELEVANCE) => {
                    let relevant = call.get_bool("is_relevant").unwrap_or(self.relevant);
                    let verdict = if relevant {
                        RelevanceVerdict::relevant("about the product")
                    } else {
                        RelevanceVerdict::irrelevant("not about the product")
                    };
                    ToolResult::success(CHECK_RELEVANCE, verdict.to_payload())
                }
                Some(SEARCH_DOCS) => {
                    let query = call.get_string("query").unwrap_or_default();
                    let hits = self.corpus.search(query, 5).await;
                    ToolResult::success(SEARCH_DOCS, json!({ "results": hits }))
                }
                Some(GET_DOC) => {
                    let doc = self.corpus.fetch(call.get_string("id").unwrap_or_default()).await;
                    ToolResult::success(
                        GET_DOC,
                        json!({
                            "found": doc.found,
                            "id": doc.id,
                            "title": doc.title,
                            "url": doc.url,
                            "content": doc.full_text,
                        }),
                    )
                }
                _ => ToolResult::failure(
                    call.tool_name.clone(),
                    ToolError::unknown_tool(&call.tool_name),
                ),
            }
        }
    }

    /// Planner that replays a fixed script and records what it saw.
    struct ScriptedPlanner {
        turns: Mutex<VecDeque<Result<PlannerTurn, PlannerError>>>,
        seen: Mutex<Vec<Transcript>>,
    }

    impl ScriptedPlanner {
        fn new(turns: Vec<Result<PlannerTurn, PlannerError>>) -> Self {
            Self {
                turns: Mutex::new(VecDeque::from(turns)),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PlannerClient for ScriptedPlanner {
        async fn complete(
            &self,
            transcript: &Transcript,
            _tools: &[ToolDefinition],
        ) -> Result<PlannerTurn, PlannerError> {
            self.seen.lock().unwrap().push(transcript.clone());
            self.turns
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PlannerError::MalformedResponse("script exhausted".into())))
        }
    }

    /// Planner that never stops asking for searches.
    struct AlwaysSearchPlanner;

    #[async_trait]
    impl PlannerClient for AlwaysSearchPlanner {
        async fn complete(
            &self,
            _transcript: &Transcript,
            _tools: &[ToolDefinition],
        ) -> Result<PlannerTurn, PlannerError> {
            Ok(PlannerTurn::tool(
                ToolCall::new(SEARCH_DOCS).with_arg("query", "backup"),
            ))
        }
    }

    /// Planner that derives every move from the transcript: search for the
    /// question, read the top hit, then answer by quoting the page.
    struct GroundedPlanner;

    impl GroundedPlanner {
        fn last_tool_message(transcript: &Transcript) -> Option<&Message> {
            transcript.messages().iter().rev().find(|m| m.role == Role::Tool)
        }

        fn question(transcript: &Transcript) -> String {
            transcript
                .messages()
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl PlannerClient for GroundedPlanner {
        async fn complete(
            &self,
            transcript: &Transcript,
            _tools: &[ToolDefinition],
        ) -> Result<PlannerTurn, PlannerError> {
            tokio::task::yield_now().await;
            let Some(last) = Self::last_tool_message(transcript) else {
                return Ok(PlannerTurn::tool(
                    ToolCall::new(SEARCH_DOCS).with_arg("query", Self::question(transcript)),
                ));
            };
            let payload: Value = serde_json::from_str(&last.content).unwrap();
            match last.tool_name.as_deref() {
                Some(CHECK_RELEVANCE) => Ok(PlannerTurn::tool(
                    ToolCall::new(SEARCH_DOCS).with_arg("query", Self::question(transcript)),
                )),
                Some(SEARCH_DOCS) => match payload["results"][0]["id"].as_str() {
                    Some(id) => Ok(PlannerTurn::tool(ToolCall::new(GET_DOC).with_arg("id", id))),
                    None => Ok(PlannerTurn::answer("The documentation does not cover this.")),
                },
                Some(GET_DOC) => {
                    let content = payload["content"].as_str().unwrap_or_default();
                    let fact = content
                        .lines()
                        .find(|l| !l.is_empty() && !l.starts_with('#'))
                        .unwrap_or_default();
                    Ok(PlannerTurn::answer(format!(
                        "{}\n\n```buttons\n[{{\"label\": \"{}\", \"url\": \"{}\"}}]\n```",
                        fact, payload["title"].as_str().unwrap_or_default(),
                        payload["url"].as_str().unwrap_or_default()
                    )))
                }
                _ => Ok(PlannerTurn::answer("IRRELEVANT")),
            }
        }
    }

    /// Planner whose call never completes; flags when its future is dropped.
    struct HangingPlanner {
        dropped: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PlannerClient for HangingPlanner {
        async fn complete(
            &self,
            _transcript: &Transcript,
            _tools: &[ToolDefinition],
        ) -> Result<PlannerTurn, PlannerError> {
            let _flag = DropFlag(self.dropped.clone());
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    #[derive(Default)]
    struct RecordingAnalytics {
        events: Mutex<Vec<String>>,
    }

    impl AnalyticsSink for RecordingAnalytics {
        fn on_tool_call(
            &self,
            _run_id: u64,
            tool_name: &str,
            _arguments: &serde_json::Map<String, Value>,
            _result: &ToolResult,
        ) {
            self.events.lock().unwrap().push(format!("tool:{}", tool_name));
        }

        fn on_resolution(&self, _run_id: u64, _question: &str, resolution: Resolution) {
            self.events
                .lock()
                .unwrap()
                .push(format!("resolution:{}", resolution.as_str()));
        }
    }

    // ==================== Helpers ====================

    fn fixture_corpus() -> Arc<FixtureCorpus> {
        Arc::new(FixtureCorpus::new(vec![
            DocPage::new("backup-guide", "Backups")
                .with_url("https://docs.example.com/backups")
                .with_section("Creating a backup", "Run /backup create to save your server layout.")
                .with_section("Loading", "Run /backup load with the backup id."),
            DocPage::new("templates", "Templates")
                .with_url("https://docs.example.com/templates")
                .with_section("Using templates", "Apply a template with /template load."),
        ]))
    }

    fn use_case(
        planner: Arc<dyn PlannerClient>,
        relevant: bool,
        params: AgentParams,
    ) -> AnswerQuestionUseCase {
        let corpus = fixture_corpus();
        let tools = Arc::new(FixtureTools::new(corpus.clone(), relevant));
        AnswerQuestionUseCase::new(planner, tools, corpus, params)
    }

    fn tool_names(steps: &[AgentStep]) -> Vec<String> {
        steps
            .iter()
            .filter_map(|s| match s {
                AgentStep::ToolCall { tool_name, .. } => Some(tool_name.clone()),
                _ => None,
            })
            .collect()
    }

    fn assert_single_terminal(steps: &[AgentStep]) {
        let terminals = steps.iter().filter(|s| s.is_terminal()).count();
        assert_eq!(terminals, 1, "steps: {:?}", steps);
        assert!(steps.last().unwrap().is_terminal());
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_irrelevant_question_yields_exactly_one_step() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let uc = use_case(planner.clone(), false, AgentParams::default());

        let steps = uc
            .run(RunInput::new("What's a good pasta recipe?"))
            .unwrap()
            .collect_steps()
            .await;

        assert_eq!(steps.len(), 1);
        assert!(matches!(steps[0], AgentStep::Irrelevant { .. }));
        assert_eq!(planner.calls(), 0);
    }

    #[tokio::test]
    async fn test_planner_self_assessed_irrelevance_ends_run() {
        let planner = Arc::new(ScriptedPlanner::new(vec![Ok(PlannerTurn::tool(
            ToolCall::new(CHECK_RELEVANCE)
                .with_arg("question", "weather?")
                .with_arg("is_relevant", false)
                .with_arg("reasoning", "weather"),
        ))]));
        let uc = use_case(
            planner.clone(),
            true,
            AgentParams::default().with_forced_relevance_gate(false),
        );

        let steps = uc.run(RunInput::new("weather?")).unwrap().collect_steps().await;

        assert_eq!(steps.len(), 1);
        assert!(matches!(steps[0], AgentStep::Irrelevant { .. }));
        assert_eq!(planner.calls(), 1);
    }

    #[tokio::test]
    async fn test_irrelevant_sentinel_answer() {
        let planner = Arc::new(ScriptedPlanner::new(vec![Ok(PlannerTurn::answer(" irrelevant "))]));
        let uc = use_case(planner, true, AgentParams::default());

        let steps = uc.run(RunInput::new("Who won the game?")).unwrap().collect_steps().await;

        assert_eq!(tool_names(&steps), vec![CHECK_RELEVANCE]);
        assert!(matches!(steps.last(), Some(AgentStep::Irrelevant { .. })));
        assert_single_terminal(&steps);
    }

    #[tokio::test]
    async fn test_backup_guide_scenario_is_grounded() {
        let analytics = Arc::new(RecordingAnalytics::default());
        let uc = use_case(Arc::new(GroundedPlanner), true, AgentParams::default())
            .with_analytics(analytics.clone());

        let steps = uc
            .run(RunInput::new("How do I create a backup?"))
            .unwrap()
            .collect_steps()
            .await;

        assert_eq!(tool_names(&steps), vec![CHECK_RELEVANCE, SEARCH_DOCS, GET_DOC]);
        assert_single_terminal(&steps);

        let AgentStep::Response { text, buttons } = steps.last().unwrap() else {
            panic!("expected response, got {:?}", steps.last());
        };
        assert_eq!(text, "Run /backup create to save your server layout.");
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].url.as_deref(), Some("https://docs.example.com/backups"));

        // Every sentence of the answer appears in an earlier tool result
        let retrieved: Vec<String> = steps
            .iter()
            .filter_map(|s| match s {
                AgentStep::ToolCall { result, .. } => Some(result.to_transcript_text()),
                _ => None,
            })
            .collect();
        assert!(retrieved.iter().any(|r| r.contains(text.as_str())));

        match &steps[1] {
            AgentStep::ToolCall { label, emoji, .. } => {
                assert_eq!(label, "Searching docs for \"How do I create a backup?\"...");
                assert_eq!(emoji, "🔍");
            }
            other => panic!("unexpected step {:?}", other),
        }

        assert_eq!(
            *analytics.events.lock().unwrap(),
            vec![
                "tool:check_relevance",
                "tool:search_docs",
                "tool:get_doc",
                "resolution:answered"
            ]
        );
    }

    #[tokio::test]
    async fn test_step_budget_is_enforced() {
        let analytics = Arc::new(RecordingAnalytics::default());
        let uc = use_case(
            Arc::new(AlwaysSearchPlanner),
            true,
            AgentParams::default().with_max_steps(3),
        )
        .with_analytics(analytics.clone());

        let steps = uc.run(RunInput::new("backup?")).unwrap().collect_steps().await;

        // Gate + two searches use the whole budget
        assert_eq!(tool_names(&steps).len(), 3);
        assert_single_terminal(&steps);
        match steps.last().unwrap() {
            AgentStep::Error { kind, message } => {
                assert_eq!(*kind, FailureKind::StepBudgetExceeded);
                assert_eq!(message, BUDGET_EXCEEDED_MESSAGE);
            }
            other => panic!("unexpected terminal {:?}", other),
        }
        assert_eq!(
            analytics.events.lock().unwrap().last().unwrap(),
            "resolution:community_escalation"
        );
    }

    #[tokio::test]
    async fn test_budget_without_gate_allows_max_steps_tools() {
        let uc = use_case(
            Arc::new(AlwaysSearchPlanner),
            true,
            AgentParams::default()
                .with_max_steps(2)
                .with_forced_relevance_gate(false),
        );

        let steps = uc.run(RunInput::new("backup?")).unwrap().collect_steps().await;
        assert_eq!(tool_names(&steps), vec![SEARCH_DOCS, SEARCH_DOCS]);
        assert_eq!(steps.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_page_is_reported_as_data() {
        let planner = Arc::new(ScriptedPlanner::new(vec![
            Ok(PlannerTurn::tool(
                ToolCall::new(GET_DOC).with_arg("id", "nonexistent-page"),
            )),
            Ok(PlannerTurn::answer("I could not find that page.")),
        ]));
        let uc = use_case(planner.clone(), true, AgentParams::default());

        let steps = uc.run(RunInput::new("Read the secret page")).unwrap().collect_steps().await;

        assert_eq!(tool_names(&steps), vec![CHECK_RELEVANCE, GET_DOC]);
        match &steps[1] {
            AgentStep::ToolCall { result, .. } => {
                assert!(result.is_success());
                assert_eq!(result.payload["found"], false);
                assert_eq!(result.payload["content"], "");
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert!(matches!(steps.last(), Some(AgentStep::Response { .. })));

        // The planner saw the not-found result on its second call
        let seen = planner.seen.lock().unwrap();
        assert!(
            seen[0].messages()[0]
                .content
                .contains("Do not call check_relevance again")
        );
        let last = seen[1].messages().last().unwrap();
        assert_eq!(last.role, Role::Tool);
        assert!(last.content.contains("\"found\":false"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fed_back() {
        let planner = Arc::new(ScriptedPlanner::new(vec![
            Ok(PlannerTurn::tool(ToolCall::new("browse_web").with_arg("url", "x"))),
            Ok(PlannerTurn::answer("Sorry.")),
        ]));
        let uc = use_case(planner.clone(), true, AgentParams::default());

        let steps = uc.run(RunInput::new("backup?")).unwrap().collect_steps().await;

        match &steps[1] {
            AgentStep::ToolCall { result, label, emoji, .. } => {
                assert_eq!(result.error().unwrap().code, ToolError::NOT_FOUND);
                assert_eq!(label, "Running browse_web...");
                assert_eq!(emoji, "🔧");
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert!(matches!(steps.last(), Some(AgentStep::Response { .. })));
        let seen = planner.seen.lock().unwrap();
        assert!(seen[1].messages().last().unwrap().content.contains("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_tool_alias_is_resolved() {
        let planner = Arc::new(ScriptedPlanner::new(vec![
            Ok(PlannerTurn::tool(ToolCall::new("search").with_arg("query", "templates"))),
            Ok(PlannerTurn::answer("Use /template load.")),
        ]));
        let uc = use_case(planner, true, AgentParams::default());

        let steps = uc.run(RunInput::new("templates?")).unwrap().collect_steps().await;
        assert_eq!(tool_names(&steps), vec![CHECK_RELEVANCE, SEARCH_DOCS]);
    }

    #[tokio::test]
    async fn test_planner_failures_map_to_error_kinds() {
        let cases = vec![
            (PlannerError::Transport("connection reset".into()), FailureKind::PlannerUnavailable),
            (PlannerError::Timeout, FailureKind::PlannerUnavailable),
            (
                PlannerError::Rejected {
                    status: 401,
                    body: "bad key".into(),
                },
                FailureKind::PlannerUnavailable,
            ),
            (PlannerError::MalformedResponse("no choices".into()), FailureKind::MalformedResponse),
        ];

        for (error, expected) in cases {
            let planner = Arc::new(ScriptedPlanner::new(vec![Err(error)]));
            let uc = use_case(planner, true, AgentParams::default());
            let steps = uc.run(RunInput::new("backup?")).unwrap().collect_steps().await;

            assert_single_terminal(&steps);
            match steps.last().unwrap() {
                AgentStep::Error { kind, .. } => assert_eq!(*kind, expected),
                other => panic!("unexpected terminal {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_answer_is_malformed() {
        let planner = Arc::new(ScriptedPlanner::new(vec![Ok(PlannerTurn::answer("  "))]));
        let uc = use_case(planner, true, AgentParams::default());
        let steps = uc.run(RunInput::new("backup?")).unwrap().collect_steps().await;
        assert!(matches!(
            steps.last(),
            Some(AgentStep::Error {
                kind: FailureKind::MalformedResponse,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_run_rejected_before_streaming() {
        let planner: Arc<dyn PlannerClient> = Arc::new(ScriptedPlanner::new(vec![]));
        let empty = Arc::new(FixtureCorpus::new(vec![]));
        let tools = Arc::new(FixtureTools::new(empty.clone(), true));
        let uc = AnswerQuestionUseCase::new(planner.clone(), tools, empty, AgentParams::default());

        assert_eq!(
            uc.run(RunInput::new("backup?")).err(),
            Some(RunError::CorpusUninitialized)
        );

        let uc = use_case(planner, true, AgentParams::default());
        assert_eq!(uc.run(RunInput::new("   ")).err(), Some(RunError::EmptyQuestion));
    }

    #[tokio::test]
    async fn test_history_window_and_images() {
        let planner = Arc::new(ScriptedPlanner::new(vec![Ok(PlannerTurn::answer("ok"))]));
        let uc = use_case(
            planner.clone(),
            true,
            AgentParams::default().with_forced_relevance_gate(false),
        );

        let history: Vec<ConversationTurn> = (0..8)
            .map(|i| ConversationTurn::user(format!("turn {}", i)))
            .collect();
        let input = RunInput::new("And loading?")
            .with_history(history)
            .with_images(vec![ImageRef::new("image/png", "AAAA")]);

        uc.run(input).unwrap().collect_steps().await;

        let seen = planner.seen.lock().unwrap();
        let messages = seen[0].messages();
        // system + 5 history turns + question
        assert_eq!(messages.len(), 7);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("- backup-guide: Backups"));
        assert_eq!(messages[1].content, "turn 3");
        assert_eq!(messages[6].content, "And loading?");
        assert_eq!(messages[6].images.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_ends_stream_with_cancelled_error() {
        let dropped = Arc::new(AtomicBool::new(false));
        let uc = use_case(
            Arc::new(HangingPlanner {
                dropped: dropped.clone(),
            }),
            true,
            AgentParams::default(),
        );

        let mut stream = uc.run(RunInput::new("backup?")).unwrap();
        let first = stream.next_step().await.unwrap();
        assert!(matches!(first, AgentStep::ToolCall { .. }));

        stream.cancel();
        let rest = tokio::time::timeout(Duration::from_secs(5), async {
            let mut rest = Vec::new();
            while let Some(step) = stream.next_step().await {
                rest.push(step);
            }
            rest
        })
        .await
        .unwrap();

        assert_eq!(rest.len(), 1);
        assert!(matches!(
            rest[0],
            AgentStep::Error {
                kind: FailureKind::Cancelled,
                ..
            }
        ));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropping_stream_abandons_inflight_planner_call() {
        let dropped = Arc::new(AtomicBool::new(false));
        let analytics = Arc::new(RecordingAnalytics::default());
        let uc = use_case(
            Arc::new(HangingPlanner {
                dropped: dropped.clone(),
            }),
            true,
            AgentParams::default(),
        )
        .with_analytics(analytics.clone());

        let mut stream = uc.run(RunInput::new("backup?")).unwrap();
        stream.next_step().await.unwrap();
        drop(stream);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !dropped.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        // Cancelled runs are not reported as resolved
        assert!(
            !analytics
                .events
                .lock()
                .unwrap()
                .iter()
                .any(|e| e.starts_with("resolution:"))
        );
    }

    #[tokio::test]
    async fn test_slow_tool_times_out() {
        struct SlowTools {
            spec: ToolSpec,
        }

        #[async_trait]
        impl ToolExecutorPort for SlowTools {
            fn tool_spec(&self) -> &ToolSpec {
                &self.spec
            }

            async fn execute(&self, call: &ToolCall) -> ToolResult {
                tokio::time::sleep(Duration::from_secs(5)).await;
                ToolResult::success(call.tool_name.clone(), json!({}))
            }
        }

        let planner = Arc::new(ScriptedPlanner::new(vec![
            Ok(PlannerTurn::tool(ToolCall::new(SEARCH_DOCS).with_arg("query", "x"))),
            Ok(PlannerTurn::answer("done")),
        ]));
        let uc = AnswerQuestionUseCase::new(
            planner,
            Arc::new(SlowTools {
                spec: docs_tool_spec(),
            }),
            fixture_corpus(),
            AgentParams::default()
                .with_forced_relevance_gate(false)
                .with_tool_timeout(Duration::from_millis(20)),
        );

        let steps = uc.run(RunInput::new("backup?")).unwrap().collect_steps().await;
        match &steps[0] {
            AgentStep::ToolCall { result, .. } => {
                assert_eq!(result.error().unwrap().code, ToolError::TIMEOUT);
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert!(matches!(steps.last(), Some(AgentStep::Response { .. })));
    }

    #[tokio::test]
    async fn test_panicking_tool_is_reported_as_execution_failure() {
        struct BrokenTools {
            spec: ToolSpec,
        }

        #[async_trait]
        impl ToolExecutorPort for BrokenTools {
            fn tool_spec(&self) -> &ToolSpec {
                &self.spec
            }

            async fn execute(&self, _call: &ToolCall) -> ToolResult {
                panic!("search index corrupted");
            }
        }

        let planner = Arc::new(ScriptedPlanner::new(vec![
            Ok(PlannerTurn::tool(ToolCall::new(SEARCH_DOCS).with_arg("query", "x"))),
            Ok(PlannerTurn::answer("Please ask the community.")),
        ]));
        let uc = AnswerQuestionUseCase::new(
            planner.clone(),
            Arc::new(BrokenTools {
                spec: docs_tool_spec(),
            }),
            fixture_corpus(),
            AgentParams::default().with_forced_relevance_gate(false),
        );

        let steps = uc.run(RunInput::new("backup?")).unwrap().collect_steps().await;
        assert_eq!(steps.len(), 2);
        match &steps[0] {
            AgentStep::ToolCall { result, .. } => {
                assert_eq!(result.error().unwrap().code, ToolError::EXECUTION_FAILED);
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert!(matches!(steps[1], AgentStep::Response { .. }));

        // The failure was fed back to the planner
        let seen = planner.seen.lock().unwrap();
        assert!(
            seen[1]
                .messages()
                .last()
                .unwrap()
                .content
                .contains("EXECUTION_FAILED")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_answer_racing_cancellation_is_discarded() {
        /// Planner that requests cancellation while producing its answer.
        struct CancellingPlanner {
            token: CancellationToken,
        }

        #[async_trait]
        impl PlannerClient for CancellingPlanner {
            async fn complete(
                &self,
                _transcript: &Transcript,
                _tools: &[ToolDefinition],
            ) -> Result<PlannerTurn, PlannerError> {
                self.token.cancel();
                Ok(PlannerTurn::answer("Run /backup create."))
            }
        }

        let token = CancellationToken::new();
        let analytics = Arc::new(RecordingAnalytics::default());
        let uc = use_case(
            Arc::new(CancellingPlanner {
                token: token.clone(),
            }),
            true,
            AgentParams::default().with_forced_relevance_gate(false),
        )
        .with_analytics(analytics.clone());

        let steps = uc
            .run_with_cancellation(RunInput::new("backup?"), token)
            .unwrap()
            .collect_steps()
            .await;

        assert_eq!(steps.len(), 1);
        assert!(matches!(
            steps[0],
            AgentStep::Error {
                kind: FailureKind::Cancelled,
                ..
            }
        ));
        assert!(analytics.events.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_runs_have_disjoint_ordered_steps() {
        let uc = use_case(Arc::new(GroundedPlanner), true, AgentParams::default());

        let backup = uc.run(RunInput::new("How do I create a backup?")).unwrap();
        let template = uc.run(RunInput::new("How do I apply a template?")).unwrap();
        assert_ne!(backup.run_id(), template.run_id());

        let (backup_steps, template_steps) =
            tokio::join!(backup.collect_steps(), template.collect_steps());

        for (steps, page) in [(&backup_steps, "backup-guide"), (&template_steps, "templates")] {
            assert_eq!(tool_names(steps), vec![CHECK_RELEVANCE, SEARCH_DOCS, GET_DOC]);
            assert_single_terminal(steps);
            match &steps[2] {
                AgentStep::ToolCall { arguments, .. } => assert_eq!(arguments["id"], page),
                other => panic!("unexpected step {:?}", other),
            }
        }

        let AgentStep::Response { text, .. } = template_steps.last().unwrap() else {
            panic!("expected response");
        };
        assert_eq!(text, "Apply a template with /template load.");
    }

    #[test]
    fn test_resolution_mapping() {
        assert_eq!(
            resolution_for(&AgentStep::response("a", vec![])),
            Some(Resolution::Answered)
        );
        assert_eq!(
            resolution_for(&AgentStep::irrelevant("x")),
            Some(Resolution::Irrelevant)
        );
        assert_eq!(
            resolution_for(&AgentStep::error(FailureKind::PlannerUnavailable, "x")),
            Some(Resolution::CommunityEscalation)
        );
        assert_eq!(
            resolution_for(&AgentStep::error(FailureKind::Cancelled, "x")),
            None
        );
    }
}
