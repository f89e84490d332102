//! CLI entrypoint for docent
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Parser;
use docent_application::{
    AgentParams, AnswerQuestionUseCase, PlannerClient, RelevanceClassifier, RunInput,
};
use docent_domain::{ConversationTurn, ImageRef, RelevanceMethod, RunOutcome};
use docent_infrastructure::{
    ConfigLoader, CorpusLoader, CorpusRelevanceClassifier, DocToolRegistry, FileConfig,
    InMemoryCorpus, JsonlAnalyticsSink, OpenRouterPlanner, PlannerRelevanceClassifier,
    PlannerSettings, RetryPolicy,
};
use docent_presentation::{ChatRepl, Cli, ConsoleFormatter, ReloadHook, ReloadReport, RunPresenter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    info!(model = %config.planner.model, "Starting docent");

    // === Corpus ===
    let corpus = Arc::new(InMemoryCorpus::new());
    if let Some(path) = &config.corpus.path {
        let pages = CorpusLoader::new(path)
            .load()
            .with_context(|| format!("Failed to load corpus from {}", path.display()))?;
        corpus.rebuild(pages);
    } else {
        warn!("No corpus configured; use --corpus or [corpus].path");
    }

    if cli.list_pages {
        print!("{}", ConsoleFormatter::format_pages(&corpus.snapshot().list_pages()));
        return Ok(ExitCode::SUCCESS);
    }

    // === Dependency Injection ===
    let planner: Arc<dyn PlannerClient> = Arc::new(OpenRouterPlanner::new(planner_settings(&config))?);

    let classifier: Arc<dyn RelevanceClassifier> = match config.agent.relevance {
        RelevanceMethod::Corpus => Arc::new(
            CorpusRelevanceClassifier::new(corpus.clone())
                .with_min_score(config.agent.relevance_min_score),
        ),
        RelevanceMethod::Planner => Arc::new(PlannerRelevanceClassifier::new(
            planner.clone(),
            corpus.clone(),
            config.agent.product_name.clone(),
        )),
    };

    let tools = Arc::new(
        DocToolRegistry::new(corpus.clone(), classifier)
            .with_search_limit(config.agent.search_limit),
    );

    let mut use_case =
        AnswerQuestionUseCase::new(planner, tools, corpus.clone(), agent_params(&config));
    if let Some(path) = &config.analytics.path {
        match JsonlAnalyticsSink::new(path) {
            Some(sink) => use_case = use_case.with_analytics(Arc::new(sink)),
            None => warn!("Analytics disabled: could not open {}", path.display()),
        }
    }

    let format = config.output.format.unwrap_or_default();
    if !config.output.color {
        colored::control::set_override(false);
    }
    let presenter =
        RunPresenter::new(format, config.agent.product_name.clone()).with_progress(!cli.quiet);

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(use_case, corpus.clone(), presenter);
        if let Some(path) = config.corpus.path.clone() {
            repl = repl.with_reload(reload_hook(corpus, path));
        }
        repl.run().await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Single question mode - question is required
    let Some(question) = cli.question.clone() else {
        bail!("Question is required. Use --chat for interactive mode.");
    };

    let mut input = RunInput::new(question).with_images(load_images(&cli.image)?);
    if let Some(path) = &cli.history {
        input = input.with_history(load_history(path)?);
    }

    let cancel = CancellationToken::new();
    let stream = match use_case.run_with_cancellation(input, cancel.clone()) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let terminal = presenter.present(stream, cancel).await;
    Ok(exit_code(terminal.and_then(|step| step.outcome())))
}

/// Stderr logging filtered by `-v`, plus an optional non-blocking file writer
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// CLI flags win over every config layer
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.planner.model = model.clone();
    }
    if let Some(max_steps) = cli.max_steps {
        config.agent.max_steps = max_steps;
    }
    if let Some(relevance) = cli.relevance {
        config.agent.relevance = relevance.into();
    }
    if let Some(path) = &cli.corpus {
        config.corpus.path = Some(path.clone());
    }
    if let Some(output) = cli.output {
        config.output.format = Some(output.into());
    }
}

fn planner_settings(config: &FileConfig) -> PlannerSettings {
    let api_key = config.planner.api_key();
    if api_key.is_none() {
        warn!("{} is not set; planner requests will be unauthenticated", config.planner.api_key_env);
    }
    PlannerSettings {
        endpoint: config.planner.endpoint.clone(),
        model: config.planner.model.clone(),
        api_key,
        temperature: config.planner.temperature,
        timeout: Duration::from_secs(config.planner.timeout_seconds),
        retry: RetryPolicy {
            max_retries: config.planner.max_retries,
            min_delay: Duration::from_millis(config.planner.min_retry_delay_ms),
            ..RetryPolicy::default()
        },
    }
}

fn agent_params(config: &FileConfig) -> AgentParams {
    AgentParams::default()
        .with_product_name(config.agent.product_name.clone())
        .with_max_steps(config.agent.max_steps)
        .with_max_history_turns(config.agent.max_history_turns)
        .with_forced_relevance_gate(config.agent.forced_relevance_gate)
        .with_tool_timeout(Duration::from_secs(config.agent.tool_timeout_seconds))
}

fn reload_hook(corpus: Arc<InMemoryCorpus>, path: PathBuf) -> ReloadHook {
    Arc::new(move || {
        let pages = CorpusLoader::new(&path).load().map_err(|e| e.to_string())?;
        let count = pages.len();
        let generation = corpus.rebuild(pages);
        Ok(ReloadReport {
            pages: count,
            generation,
        })
    })
}

/// Read image attachments as base64
fn load_images(paths: &[PathBuf]) -> Result<Vec<ImageRef>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            Ok(ImageRef::new(
                ImageRef::media_type_for_extension(&ext),
                BASE64.encode(bytes),
            ))
        })
        .collect()
}

fn load_history(path: &Path) -> Result<Vec<ConversationTurn>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history {}", path.display()))
}

fn exit_code(outcome: Option<RunOutcome>) -> ExitCode {
    match outcome {
        Some(RunOutcome::Answered) | Some(RunOutcome::Ignored) => ExitCode::SUCCESS,
        Some(RunOutcome::Failed) | None => ExitCode::FAILURE,
    }
}
