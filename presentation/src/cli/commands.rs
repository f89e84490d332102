//! CLI command definitions

use clap::{Parser, ValueEnum};
use docent_domain::{OutputFormat, RelevanceMethod};
use std::path::PathBuf;

/// Output format flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Progress lines followed by the answer
    Text,
    /// Every step as one JSON object per line
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// Relevance method flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RelevanceArg {
    /// Ask the planner with a narrow yes/no prompt
    Planner,
    /// Relevant when a corpus search scores high enough
    Corpus,
}

impl From<RelevanceArg> for RelevanceMethod {
    fn from(arg: RelevanceArg) -> Self {
        match arg {
            RelevanceArg::Planner => RelevanceMethod::Planner,
            RelevanceArg::Corpus => RelevanceMethod::Corpus,
        }
    }
}

/// CLI arguments for docent
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(author, version, about = "Documentation-grounded support agent")]
#[command(long_about = r#"
Docent answers questions about a product using only its documentation.

For each question the agent:
1. Checks whether the question is about the documented product
2. Searches the documentation and reads the relevant pages
3. Answers from what it read, with links to the pages it used

Configuration files are loaded from (in priority order):
1. DOCENT_* environment variables (e.g. DOCENT_AGENT__MAX_STEPS=6)
2. --config <path>     Explicit config file
3. ./docent.toml       Project-level config
4. ~/.config/docent/config.toml   Global config

Example:
  docent --corpus ./docs-export "How do I create a backup?"
  docent --corpus ./docs-export --image screenshot.png "What does this error mean?"
  docent --chat
"#)]
pub struct Cli {
    /// The question to ask (not required in chat mode)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Documentation corpus: a directory of page JSON files or one JSON array file
    #[arg(long, value_name = "PATH")]
    pub corpus: Option<PathBuf>,

    /// Attach an image to the question (can be specified multiple times)
    #[arg(long, value_name = "PATH")]
    pub image: Vec<PathBuf>,

    /// JSON file with prior conversation turns ([{"role": "user", "content": "..."}])
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Planner model
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum tool executions per question
    #[arg(long, value_name = "N")]
    pub max_steps: Option<usize>,

    /// How check_relevance decides when the planner gives no verdict
    #[arg(long, value_enum, value_name = "METHOD")]
    pub relevance: Option<RelevanceArg>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List the documentation pages and exit
    #[arg(long)]
    pub list_pages: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
