//! REPL (Read-Eval-Print Loop) for interactive chat

use super::history::ChatHistory;
use crate::output::console::ConsoleFormatter;
use crate::output::presenter::RunPresenter;
use docent_application::{AnswerQuestionUseCase, CorpusStore, RunInput};
use docent_domain::AgentStep;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome of a corpus reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadReport {
    pub pages: usize,
    pub generation: u64,
}

/// Rebuilds the corpus index from disk
pub type ReloadHook = Arc<dyn Fn() -> Result<ReloadReport, String> + Send + Sync>;

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: AnswerQuestionUseCase,
    corpus: Arc<dyn CorpusStore>,
    presenter: RunPresenter,
    history: ChatHistory,
    reload: Option<ReloadHook>,
}

impl ChatRepl {
    pub fn new(
        use_case: AnswerQuestionUseCase,
        corpus: Arc<dyn CorpusStore>,
        presenter: RunPresenter,
    ) -> Self {
        let max_turns = use_case.params().max_history_turns;
        Self {
            use_case,
            corpus,
            presenter,
            history: ChatHistory::new(max_turns),
            reload: None,
        }
    }

    /// Enable `/reload`
    pub fn with_reload(mut self, hook: ReloadHook) -> Self {
        self.reload = Some(hook);
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("docent").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome().await;

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line).await {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_question(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    async fn print_welcome(&self) {
        let params = self.use_case.params();
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              Docent - Chat Mode             │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Answering questions about {} from {} documentation pages.",
            params.product_name,
            self.corpus.list_pages().await.len()
        );
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /pages           - List documentation pages");
        println!("  /reload          - Reload the documentation from disk");
        println!("  /clear           - Forget the conversation so far");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                println!();
                Self::print_help();
                false
            }
            "/pages" => {
                println!();
                print!("{}", ConsoleFormatter::format_pages(&self.corpus.list_pages().await));
                println!();
                false
            }
            "/clear" => {
                self.history.clear();
                println!("Conversation cleared.");
                false
            }
            "/reload" => {
                match &self.reload {
                    Some(hook) => match hook() {
                        Ok(report) => println!(
                            "Reloaded {} pages (generation {}).",
                            report.pages, report.generation
                        ),
                        Err(e) => eprintln!("Reload failed: {}", e),
                    },
                    None => println!("Reloading is not available in this session."),
                }
                false
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_question(&mut self, question: &str) {
        println!();

        let input = RunInput::new(question).with_history(self.history.to_vec());
        let cancel = CancellationToken::new();

        match self.use_case.run_with_cancellation(input, cancel.clone()) {
            Ok(stream) => {
                if let Some(AgentStep::Response { text, .. }) =
                    self.presenter.present(stream, cancel).await
                {
                    self.history.push_exchange(question, &text);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
        println!();
    }
}
