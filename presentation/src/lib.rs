//! Presentation layer for docent
//!
//! This crate contains CLI definitions, console formatting, live progress
//! rendering, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ReloadHook, ReloadReport};
pub use cli::commands::{Cli, OutputArg, RelevanceArg};
pub use output::console::ConsoleFormatter;
pub use output::presenter::RunPresenter;
pub use progress::renderer::StepRenderer;
