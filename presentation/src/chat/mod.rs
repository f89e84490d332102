//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface.

mod history;
mod repl;

pub use history::ChatHistory;
pub use repl::{ChatRepl, ReloadHook, ReloadReport};
