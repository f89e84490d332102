//! Live progress for a running question

use crate::output::console::ConsoleFormatter;
use docent_domain::AgentStep;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const THINKING: &str = "Thinking...";

/// Spinner on stderr with one line per executed tool.
///
/// Hidden renderers print nothing.
pub struct StepRenderer {
    spinner: Option<ProgressBar>,
}

impl StepRenderer {
    pub fn new(show: bool) -> Self {
        let spinner = show.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.set_message(THINKING);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        Self { spinner }
    }

    pub fn hidden() -> Self {
        Self { spinner: None }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub fn is_visible(&self) -> bool {
        self.spinner.is_some()
    }

    /// Print a finished tool step above the spinner
    pub fn on_step(&self, step: &AgentStep) {
        let Some(pb) = &self.spinner else {
            return;
        };
        if let Some(line) = ConsoleFormatter::format_tool_step(step) {
            pb.println(format!("  {}", line));
            pb.set_message(THINKING);
        }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        if let Some(pb) = &self.spinner {
            pb.set_message(message.into());
        }
    }

    /// Remove the spinner
    pub fn finish(&self) {
        if let Some(pb) = &self.spinner {
            pb.finish_and_clear();
        }
    }
}

impl Drop for StepRenderer {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_renderer_ignores_steps() {
        let renderer = StepRenderer::hidden();
        assert!(!renderer.is_visible());
        renderer.on_step(&AgentStep::irrelevant("x"));
        renderer.finish();
    }
}
