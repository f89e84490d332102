//! Drives a step stream to the console

use crate::output::console::ConsoleFormatter;
use crate::progress::renderer::StepRenderer;
use docent_application::StepStream;
use docent_domain::{AgentStep, OutputFormat};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Prints a run's steps as they arrive.
///
/// Text mode shows a spinner with tool lines, then the final answer on
/// stdout. JSON mode prints every step as one line. Ctrl-C cancels the run;
/// the stream then ends with its `cancelled` error step.
#[derive(Debug, Clone)]
pub struct RunPresenter {
    format: OutputFormat,
    show_progress: bool,
    product_name: String,
}

impl RunPresenter {
    pub fn new(format: OutputFormat, product_name: impl Into<String>) -> Self {
        Self {
            format,
            show_progress: true,
            product_name: product_name.into(),
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Consume the stream; returns the terminal step
    pub async fn present(&self, mut stream: StepStream, cancel: CancellationToken) -> Option<AgentStep> {
        let renderer = StepRenderer::new(self.show_progress && self.format == OutputFormat::Text);
        let mut interrupt_armed = true;
        let mut terminal = None;

        loop {
            let step = tokio::select! {
                step = stream.next_step() => step,
                signal = tokio::signal::ctrl_c(), if interrupt_armed => {
                    interrupt_armed = false;
                    if signal.is_ok() {
                        debug!(run_id = stream.run_id(), "Interrupted, cancelling run");
                        renderer.set_message("Cancelling...");
                        cancel.cancel();
                    }
                    continue;
                }
            };
            let Some(step) = step else {
                break;
            };

            match self.format {
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_step_json(&step)),
                OutputFormat::Text if step.is_terminal() => {
                    renderer.finish();
                    print!("{}", ConsoleFormatter::format_terminal(&step, &self.product_name));
                }
                OutputFormat::Text => renderer.on_step(&step),
            }

            if step.is_terminal() {
                terminal = Some(step);
            }
        }

        renderer.finish();
        terminal
    }
}
