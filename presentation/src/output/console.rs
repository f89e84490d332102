//! Console output formatting for agent steps

use colored::Colorize;
use docent_domain::{AgentStep, FailureKind, LinkButton, PageSummary};

/// Formats agent steps for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One step as a single JSON line
    pub fn format_step_json(step: &AgentStep) -> String {
        serde_json::to_string(step).unwrap_or_else(|_| "{}".to_string())
    }

    /// Progress line for a `tool_call` step; `None` for terminal steps
    pub fn format_tool_step(step: &AgentStep) -> Option<String> {
        let AgentStep::ToolCall {
            label,
            emoji,
            result,
            ..
        } = step
        else {
            return None;
        };

        let mut line = format!("{} {}", emoji, label);
        if let Some(error) = result.error() {
            line.push_str(&format!(" {}", format!("({})", error.message).red()));
        } else if let Some(count) = result.metadata.match_count {
            line.push_str(&format!(" {}", format!("[{}]", count).dimmed()));
        }
        Some(line)
    }

    /// Final output for a terminal step
    pub fn format_terminal(step: &AgentStep, product: &str) -> String {
        match step {
            AgentStep::Response { text, buttons } => {
                let mut output = format!("{}\n", text);
                let links = Self::format_buttons(buttons);
                if !links.is_empty() {
                    output.push_str(&format!("\n{}\n{}", "Related pages:".cyan().bold(), links));
                }
                output
            }
            AgentStep::Irrelevant { reason } => {
                let mut output = format!(
                    "{}\n",
                    format!(
                        "This question doesn't seem to be about {}. I can only help with its documentation.",
                        product
                    )
                    .yellow()
                );
                if !reason.is_empty() {
                    output.push_str(&format!("{}\n", format!("({})", reason).dimmed()));
                }
                output
            }
            AgentStep::Error { kind, message } => {
                let mut output = format!(
                    "{} {}\n",
                    format!("Could not answer ({}):", kind).red().bold(),
                    message
                );
                if *kind != FailureKind::Cancelled {
                    output.push_str("Try rephrasing the question, or ask the community for help.\n");
                }
                output
            }
            AgentStep::ToolCall { .. } => Self::format_tool_step(step).unwrap_or_default(),
        }
    }

    /// Renderable buttons as `  -> label: url` lines
    pub fn format_buttons(buttons: &[LinkButton]) -> String {
        buttons
            .iter()
            .filter(|b| b.is_renderable())
            .map(|b| format!("  -> {}: {}\n", b.label, b.url.as_deref().unwrap_or_default()))
            .collect()
    }

    /// Page listing for `--list-pages` and `/pages`
    pub fn format_pages(pages: &[PageSummary]) -> String {
        if pages.is_empty() {
            return "No documentation pages loaded.\n".to_string();
        }

        let mut output = format!("{}\n", format!("Documentation pages ({}):", pages.len()).cyan().bold());
        for page in pages {
            output.push_str(&format!("  {} {}", page.id.bold(), page.title));
            if !page.url.is_empty() {
                output.push_str(&format!(" {}", page.url.dimmed()));
            }
            output.push('\n');
        }
        output
    }
}
