//! Parsing of final planner answers.
//!
//! The planner ends a run with plain text. Two conventions are layered on top:
//!
//! - the bare word `IRRELEVANT` means the question is off-topic;
//! - a trailing ` ```buttons` fence holds a JSON array of
//!   `{"label": ..., "url": ...}` link suggestions, stripped from the text.

use super::step::{LinkButton, MAX_LINK_BUTTONS};
use serde::Deserialize;

/// Sentinel answer meaning "not about the documented product"
pub const IRRELEVANT_SENTINEL: &str = "IRRELEVANT";

/// A final answer split into display text and link buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub text: String,
    pub buttons: Vec<LinkButton>,
}

#[derive(Deserialize)]
struct RawButton {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawButtons {
    List(Vec<RawButton>),
    Wrapped { buttons: Vec<RawButton> },
}

/// True when the answer is exactly the irrelevance sentinel (trimmed, any case)
pub fn is_irrelevant_sentinel(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(IRRELEVANT_SENTINEL)
}

/// Split an answer into text and at most [`MAX_LINK_BUTTONS`] buttons.
///
/// Malformed button blocks are left in the text untouched.
pub fn parse_answer(answer: &str) -> ParsedAnswer {
    let Some((text, block)) = split_buttons_block(answer) else {
        return ParsedAnswer {
            text: answer.trim().to_string(),
            buttons: Vec::new(),
        };
    };

    match serde_json::from_str::<RawButtons>(&block) {
        Ok(raw) => {
            let raw = match raw {
                RawButtons::List(list) => list,
                RawButtons::Wrapped { buttons } => buttons,
            };
            let buttons = raw
                .into_iter()
                .filter_map(to_button)
                .take(MAX_LINK_BUTTONS)
                .collect();
            ParsedAnswer {
                text: text.trim_end().to_string(),
                buttons,
            }
        }
        Err(_) => ParsedAnswer {
            text: answer.trim().to_string(),
            buttons: Vec::new(),
        },
    }
}

fn to_button(raw: RawButton) -> Option<LinkButton> {
    let label = raw.label.map(|l| l.trim().to_string()).unwrap_or_default();
    let url = raw
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    if label.is_empty() && url.is_none() {
        return None;
    }
    let label = if label.is_empty() {
        url.clone().unwrap_or_default()
    } else {
        label
    };
    Some(LinkButton::new(label, url))
}

/// Find the last ` ```buttons` fence; return (text before it, block body)
fn split_buttons_block(answer: &str) -> Option<(String, String)> {
    let lines: Vec<&str> = answer.lines().collect();
    let start = lines.iter().rposition(|l| l.trim() == "```buttons")?;
    let end = lines[start + 1..]
        .iter()
        .position(|l| l.trim() == "```")
        .map(|offset| start + 1 + offset)?;

    // Only a trailing block counts
    if lines[end + 1..].iter().any(|l| !l.trim().is_empty()) {
        return None;
    }

    let text = lines[..start].join("\n");
    let block = lines[start + 1..end].join("\n");
    Some((text, block))
}
