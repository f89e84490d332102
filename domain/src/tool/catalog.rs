//! The fixed set of documentation tools offered to the planner.
//!
//! Declared once here so the registry, the schema converter and the system
//! prompt all describe the same tools.

use super::entities::{ParamType, ToolCall, ToolDefinition, ToolParameter, ToolSpec};

pub const CHECK_RELEVANCE: &str = "check_relevance";
pub const SEARCH_DOCS: &str = "search_docs";
pub const GET_DOC: &str = "get_doc";

/// Default number of search results when the planner omits `limit`
pub const DEFAULT_SEARCH_LIMIT: usize = 5;
/// Upper bound for `search_docs.limit`
pub const MAX_SEARCH_LIMIT: usize = 10;

/// Clamp a requested search limit into `1..=MAX_SEARCH_LIMIT`
pub fn clamp_search_limit(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(n) if n < 1 => 1,
        Some(n) => (n as usize).min(MAX_SEARCH_LIMIT),
        None => default.clamp(1, MAX_SEARCH_LIMIT),
    }
}

pub fn check_relevance_definition() -> ToolDefinition {
    ToolDefinition::new(
        CHECK_RELEVANCE,
        "Check whether the user's question is about the product this documentation covers. \
         Call this first. If it returns relevant=false, stop.",
    )
    .with_parameter(ToolParameter::new("question", "The user's question", true))
    .with_parameter(
        ToolParameter::new(
            "is_relevant",
            "Your own assessment: true if the question is about the documented product",
            false,
        )
        .with_type(ParamType::Boolean),
    )
    .with_parameter(ToolParameter::new(
        "reasoning",
        "Brief reason for the assessment",
        false,
    ))
}

pub fn search_docs_definition() -> ToolDefinition {
    ToolDefinition::new(
        SEARCH_DOCS,
        "Search the documentation. Returns matching sections with page id, title, \
         heading and a short snippet.",
    )
    .with_parameter(ToolParameter::new("query", "Search keywords", true))
    .with_parameter(
        ToolParameter::new(
            "limit",
            "Maximum number of results (1-10, default 5)",
            false,
        )
        .with_type(ParamType::Integer),
    )
}

pub fn get_doc_definition() -> ToolDefinition {
    ToolDefinition::new(
        GET_DOC,
        "Read the full content of one documentation page by its id. \
         Use ids from the page list or from search results.",
    )
    .with_parameter(ToolParameter::new("id", "Page id, e.g. \"backup-guide\"", true))
}

/// All documentation tools plus the aliases planners commonly use for them
pub fn docs_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register(check_relevance_definition())
        .register(search_docs_definition())
        .register(get_doc_definition())
        .register_aliases([
            ("relevance", CHECK_RELEVANCE),
            ("check_relevant", CHECK_RELEVANCE),
            ("search", SEARCH_DOCS),
            ("search_documentation", SEARCH_DOCS),
            ("get_document", GET_DOC),
            ("read_doc", GET_DOC),
            ("fetch_doc", GET_DOC),
        ])
}

/// Emoji shown next to a tool step
pub fn tool_emoji(tool_name: &str) -> &'static str {
    match tool_name {
        CHECK_RELEVANCE => "🤔",
        SEARCH_DOCS => "🔍",
        GET_DOC => "📖",
        _ => "🔧",
    }
}

/// Short human-readable description of a tool call
pub fn tool_label(call: &ToolCall) -> String {
    match call.tool_name.as_str() {
        CHECK_RELEVANCE => "Checking if this question is about the docs...".to_string(),
        SEARCH_DOCS => format!(
            "Searching docs for \"{}\"...",
            call.get_string("query").unwrap_or_default()
        ),
        GET_DOC => format!(
            "Reading \"{}\" documentation...",
            call.get_string("id").unwrap_or_default()
        ),
        other => format!("Running {}...", other),
    }
}
