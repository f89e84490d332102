//! Prompt templates for the support agent

use crate::corpus::PageSummary;
use crate::tool::entities::ToolSpec;

/// Templates for the documentation support agent
pub struct SupportPromptTemplate;

impl SupportPromptTemplate {
    /// System prompt for a run: role, grounding rules, tools, page list and
    /// answer format.
    ///
    /// `relevance_checked` is set when the relevance check has already run
    /// and its result is in the transcript.
    pub fn system(
        product: &str,
        pages: &[PageSummary],
        tool_spec: &ToolSpec,
        relevance_checked: bool,
    ) -> String {
        let tool_descriptions = tool_spec
            .all()
            .map(|t| {
                let params = t
                    .parameters
                    .iter()
                    .map(|p| {
                        let required = if p.required { ", required" } else { "" };
                        format!("    - {} ({}{}): {}", p.name, p.param_type, required, p.description)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("- **{}**: {}\n{}", t.name, t.description, params)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let page_list = if pages.is_empty() {
            "(no pages loaded)".to_string()
        } else {
            pages
                .iter()
                .map(|p| format!("- {}: {}", p.id, p.title))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let relevance_rule = if relevance_checked {
            format!(
                "The question has already been checked with check_relevance and is about {product}. Do not call check_relevance again."
            )
        } else {
            format!("Call check_relevance first to decide whether the question is about {product}.")
        };

        format!(
            r#"You are a helpful support assistant for {product}.

Your job is to answer questions about {product} using only its official documentation.

## Rules

1. {relevance_rule}
2. If the question is not about {product}, reply with exactly: IRRELEVANT
3. Otherwise use search_docs and get_doc to find the answer.
4. Only state facts that appear in documentation you retrieved with a tool. Do not guess.
5. Be concise but helpful, and mention which page your answer comes from.
6. If the documentation does not contain the answer, say so and suggest contacting the community.
7. Call one tool at a time.

## Available Tools

{tool_descriptions}

## Available Documentation (id: title)

{page_list}

## Answer Format

Write the answer as plain markdown. You may end it with up to 3 link buttons
pointing at the pages you used, in this exact form:

```buttons
[{{"label": "Page title", "url": "https://..."}}]
```
"#
        )
    }

    /// System prompt for the narrow relevance classifier
    pub fn relevance_system(product: &str, pages: &[PageSummary]) -> String {
        let titles = pages
            .iter()
            .map(|p| p.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"You decide whether a user question is about {product}.
The documentation covers: {titles}

Reply with only a JSON object and nothing else:
{{"relevant": true or false, "reason": "one short sentence"}}"#
        )
    }

    /// User prompt for the relevance classifier
    pub fn relevance_query(question: &str) -> String {
        format!("Question: {}", question)
    }
}
