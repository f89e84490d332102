//! Corpus domain entities

use serde::{Deserialize, Serialize};

/// Maximum snippet length (in bytes) returned with a search hit
pub const SNIPPET_MAX_BYTES: usize = 300;

/// One headed section of a documentation page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSection {
    /// Section heading (empty for the lead section)
    #[serde(default)]
    pub heading: String,
    /// Plain-text section body
    pub content: String,
}

impl DocSection {
    pub fn new(heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            content: content.into(),
        }
    }
}

/// A documentation page as produced by the ingestion pipeline (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocPage {
    /// Stable page identifier (slug), e.g. `"backup-guide"`
    #[serde(alias = "slug")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub sections: Vec<DocSection>,
}

impl DocPage {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: String::new(),
            sections: Vec::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_section(mut self, heading: impl Into<String>, content: impl Into<String>) -> Self {
        self.sections.push(DocSection::new(heading, content));
        self
    }

    /// Render the page as markdown-ish full text.
    ///
    /// ```
    /// use docent_domain::DocPage;
    ///
    /// let page = DocPage::new("faq", "FAQ").with_section("Billing", "Monthly.");
    /// assert_eq!(page.full_text(), "# FAQ\n\n\n## Billing\n\nMonthly.");
    /// ```
    pub fn full_text(&self) -> String {
        let mut parts = vec![format!("# {}\n", self.title)];
        for section in &self.sections {
            if !section.heading.is_empty() {
                parts.push(format!("\n## {}\n", section.heading));
            }
            parts.push(section.content.clone());
        }
        parts.join("\n")
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }
}

/// Lightweight page listing entry (no content)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// A ranked search match against one section of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub heading: String,
    pub snippet: String,
    pub score: f64,
}

/// Result of fetching a page by identifier.
///
/// `found = false` is a normal outcome (unknown id, or no corpus loaded yet),
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedDoc {
    pub found: bool,
    pub id: String,
    pub title: String,
    pub url: String,
    pub full_text: String,
}

impl FetchedDoc {
    pub fn found(page: &DocPage) -> Self {
        Self {
            found: true,
            id: page.id.clone(),
            title: page.title.clone(),
            url: page.url.clone(),
            full_text: page.full_text(),
        }
    }

    pub fn missing(id: impl Into<String>) -> Self {
        Self {
            found: false,
            id: id.into(),
            title: String::new(),
            url: String::new(),
            full_text: String::new(),
        }
    }
}

/// Build a search snippet: the first [`SNIPPET_MAX_BYTES`] of the content,
/// with `...` appended when truncated.
pub fn make_snippet(content: &str) -> String {
    if content.len() <= SNIPPET_MAX_BYTES {
        content.to_string()
    } else {
        format!("{}...", crate::util::truncate_str(content, SNIPPET_MAX_BYTES))
    }
}
