//! Relevance verdict value object.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Whether a question falls within the documented domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    pub relevant: bool,
    #[serde(default)]
    pub reason: String,
}

impl RelevanceVerdict {
    pub fn relevant(reason: impl Into<String>) -> Self {
        Self {
            relevant: true,
            reason: reason.into(),
        }
    }

    pub fn irrelevant(reason: impl Into<String>) -> Self {
        Self {
            relevant: false,
            reason: reason.into(),
        }
    }

    /// Tool payload shape for `check_relevance`
    pub fn to_payload(&self) -> Value {
        json!({"relevant": self.relevant, "reason": self.reason})
    }

    /// Read a verdict back from a `check_relevance` payload.
    ///
    /// Accepts `is_relevant` as a synonym for `relevant`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let relevant = payload
            .get("relevant")
            .or_else(|| payload.get("is_relevant"))
            .and_then(Value::as_bool)?;
        let reason = payload
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self { relevant, reason })
    }
}
