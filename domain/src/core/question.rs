//! Question value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A user question to be answered from the documentation (Value Object)
///
/// Always holds non-blank text; surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a new question, rejecting blank input
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidQuestion(
                "question cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Question {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Question::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_creation() {
        let q = Question::new("How do I make a backup?").unwrap();
        assert_eq!(q.content(), "How do I make a backup?");
    }

    #[test]
    fn test_question_is_trimmed() {
        let q = Question::new("  templates?\n").unwrap();
        assert_eq!(q.content(), "templates?");
    }

    #[test]
    fn test_blank_question_rejected() {
        assert!(Question::new("").is_err());
        assert!(Question::new("   \t").is_err());
        assert!(matches!(
            Question::try_from(" "),
            Err(DomainError::InvalidQuestion(_))
        ));
    }
}
