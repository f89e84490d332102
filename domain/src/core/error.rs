//! Domain error types

use thiserror::Error;

/// Errors raised while constructing domain values
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
}
