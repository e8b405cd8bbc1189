//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic input failures. Inference and storage
/// problems are absorbed by the resolvers and never reach this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. missing request field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A month key could not be parsed or is out of range.
    #[error("invalid month: {0}")]
    InvalidMonth(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_month(msg: impl Into<String>) -> Self {
        Self::InvalidMonth(msg.into())
    }
}
