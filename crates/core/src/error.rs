//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (field checks, unknown
/// vocabulary). Transport and storage concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. a blank form field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A role name outside of student/instructor/funder.
    #[error("invalid role: {0}")]
    InvalidRole(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_role(msg: impl Into<String>) -> Self {
        Self::InvalidRole(msg.into())
    }
}
