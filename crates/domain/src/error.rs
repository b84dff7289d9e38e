//! Domain-level error types.

use thiserror::Error;

/// Errors produced while constructing or mapping domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required text field was empty (or whitespace only).
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// A count field was zero.
    #[error("field '{0}' must be a positive integer")]
    NotPositive(&'static str),

    /// An external role representation did not name a known role.
    #[error("unknown worker role: '{0}'")]
    UnknownRole(String),
}
