//! Application-level error types.

use db::DbError;
use domain::{DomainError, Entity};
use thiserror::Error;

/// Startup and routing failures of the [`crate::Dispatcher`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The same request type was registered more than once.
    #[error("more than one handler registered for '{0}'")]
    DuplicateHandler(&'static str),

    /// A request type declared as expected has no handler.
    #[error("no handler registered for '{0}'")]
    MissingHandler(&'static str),

    /// A request was sent whose type the dispatcher was never built with.
    #[error("request '{0}' has no route")]
    Unroutable(&'static str),
}

/// Discriminant of [`AppError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidMapping,
    Validation,
    Infrastructure,
    Dispatch,
}

/// Every failure a handler can return.
#[derive(Debug, Error)]
pub enum AppError {
    /// The requested identifier does not exist.  An expected outcome.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// An external representation named no known enumeration value.
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("validation failed: {0}")]
    Validation(DomainError),

    /// Storage failed; fatal for the current request.
    #[error("infrastructure failure: {0}")]
    Infrastructure(DbError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl AppError {
    pub fn not_found<T: Entity>() -> Self {
        Self::NotFound { entity: T::NAME }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. }   => ErrorKind::NotFound,
            Self::InvalidMapping(_) => ErrorKind::InvalidMapping,
            Self::Validation(_)     => ErrorKind::Validation,
            Self::Infrastructure(_) => ErrorKind::Infrastructure,
            Self::Dispatch(_)       => ErrorKind::Dispatch,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnknownRole(_) => Self::InvalidMapping(err.to_string()),
            other => Self::Validation(other),
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InvalidRow(inner @ DomainError::UnknownRole(_)) => {
                Self::InvalidMapping(inner.to_string())
            }
            other => Self::Infrastructure(other),
        }
    }
}
