//! Typed error type for the db crate.

use domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A staged change no longer matches committed state (e.g. the row was
    /// removed by a concurrent request).  The whole commit is rejected.
    #[error("{entity} '{id}' {reason}")]
    Conflict {
        entity: &'static str,
        id: String,
        reason: &'static str,
    },

    /// The request's cancellation token fired before the call completed.
    #[error("operation cancelled")]
    Cancelled,

    /// A stored row does not satisfy the domain invariants.
    #[error("invalid stored row: {0}")]
    InvalidRow(#[from] DomainError),

    /// A stored integer does not fit the domain type.
    #[error("stored value for '{0}' is out of range")]
    OutOfRange(&'static str),

    /// The backing store refused the commit.
    #[error("storage unavailable")]
    Unavailable,
}

impl DbError {
    pub(crate) fn conflict<T: domain::Entity>(id: T::Id, reason: &'static str) -> Self {
        Self::Conflict {
            entity: T::NAME,
            id: id.to_string(),
            reason,
        }
    }
}
