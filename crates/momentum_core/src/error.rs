//! crates/momentum_core/src/error.rs
//!
//! The error taxonomy surfaced by the core's operations.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Malformed input. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The task is absent or belongs to another user.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A concurrent update won twice in a row.
    #[error("Concurrent update conflict: {0}")]
    ConcurrencyConflict(String),

    /// The storage collaborator failed.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl From<PortError> for DomainError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => DomainError::NotFound(what),
            PortError::Conflict(what) => DomainError::ConcurrencyConflict(what),
            PortError::Unexpected(what) => DomainError::Persistence(what),
        }
    }
}

/// A convenience type alias for `Result<T, DomainError>`.
pub type DomainResult<T> = Result<T, DomainError>;
