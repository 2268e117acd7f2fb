use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Failures of the lead store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("lead not found")]
    NotFound,

    /// A unique index rejected the write; carries the SQLite message.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    /// A stored row no longer satisfies the domain invariants.
    #[error("invalid stored lead: {0}")]
    ValidationError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

fn from_database_error(kind: DatabaseErrorKind, message: String) -> RepositoryError {
    match kind {
        DatabaseErrorKind::UniqueViolation => RepositoryError::DuplicateKey(message),
        DatabaseErrorKind::CheckViolation
        | DatabaseErrorKind::NotNullViolation
        | DatabaseErrorKind::ForeignKeyViolation => RepositoryError::ConstraintViolation(message),
        DatabaseErrorKind::ClosedConnection => RepositoryError::ConnectionError(message),
        _ => RepositoryError::DatabaseError(message),
    }
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => {
                from_database_error(kind, info.message().to_string())
            }
            DieselError::DeserializationError(e) => RepositoryError::ValidationError(e.to_string()),
            other => RepositoryError::Unexpected(other.to_string()),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(err.to_string())
    }
}
