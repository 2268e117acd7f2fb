use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;
use crate::dto::api::FieldError;
use crate::forms::field_errors;
use crate::repository::errors::RepositoryError;

/// Outcomes a lead workflow can end with besides success.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("access denied")]
    AccessDenied,

    #[error("not found")]
    NotFound,

    #[error("lead with this email already exists")]
    DuplicateEmail,

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    TypeConstraint(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::DuplicateKey(_) => ServiceError::DuplicateEmail,
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(err.to_string())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(field_errors(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_outcomes() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::DuplicateKey("leads.email".into())),
            ServiceError::DuplicateEmail
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::ConnectionError("pool timed out".into())),
            ServiceError::Internal(_)
        ));
    }
}
