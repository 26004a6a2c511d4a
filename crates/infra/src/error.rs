//! Workflow error union.

use thiserror::Error;

use dealership_auth::{AuthzError, PasswordError, TokenIssueError};
use dealership_core::DomainError;

use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Any failure a workflow can surface. The HTTP layer maps each variant to
/// exactly one status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenIssueError),
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        ServiceError::Domain(value.into())
    }
}

impl ServiceError {
    pub fn unauthenticated() -> Self {
        ServiceError::Domain(DomainError::Unauthenticated)
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::Domain(DomainError::not_found(what))
    }
}
