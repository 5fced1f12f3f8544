use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;
use validator::ValidationErrors;

use crate::identity::IdentityError;

/// Kind of record an operation was looking for or colliding with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Product,
    Category,
    CartItem,
    Status,
    Order,
    Role,
    User,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Product => "Product",
            Resource::Category => "Category",
            Resource::CartItem => "Cart item",
            Resource::Status => "Status",
            Resource::Order => "Order",
            Resource::Role => "Role",
            Resource::User => "User",
        };
        f.write_str(name)
    }
}

/// Outcome of a workflow operation that did not succeed.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(Resource),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0} already exists")]
    Conflict(Resource),
    /// The target exists but the write changed nothing.
    #[error("No record was modified")]
    WriteFailed,
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Access denied")]
    Forbidden,
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        ServiceError::Validation(value.to_string())
    }
}

impl From<IdentityError> for ServiceError {
    fn from(value: IdentityError) -> Self {
        match value {
            IdentityError::DuplicateEmail => ServiceError::Conflict(Resource::User),
            IdentityError::DuplicateRole => ServiceError::Conflict(Resource::Role),
            IdentityError::RoleNotFound(_) => ServiceError::NotFound(Resource::Role),
            IdentityError::UserNotFound => ServiceError::NotFound(Resource::User),
            IdentityError::PasswordPolicy(reason) => ServiceError::Validation(reason),
            IdentityError::PasswordAlreadySet => {
                ServiceError::Validation(IdentityError::PasswordAlreadySet.to_string())
            }
            IdentityError::Hash(reason) => ServiceError::Internal(reason),
            IdentityError::Database(err) => ServiceError::Database(err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
