//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, database).

use thiserror::Error;

use crate::constants::{CANNOT_UPDATE_PRODUCT, PRODUCT_NOT_FOUND};

/// Domain-specific errors for catalog rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity not found
    #[error("{0}")]
    NotFound(String),

    /// The request cannot be applied to the targeted entity
    #[error("{0}")]
    Rejected(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::NotFound(msg.into())
    }

    /// Create a rejected error
    pub fn rejected(msg: impl Into<String>) -> Self {
        DomainError::Rejected(msg.into())
    }

    /// The product could not be found.
    pub fn product_not_found() -> Self {
        DomainError::not_found(PRODUCT_NOT_FOUND)
    }

    /// The product update was refused.
    pub fn cannot_update_product() -> Self {
        DomainError::rejected(CANNOT_UPDATE_PRODUCT)
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
