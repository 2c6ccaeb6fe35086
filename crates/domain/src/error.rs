//! Domain error types.

use std::fmt::Display;

use document_store::StoreError;
use thiserror::Error;

use crate::repository::Entity;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The entity does not exist or has been soft-deleted.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness rule was violated.
    #[error("{entity} conflict: {reason}")]
    Conflict { entity: &'static str, reason: String },

    /// The acting user may not perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Input violates a field constraint.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// An error occurred in the document store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Creates a `NotFound` error for an entity type.
    pub fn not_found<D: Entity>(id: impl Display) -> Self {
        DomainError::NotFound {
            entity: D::NAME,
            id: id.to_string(),
        }
    }

    /// Creates a `Conflict` error for an entity type.
    pub fn conflict<D: Entity>(reason: impl Into<String>) -> Self {
        DomainError::Conflict {
            entity: D::NAME,
            reason: reason.into(),
        }
    }
}
