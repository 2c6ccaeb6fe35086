//! Workflow error types.

use common::{OrderId, ProductId, ShopId};
use document_store::StoreError;
use domain::DomainError;
use thiserror::Error;

/// Errors that can occur while running a workflow.
///
/// Every error raised inside a workflow aborts its transaction before it is
/// returned. Nothing is retried automatically; callers may retry when
/// [`is_retryable`](WorkflowError::is_retryable) is true.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A referenced entity is missing or soft-deleted.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness rule was violated.
    #[error("{entity} conflict: {reason}")]
    Conflict { entity: &'static str, reason: String },

    /// A line item asks for more units than are in stock.
    #[error("Insufficient inventory for product {product}: requested {requested}, available {available}")]
    InsufficientInventory {
        product: ProductId,
        requested: u32,
        available: i64,
    },

    /// A guarded write lost to a concurrent transaction.
    #[error("Concurrent update conflict: {reason}")]
    ConcurrentUpdateConflict { reason: String },

    /// A secondary write of a cascade failed; the primary write was rolled back.
    #[error("Cascade step '{step}' failed: {reason}")]
    CascadeFailed { step: &'static str, reason: String },

    /// The order could not be marked as paid.
    #[error("Failed to update associated order {order}")]
    PaymentAssociationFailed { order: OrderId },

    #[error("Already following shop {shop}")]
    AlreadyFollowing { shop: ShopId },

    #[error("Not following shop {shop}")]
    NotFollowing { shop: ShopId },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// The payment gateway rejected a request.
    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl WorkflowError {
    /// Returns true if running the workflow again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::ConcurrentUpdateConflict { .. })
    }

    /// Wraps a storage failure of the named cascade step.
    pub fn cascade(step: &'static str) -> impl FnOnce(StoreError) -> WorkflowError {
        move |err| WorkflowError::CascadeFailed {
            step,
            reason: err.to_string(),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConcurrencyConflict { collection, reason } => {
                WorkflowError::ConcurrentUpdateConflict {
                    reason: format!("{collection}: {reason}"),
                }
            }
            StoreError::DuplicateKey {
                collection,
                constraint,
            } => WorkflowError::Conflict {
                entity: "Document",
                reason: format!("{collection} violates {constraint}"),
            },
            other => WorkflowError::Store(other),
        }
    }
}

impl From<DomainError> for WorkflowError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity, id } => WorkflowError::NotFound { entity, id },
            DomainError::Conflict { entity, reason } => WorkflowError::Conflict { entity, reason },
            DomainError::Forbidden(reason) => WorkflowError::Forbidden(reason),
            DomainError::Validation(reason) => WorkflowError::Validation(reason),
            DomainError::Store(err) => err.into(),
        }
    }
}

/// Convenience type alias for workflow results.
pub type Result<T> = std::result::Result<T, WorkflowError>;
