//! Single-collection operations that sit next to the transactional workflows.

mod accounts;
mod catalog;
mod reporting;
mod reviews;

pub use accounts::AccountService;
pub use catalog::CatalogService;
pub use reporting::ReportingService;
pub use reviews::ReviewService;

use document_store::StoreError;

use crate::error::DomainError;
use crate::repository::Entity;

/// Reports a unique index violation as a domain conflict.
fn unique_violation<D: Entity>(err: StoreError, reason: &str) -> DomainError {
    match err {
        StoreError::DuplicateKey { .. } => DomainError::conflict::<D>(reason),
        other => other.into(),
    }
}
