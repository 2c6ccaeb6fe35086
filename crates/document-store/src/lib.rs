//! Transactional document store.
//!
//! Documents are JSON bodies grouped in named collections. Every write goes
//! through a [`StoreTransaction`]; the [`TransactionCoordinator`] wraps a
//! transaction around a body of work and commits or aborts it as one unit.

pub mod coordinator;
pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use coordinator::TransactionCoordinator;
pub use document::{Document, StoredDocument, Version};
pub use error::{Result, StoreError};
pub use memory::{InMemoryDocumentStore, InMemoryTransaction};
pub use postgres::{PostgresDocumentStore, PostgresTransaction};
pub use query::{ACTIVE_FIELD, Filter, Update};
pub use store::{DocumentStore, DocumentStoreExt, StoreTransaction, TransactionExt};
