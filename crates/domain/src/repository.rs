//! Soft-delete aware access to entity collections.
//!
//! [`Repository`] serves committed reads and single-document writes.
//! [`EntityTransactionExt`] offers the same lookups inside a running
//! transaction, which is where multi-entity workflows check their
//! preconditions.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use document_store::{
    ACTIVE_FIELD, Document, DocumentStore, DocumentStoreExt, Filter, StoreTransaction,
    TransactionCoordinator, TransactionExt, Update,
};
use uuid::Uuid;

use crate::error::DomainError;

/// A document type with soft-delete semantics.
pub trait Entity: Document + Clone {
    /// Human-readable entity name used in errors and metrics.
    const NAME: &'static str;

    fn is_active(&self) -> bool;
}

/// Stamps `updated_at` on an update.
pub fn touched(update: Update) -> Update {
    update.set("updated_at", Utc::now().to_rfc3339())
}

/// Typed repository over one entity collection.
pub struct Repository<S, D> {
    coordinator: TransactionCoordinator<S>,
    _entity: PhantomData<fn() -> D>,
}

impl<S: DocumentStore, D: Entity> Repository<S, D> {
    pub fn new(store: S) -> Self {
        Self {
            coordinator: TransactionCoordinator::new(store),
            _entity: PhantomData,
        }
    }

    /// Returns the entity if it exists and is active.
    pub async fn find_active(&self, id: impl Into<Uuid>) -> Result<Option<D>, DomainError> {
        let entity: Option<D> = self.coordinator.store().get_document(id.into()).await?;
        Ok(entity.filter(Entity::is_active))
    }

    /// Returns the entity, or `NotFound` if it is missing or soft-deleted.
    pub async fn require_active(&self, id: impl Into<Uuid>) -> Result<D, DomainError> {
        let id = id.into();
        self.find_active(id)
            .await?
            .ok_or_else(|| DomainError::not_found::<D>(id))
    }

    /// Lists active entities matching `filter`, oldest first.
    pub async fn list_active(&self, filter: Filter) -> Result<Vec<D>, DomainError> {
        let filter = filter.eq(ACTIVE_FIELD, true);
        Ok(self.coordinator.store().find_documents(&filter).await?)
    }

    /// Counts active entities matching `filter`.
    pub async fn count_active(&self, filter: Filter) -> Result<u64, DomainError> {
        let filter = filter.eq(ACTIVE_FIELD, true);
        Ok(self.coordinator.store().count(D::COLLECTION, &filter).await?)
    }

    /// Persists a new entity in its own transaction.
    #[tracing::instrument(skip(self, entity), fields(entity = D::NAME))]
    pub async fn insert(&self, entity: D) -> Result<D, DomainError> {
        let inserted = self
            .coordinator
            .run("repository_insert", move |tx| {
                Box::pin(async move {
                    tx.insert_document(&entity).await?;
                    Ok::<_, DomainError>(entity)
                })
            })
            .await?;
        metrics::counter!("entities_created_total", "entity" => D::NAME).increment(1);
        Ok(inserted)
    }

    /// Marks the entity inactive in its own transaction.
    #[tracing::instrument(skip(self, id), fields(entity = D::NAME))]
    pub async fn soft_delete(&self, id: impl Into<Uuid>) -> Result<D, DomainError> {
        let id = id.into();
        let deleted = self
            .coordinator
            .run("repository_soft_delete", move |tx| {
                Box::pin(async move { tx.deactivate::<D>(id).await })
            })
            .await?;
        metrics::counter!("entities_deactivated_total", "entity" => D::NAME).increment(1);
        Ok(deleted)
    }
}

/// Entity lookups and soft deletes inside a transaction.
#[async_trait]
pub trait EntityTransactionExt: StoreTransaction {
    /// Returns the entity as seen by this transaction if it is active.
    async fn find_active<D: Entity>(&mut self, id: Uuid) -> Result<Option<D>, DomainError> {
        let entity: Option<D> = self.get_document(id).await?;
        Ok(entity.filter(Entity::is_active))
    }

    /// Returns the active entity or `NotFound`.
    async fn require_active<D: Entity>(&mut self, id: Uuid) -> Result<D, DomainError> {
        self.find_active::<D>(id)
            .await?
            .ok_or_else(|| DomainError::not_found::<D>(id))
    }

    /// Returns the active entity after a guarded no-op write on it.
    ///
    /// The write puts the entity in the transaction's write set, so a
    /// concurrent writer of the same entity either waits for this transaction
    /// or makes it fail at commit. The returned state is the one this
    /// transaction will commit against.
    async fn confirm_active<D: Entity>(&mut self, id: Uuid) -> Result<D, DomainError> {
        self.update_document::<D>(id, &Filter::active(), &Update::new())
            .await?
            .ok_or_else(|| DomainError::not_found::<D>(id))
    }

    /// Flips `is_active` to false, guarded on the entity still being active.
    async fn deactivate<D: Entity>(&mut self, id: Uuid) -> Result<D, DomainError> {
        let update = touched(Update::new().set(ACTIVE_FIELD, false));
        self.update_document::<D>(id, &Filter::active(), &update)
            .await?
            .ok_or_else(|| DomainError::not_found::<D>(id))
    }
}

impl<T: StoreTransaction + ?Sized> EntityTransactionExt for T {}
