use async_trait::async_trait;
use uuid::Uuid;

use crate::{Document, Filter, Result, StoredDocument, Update};

/// Core trait for document store implementations.
///
/// Reads made directly on the store see the latest committed state. All
/// writes go through a [`StoreTransaction`] obtained from [`DocumentStore::begin`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The transaction handle type of this store.
    type Transaction: StoreTransaction + 'static;

    /// Opens a new transaction.
    async fn begin(&self) -> Result<Self::Transaction>;

    /// Retrieves a committed document by primary key.
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>>;

    /// Retrieves committed documents matching a filter, oldest first.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>>;

    /// Counts committed documents matching a filter.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64>;
}

/// A transaction-scoped handle.
///
/// Writes made through the handle are invisible to other readers until
/// [`commit`](StoreTransaction::commit) succeeds. Dropping the handle without
/// committing discards them.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Retrieves a document as seen by this transaction.
    async fn get(&mut self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>>;

    /// Retrieves documents matching a filter as seen by this transaction.
    async fn find(&mut self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>>;

    /// Inserts a new document.
    async fn insert(
        &mut self,
        collection: &str,
        id: Uuid,
        body: serde_json::Value,
    ) -> Result<StoredDocument>;

    /// Applies `update` to one document if it still matches `guard`.
    ///
    /// Returns the updated document, or `None` if no document was affected.
    async fn update_one(
        &mut self,
        collection: &str,
        id: Uuid,
        guard: &Filter,
        update: &Update,
    ) -> Result<Option<StoredDocument>>;

    /// Applies `update` to every document matching `filter`.
    ///
    /// Returns the number of affected documents.
    async fn update_many(&mut self, collection: &str, filter: &Filter, update: &Update)
    -> Result<u64>;

    /// Removes one document, returning it if it existed.
    async fn delete_one(&mut self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>>;

    /// Removes every document matching `filter`, returning how many were removed.
    async fn delete_many(&mut self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Makes all writes of this transaction visible atomically.
    async fn commit(self) -> Result<()>;

    /// Discards all writes of this transaction.
    async fn rollback(self) -> Result<()>;
}

/// Typed read helpers for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Retrieves and decodes a committed document.
    async fn get_document<D: Document>(&self, id: Uuid) -> Result<Option<D>> {
        self.get(D::COLLECTION, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Retrieves and decodes committed documents matching a filter.
    async fn find_documents<D: Document>(&self, filter: &Filter) -> Result<Vec<D>> {
        self.find(D::COLLECTION, filter)
            .await?
            .iter()
            .map(StoredDocument::decode)
            .collect()
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Typed helpers for transaction handles.
#[async_trait]
pub trait TransactionExt: StoreTransaction {
    /// Retrieves and decodes a document inside the transaction.
    async fn get_document<D: Document>(&mut self, id: Uuid) -> Result<Option<D>> {
        self.get(D::COLLECTION, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Retrieves and decodes documents matching a filter inside the transaction.
    async fn find_documents<D: Document>(&mut self, filter: &Filter) -> Result<Vec<D>> {
        self.find(D::COLLECTION, filter)
            .await?
            .iter()
            .map(StoredDocument::decode)
            .collect()
    }

    /// Serializes and inserts a document.
    async fn insert_document<D: Document>(&mut self, document: &D) -> Result<()> {
        let body = serde_json::to_value(document)?;
        self.insert(D::COLLECTION, document.document_id(), body)
            .await?;
        Ok(())
    }

    /// Updates a document and returns its new state, or `None` if the guard did not match.
    async fn update_document<D: Document>(
        &mut self,
        id: Uuid,
        guard: &Filter,
        update: &Update,
    ) -> Result<Option<D>> {
        self.update_one(D::COLLECTION, id, guard, update)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Removes a document and returns its last state.
    async fn delete_document<D: Document>(&mut self, id: Uuid) -> Result<Option<D>> {
        self.delete_one(D::COLLECTION, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }
}

impl<T: StoreTransaction + ?Sized> TransactionExt for T {}
