use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Filter, Result, StoreError, StoredDocument, Update, Version,
    store::{DocumentStore, StoreTransaction},
};

type Collection = BTreeMap<Uuid, StoredDocument>;
type Collections = HashMap<String, Collection>;

/// In-memory document store for tests and local development.
///
/// Transactions run under snapshot isolation: each transaction works on a
/// private copy of the data taken when it began. At commit every document the
/// transaction wrote is checked against the committed version it started
/// from; if another transaction committed a write to the same document first,
/// the commit fails with [`StoreError::ConcurrencyConflict`] and nothing is
/// applied.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write to `collection` fail with [`StoreError::WriteFailed`].
    pub fn fail_writes_to(&self, collection: &str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(collection.to_string());
    }

    /// Clears all injected write failures.
    pub fn clear_failures(&self) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns the number of committed documents in a collection.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Removes every committed document.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
    }
}

fn sorted_matches(collection: Option<&Collection>, filter: &Filter) -> Vec<StoredDocument> {
    let mut docs: Vec<_> = collection
        .into_iter()
        .flat_map(BTreeMap::values)
        .filter(|doc| filter.matches(&doc.body))
        .cloned()
        .collect();
    docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    docs
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction> {
        let snapshot = self.collections.read().await.clone();
        Ok(InMemoryTransaction {
            shared: Arc::clone(&self.collections),
            failing: Arc::clone(&self.failing),
            workspace: snapshot,
            base_versions: HashMap::new(),
        })
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>> {
        let store = self.collections.read().await;
        Ok(store.get(collection).and_then(|c| c.get(&id)).cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>> {
        let store = self.collections.read().await;
        Ok(sorted_matches(store.get(collection), filter))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let store = self.collections.read().await;
        let count = store
            .get(collection)
            .map_or(0, |c| c.values().filter(|doc| filter.matches(&doc.body)).count());
        Ok(count as u64)
    }
}

/// Transaction handle of [`InMemoryDocumentStore`].
pub struct InMemoryTransaction {
    shared: Arc<RwLock<Collections>>,
    failing: Arc<Mutex<HashSet<String>>>,
    workspace: Collections,
    /// Committed version of every document this transaction wrote, captured
    /// before its first write. `None` means the document did not exist.
    base_versions: HashMap<(String, Uuid), Option<Version>>,
}

impl InMemoryTransaction {
    fn check_writable(&self, collection: &str) -> Result<()> {
        let failing = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing.contains(collection) {
            return Err(StoreError::WriteFailed {
                collection: collection.to_string(),
                reason: "injected write failure".to_string(),
            });
        }
        Ok(())
    }

    fn touch(&mut self, collection: &str, id: Uuid) {
        let current = self
            .workspace
            .get(collection)
            .and_then(|c| c.get(&id))
            .map(|doc| doc.version);
        self.base_versions
            .entry((collection.to_string(), id))
            .or_insert(current);
    }

    fn apply_update(doc: &mut StoredDocument, update: &Update) -> Result<()> {
        let mut body = doc.body.clone();
        update.apply(&mut body)?;
        doc.body = body;
        doc.version = doc.version.next();
        doc.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn get(&mut self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>> {
        Ok(self
            .workspace
            .get(collection)
            .and_then(|c| c.get(&id))
            .cloned())
    }

    async fn find(&mut self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>> {
        Ok(sorted_matches(self.workspace.get(collection), filter))
    }

    async fn insert(
        &mut self,
        collection: &str,
        id: Uuid,
        body: serde_json::Value,
    ) -> Result<StoredDocument> {
        self.check_writable(collection)?;

        let exists = self
            .workspace
            .get(collection)
            .is_some_and(|c| c.contains_key(&id));
        if exists {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                constraint: "primary_key".to_string(),
            });
        }

        self.touch(collection, id);
        let doc = StoredDocument::new(collection, id, body);
        self.workspace
            .entry(collection.to_string())
            .or_default()
            .insert(id, doc.clone());
        Ok(doc)
    }

    async fn update_one(
        &mut self,
        collection: &str,
        id: Uuid,
        guard: &Filter,
        update: &Update,
    ) -> Result<Option<StoredDocument>> {
        self.check_writable(collection)?;

        let matches = self
            .workspace
            .get(collection)
            .and_then(|c| c.get(&id))
            .is_some_and(|doc| guard.matches(&doc.body));
        if !matches {
            return Ok(None);
        }

        self.touch(collection, id);
        let Some(doc) = self
            .workspace
            .get_mut(collection)
            .and_then(|c| c.get_mut(&id))
        else {
            return Ok(None);
        };
        Self::apply_update(doc, update)?;
        Ok(Some(doc.clone()))
    }

    async fn update_many(
        &mut self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64> {
        self.check_writable(collection)?;

        let ids: Vec<Uuid> = sorted_matches(self.workspace.get(collection), filter)
            .into_iter()
            .map(|doc| doc.id)
            .collect();

        for id in &ids {
            self.touch(collection, *id);
            if let Some(doc) = self
                .workspace
                .get_mut(collection)
                .and_then(|c| c.get_mut(id))
            {
                Self::apply_update(doc, update)?;
            }
        }

        Ok(ids.len() as u64)
    }

    async fn delete_one(&mut self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>> {
        self.check_writable(collection)?;

        self.touch(collection, id);
        Ok(self
            .workspace
            .get_mut(collection)
            .and_then(|c| c.remove(&id)))
    }

    async fn delete_many(&mut self, collection: &str, filter: &Filter) -> Result<u64> {
        self.check_writable(collection)?;

        let ids: Vec<Uuid> = sorted_matches(self.workspace.get(collection), filter)
            .into_iter()
            .map(|doc| doc.id)
            .collect();

        for id in &ids {
            self.touch(collection, *id);
            if let Some(c) = self.workspace.get_mut(collection) {
                c.remove(id);
            }
        }

        Ok(ids.len() as u64)
    }

    async fn commit(self) -> Result<()> {
        let mut store = self.shared.write().await;

        // First committer wins: every written document must still be at the
        // version this transaction started from.
        for ((collection, id), base) in &self.base_versions {
            let committed = store
                .get(collection)
                .and_then(|c| c.get(id))
                .map(|doc| doc.version);
            if committed != *base {
                return Err(StoreError::ConcurrencyConflict {
                    collection: collection.clone(),
                    reason: format!("document {id} was modified by another transaction"),
                });
            }
        }

        for (collection, id) in self.base_versions.keys() {
            match self.workspace.get(collection).and_then(|c| c.get(id)) {
                Some(doc) => {
                    store
                        .entry(collection.clone())
                        .or_default()
                        .insert(*id, doc.clone());
                }
                None => {
                    if let Some(c) = store.get_mut(collection) {
                        c.remove(id);
                    }
                }
            }
        }

        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}
