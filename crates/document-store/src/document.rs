use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Revision number of a stored document, used for optimistic concurrency control.
///
/// A document is inserted at version 1 and every write increments it by 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version assigned on insert.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A document as persisted by the store, with its bookkeeping columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Name of the collection the document belongs to.
    pub collection: String,

    /// Primary key within the collection.
    pub id: Uuid,

    /// Current revision.
    pub version: Version,

    /// The JSON body.
    pub body: serde_json::Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Creates a freshly inserted document at the first version.
    pub fn new(collection: impl Into<String>, id: Uuid, body: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            collection: collection.into(),
            id,
            version: Version::first(),
            body,
            created_at: now,
            updated_at: now,
        }
    }

    /// Deserializes the body into a typed document.
    pub fn decode<D: DeserializeOwned>(&self) -> Result<D> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// A typed entity that can be stored as a JSON document.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the collection holding documents of this type.
    const COLLECTION: &'static str;

    /// Returns the primary key of this document.
    fn document_id(&self) -> Uuid;
}
