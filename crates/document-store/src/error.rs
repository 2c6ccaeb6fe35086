use thiserror::Error;

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write lost a race against a concurrently committed transaction.
    #[error("Concurrency conflict on {collection}: {reason}")]
    ConcurrencyConflict { collection: String, reason: String },

    /// An insert violated a unique index.
    #[error("Duplicate key in {collection} (constraint {constraint})")]
    DuplicateKey {
        collection: String,
        constraint: String,
    },

    /// The store refused a write to a collection.
    #[error("Write to {collection} failed: {reason}")]
    WriteFailed { collection: String, reason: String },

    /// An update could not be applied to the stored body.
    #[error("Invalid update on field '{field}': {reason}")]
    InvalidUpdate { field: String, reason: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if retrying the whole transaction may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_concurrency_conflicts_are_conflicts() {
        let conflict = StoreError::ConcurrencyConflict {
            collection: "products".to_string(),
            reason: "modified".to_string(),
        };
        let failed = StoreError::WriteFailed {
            collection: "products".to_string(),
            reason: "offline".to_string(),
        };
        assert!(conflict.is_conflict());
        assert!(!failed.is_conflict());
    }

    #[test]
    fn display_includes_collection() {
        let err = StoreError::DuplicateKey {
            collection: "follows".to_string(),
            constraint: "follows_unique_pair".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate key in follows (constraint follows_unique_pair)"
        );
    }
}
