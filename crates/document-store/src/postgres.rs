use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Filter, Result, StoreError, StoredDocument, Update, Version,
    store::{DocumentStore, StoreTransaction},
};

const COLUMNS: &str = "collection, id, version, body, created_at, updated_at";

/// PostgreSQL-backed document store.
///
/// Documents live in a single `documents` table keyed by `(collection, id)`
/// with a JSONB body. Each [`PostgresTransaction`] wraps one SQL transaction.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

fn row_to_document(row: PgRow) -> Result<StoredDocument> {
    Ok(StoredDocument {
        collection: row.try_get("collection")?,
        id: row.try_get::<Uuid, _>("id")?,
        version: Version::new(row.try_get("version")?),
        body: row.try_get("body")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

/// Maps constraint violations and serialization failures onto store errors.
fn map_write_error(collection: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some("23505") => {
                return StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                };
            }
            // serialization_failure, deadlock_detected
            Some("40001") | Some("40P01") => {
                return StoreError::ConcurrencyConflict {
                    collection: collection.to_string(),
                    reason: db_err.message().to_string(),
                };
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

/// Builds the SQL expression producing the updated body.
///
/// `set_param` is the placeholder index of the `set` object; each increment
/// consumes two further placeholders (field name, delta).
fn body_expression(update: &Update, set_param: usize) -> String {
    let mut expr = format!("(body || ${set_param}::jsonb)");
    let mut param = set_param;
    for _ in update.increments() {
        let field = param + 1;
        let delta = param + 2;
        param = delta;
        expr = format!(
            "jsonb_set({expr}, ARRAY[${field}::text], \
             to_jsonb(COALESCE((body->>${field}::text)::bigint, 0) + ${delta}::bigint))"
        );
    }
    expr
}

fn bind_update<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    update: &'q Update,
) -> Query<'q, Postgres, PgArguments> {
    query = query.bind(update.set_json());
    for (field, delta) in update.increments() {
        query = query.bind(field.as_str()).bind(*delta);
    }
    query
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> Result<PostgresTransaction> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTransaction { tx })
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>> {
        let sql = format!("SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2");
        let row = sqlx::query(&sql)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_document).transpose()
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 AND body @> $2::jsonb \
             ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(collection)
            .bind(filter.to_json())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_document).collect()
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND body @> $2::jsonb",
        )
        .bind(collection)
        .bind(filter.to_json())
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }
}

/// Transaction handle of [`PostgresDocumentStore`].
pub struct PostgresTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn get(&mut self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>> {
        let sql = format!("SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2");
        let row = sqlx::query(&sql)
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_document).transpose()
    }

    async fn find(&mut self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 AND body @> $2::jsonb \
             ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(collection)
            .bind(filter.to_json())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter().map(row_to_document).collect()
    }

    async fn insert(
        &mut self,
        collection: &str,
        id: Uuid,
        body: serde_json::Value,
    ) -> Result<StoredDocument> {
        let sql = format!(
            "INSERT INTO documents (collection, id, version, body, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(collection)
            .bind(id)
            .bind(Version::first().as_i64())
            .bind(body)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_write_error(collection, e))?;
        row_to_document(row)
    }

    async fn update_one(
        &mut self,
        collection: &str,
        id: Uuid,
        guard: &Filter,
        update: &Update,
    ) -> Result<Option<StoredDocument>> {
        let sql = format!(
            "UPDATE documents SET body = {}, version = version + 1, updated_at = NOW() \
             WHERE collection = $1 AND id = $2 AND body @> $3::jsonb RETURNING {COLUMNS}",
            body_expression(update, 4)
        );
        let query = sqlx::query(&sql)
            .bind(collection)
            .bind(id)
            .bind(guard.to_json());
        let row = bind_update(query, update)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_write_error(collection, e))?;
        row.map(row_to_document).transpose()
    }

    async fn update_many(
        &mut self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64> {
        let sql = format!(
            "UPDATE documents SET body = {}, version = version + 1, updated_at = NOW() \
             WHERE collection = $1 AND body @> $2::jsonb",
            body_expression(update, 3)
        );
        let query = sqlx::query(&sql).bind(collection).bind(filter.to_json());
        let result = bind_update(query, update)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_write_error(collection, e))?;
        Ok(result.rows_affected())
    }

    async fn delete_one(&mut self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>> {
        let sql =
            format!("DELETE FROM documents WHERE collection = $1 AND id = $2 RETURNING {COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_write_error(collection, e))?;
        row.map(row_to_document).transpose()
    }

    async fn delete_many(&mut self, collection: &str, filter: &Filter) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM documents WHERE collection = $1 AND body @> $2::jsonb")
                .bind(collection)
                .bind(filter.to_json())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| map_write_error(collection, e))?;
        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_write_error("transaction", e))
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
