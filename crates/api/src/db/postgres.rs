//! PostgreSQL document store.
//!
//! Each collection is a table of JSONB documents:
//!
//! ```sql
//! CREATE TABLE <collection> (
//!     id          UUID PRIMARY KEY,
//!     doc         JSONB NOT NULL,
//!     seq         BIGSERIAL NOT NULL,
//!     inserted_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! `seq` records insertion order, including the order of rows within one
//! batch insert. Filters are JSONB containment (`doc @> $filter`); a filter
//! on `id` is also matched against the primary key. Unique indexes are
//! expression indexes on `doc ->> field`. Statements run one at a time on
//! the pool; nothing here opens a transaction.
//!
//! Queries are built at runtime because table names come from
//! [`Collection::name`], which is a fixed set of identifiers.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use uuid::Uuid;

use super::OPERATION_TIMEOUT;
use super::collection::{Collection, IndexSpec};
use super::store::{Connector, DocumentStore, Filter, StoreError, Update};
use crate::config::DatabaseSettings;

const UNIQUE_VIOLATION: &str = "23505";
const UNDEFINED_TABLE: &str = "42P01";
const DUPLICATE_TABLE: &str = "42P07";

/// Opens a pooled [`PgDocumentStore`].
#[derive(Debug, Clone)]
pub struct PgConnector {
    max_connections: u32,
}

impl PgConnector {
    #[must_use]
    pub const fn new(max_connections: u32) -> Self {
        Self { max_connections }
    }
}

impl Default for PgConnector {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(
        &self,
        settings: &DatabaseSettings,
    ) -> Result<Arc<dyn DocumentStore>, StoreError> {
        let options =
            PgConnectOptions::from_str(settings.url.expose_secret())?.database(&settings.name);

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(1)
            .acquire_timeout(OPERATION_TIMEOUT)
            .connect_with(options)
            .await?;

        Ok(Arc::new(PgDocumentStore::new(pool)))
    }
}

/// [`DocumentStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `WHERE` condition for `filter`, with the filter document bound as `$1`.
///
/// A filter that pins `id` also binds the key as `$2` so the lookup goes
/// through the primary key instead of scanning the table.
fn condition(filter: &Filter) -> (&'static str, Option<Uuid>) {
    match filter.key() {
        Some(key) => ("id = $2 AND doc @> $1", Some(key)),
        None => ("doc @> $1", None),
    }
}

/// Translate driver errors into store errors for `collection`.
fn classify(err: sqlx::Error, collection: Collection) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return StoreError::DuplicateKey {
                    index: db_err
                        .constraint()
                        .unwrap_or(collection.name())
                        .to_owned(),
                };
            }
            Some(UNDEFINED_TABLE) => return StoreError::MissingCollection(collection),
            _ => {}
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn collection_exists(&self, collection: Collection) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
            .bind(collection.name())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create_collection(&self, collection: Collection) -> Result<(), StoreError> {
        let sql = format!(
            "CREATE TABLE {} (
                id          UUID PRIMARY KEY,
                doc         JSONB NOT NULL,
                seq         BIGSERIAL NOT NULL,
                inserted_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
            collection.name()
        );

        match sqlx::query(&sql).execute(&self.pool).await {
            Ok(_) => Ok(()),
            // Two creators racing on the catalog surface as a unique violation
            // on pg_type rather than as duplicate_table.
            Err(sqlx::Error::Database(db_err))
                if matches!(
                    db_err.code().as_deref(),
                    Some(DUPLICATE_TABLE | UNIQUE_VIOLATION)
                ) =>
            {
                Err(StoreError::AlreadyExists(collection))
            }
            Err(err) => Err(StoreError::Database(err)),
        }
    }

    async fn create_unique_index(
        &self,
        collection: Collection,
        index: IndexSpec,
    ) -> Result<(), StoreError> {
        let table = collection.name();
        let sql = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {table}_{name} ON {table} ((doc ->> '{field}'))",
            name = index.name,
            field = index.field,
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, collection))?;
        Ok(())
    }

    async fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        document: Value,
    ) -> Result<(), StoreError> {
        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", collection.name());
        sqlx::query(&sql)
            .bind(id)
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, collection))?;
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: Collection,
        documents: Vec<(Uuid, Value)>,
    ) -> Result<u64, StoreError> {
        let (ids, docs): (Vec<Uuid>, Vec<Value>) = documents.into_iter().unzip();
        let sql = format!(
            "INSERT INTO {} (id, doc)
             SELECT id, doc FROM UNNEST($1::uuid[], $2::jsonb[]) WITH ORDINALITY AS batch(id, doc, n)
             ORDER BY n",
            collection.name()
        );
        let result = sqlx::query(&sql)
            .bind(ids)
            .bind(docs)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, collection))?;
        Ok(result.rows_affected())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError> {
        let (condition, key) = condition(filter);
        let sql = format!(
            "SELECT doc FROM {} WHERE {condition} ORDER BY seq",
            collection.name()
        );
        let mut query = sqlx::query_scalar::<_, Value>(&sql).bind(filter.to_json());
        if let Some(key) = key {
            query = query.bind(key);
        }
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, collection))
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        let (condition, key) = condition(filter);
        let sql = format!(
            "SELECT doc FROM {} WHERE {condition} ORDER BY seq LIMIT 1",
            collection.name()
        );
        let mut query = sqlx::query_scalar::<_, Value>(&sql).bind(filter.to_json());
        if let Some(key) = key {
            query = query.bind(key);
        }
        query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, collection))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        let table = collection.name();
        let (condition, key) = condition(filter);
        let sql = format!(
            "DELETE FROM {table} WHERE id IN (
                SELECT id FROM {table} WHERE {condition} ORDER BY seq LIMIT 1
            )"
        );
        let mut query = sqlx::query(&sql).bind(filter.to_json());
        if let Some(key) = key {
            query = query.bind(key);
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, collection))?;
        Ok(result.rows_affected())
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        let (condition, key) = condition(filter);
        let sql = format!("DELETE FROM {} WHERE {condition}", collection.name());
        let mut query = sqlx::query(&sql).bind(filter.to_json());
        if let Some(key) = key {
            query = query.bind(key);
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, collection))?;
        Ok(result.rows_affected())
    }

    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, StoreError> {
        // Rows that already hold the new values are skipped so the count
        // reflects documents actually modified.
        let (condition, key) = condition(filter);
        let changes = if key.is_some() { "$3" } else { "$2" };
        let sql = format!(
            "UPDATE {} SET doc = doc || {changes} WHERE {condition} AND NOT doc @> {changes}",
            collection.name()
        );
        let mut query = sqlx::query(&sql).bind(filter.to_json());
        if let Some(key) = key {
            query = query.bind(key);
        }
        let result = query
            .bind(update.to_json())
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, collection))?;
        Ok(result.rows_affected())
    }
}
