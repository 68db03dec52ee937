//! # Key/Value Repository
//!
//! The `kv_store` table behind [`KeyValueStore`].
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Single-Statement Upsert                              │
//! │                                                                         │
//! │  set("@GoMarketPlace:Products", "[…]")                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)     │
//! │  ON CONFLICT(key) DO UPDATE SET value = excluded.value, …              │
//! │                                                                         │
//! │  A reader running at the same time sees the old blob or the new blob.  │
//! │  There is no moment where the key is missing.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StorageResult;
use crate::kv::KeyValueStore;

/// SQLite implementation of [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Creates a new SqliteKvStore.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteKvStore { pool }
    }

    /// When `key` was last written, `None` if unset.
    pub async fn updated_at(&self, key: &str) -> StorageResult<Option<DateTime<Utc>>> {
        let updated_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(updated_at)
    }

    /// Counts stored keys.
    pub async fn count(&self) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "kv get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "kv set");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, removed = result.rows_affected(), "kv remove");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::pool::{Database, SqliteConfig};

    async fn store() -> (Database, SqliteKvStore) {
        let db = Database::new(SqliteConfig::in_memory()).await.unwrap();
        let kv = db.kv();
        (db, kv)
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (_db, kv) = store().await;
        assert_eq!(kv.get("missing").await.unwrap(), None);
        assert_eq!(kv.updated_at("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_in_place() {
        let (_db, kv) = store().await;

        kv.set("cart", "[1]").await.unwrap();
        kv.set("cart", "[2]").await.unwrap();

        assert_eq!(kv.get("cart").await.unwrap().as_deref(), Some("[2]"));
        assert_eq!(kv.count().await.unwrap(), 1);
        assert!(kv.updated_at("cart").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (_db, kv) = store().await;

        kv.set("a", "1").await.unwrap();
        kv.set("b", "2").await.unwrap();
        kv.remove("a").await.unwrap();

        assert_eq!(kv.get("a").await.unwrap(), None);
        assert_eq!(kv.get("b").await.unwrap().as_deref(), Some("2"));

        // Removing an absent key is fine
        kv.remove("a").await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_pool_reports_closed() {
        let (db, kv) = store().await;
        db.close().await;

        let err = kv.set("cart", "[]").await.unwrap_err();
        assert!(matches!(err, StorageError::Closed));
    }
}
