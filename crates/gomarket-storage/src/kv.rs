//! Key/value storage port.
//!
//! The cart only ever needs one slot: read it on startup, overwrite it after
//! each mutation. Implementations can be SQLite, in-memory, or a test double.

use async_trait::async_trait;

use crate::error::StorageResult;

/// A string-keyed blob store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`, `None` if unset.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// Must be a single atomic upsert: a concurrent `get` sees either the old
    /// value or the new one, never an absent key.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}
