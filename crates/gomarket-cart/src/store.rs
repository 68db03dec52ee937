//! # Cart Store
//!
//! Owns the authoritative cart snapshot and mirrors it to key/value storage.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  UI Action           CartStore call        Snapshot change              │
//! │  ─────────           ──────────────        ───────────────              │
//! │                                                                         │
//! │  Tap "Add" ────────► add_to_cart() ──────► title match? qty+1 : push   │
//! │                                                                         │
//! │  Tap "+" ──────────► increment(id) ──────► items[i].qty += 1           │
//! │                                                                         │
//! │  Tap "-" ──────────► decrement(id) ──────► qty-1, removed at 0         │
//! │                                                                         │
//! │  Checkout done ────► clear() ────────────► []                          │
//! │                                                                         │
//! │  Each call:                                                             │
//! │   1. compute next snapshot from the current one   (sync, under lock)   │
//! │   2. swap it in, bump revision, notify watchers   (sync, under lock)   │
//! │   3. upsert JSON under the storage key            (async)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Ordering
//! Writes go through an async lock that remembers the newest revision a
//! write was attempted for, successful or not. A write for an older revision
//! is skipped, so storage never moves backwards behind memory no matter how
//! the writes interleave.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use gomarket_core::{CartSnapshot, CartSummary, CoreResult, LineItem, ProductCandidate};
use gomarket_storage::{Database, KeyValueStore, MemoryKvStore, SqliteConfig};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::{CartConfig, StorageBackend};
use crate::error::CartResult;

// =============================================================================
// Mutation Outcome
// =============================================================================

/// What happened to the persisted copy after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// The snapshot was written.
    Saved,

    /// A write for a newer snapshot had already been attempted; this one was
    /// skipped.
    Superseded,

    /// The write failed. Memory and storage disagree until the next
    /// successful write.
    Failed(String),
}

impl Persistence {
    /// Checks if the snapshot reached storage.
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }
}

/// Result of a successful cart mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// The snapshot now visible to readers.
    pub snapshot: Arc<CartSnapshot>,

    /// Revision assigned to `snapshot`.
    pub revision: u64,

    /// Whether `snapshot` reached storage.
    pub persistence: Persistence,
}

// =============================================================================
// Cart Store
// =============================================================================

struct Current {
    snapshot: Arc<CartSnapshot>,
    revision: u64,
}

struct Inner {
    backend: Arc<dyn KeyValueStore>,
    storage_key: String,
    current: Mutex<Current>,
    watchers: watch::Sender<Arc<CartSnapshot>>,
    /// Newest revision a write was attempted for.
    attempted: tokio::sync::Mutex<u64>,
}

/// The cart: an in-memory snapshot kept in sync with key/value storage.
///
/// Cheap to clone; clones share state.
///
/// ## Usage
/// ```rust,ignore
/// let store = CartStore::open(&CartConfig::load_or_default(None)).await?;
///
/// let mut view = store.subscribe();
/// store.add_to_cart(&ProductCandidate::new("1", "Shirt", url, 10.0)).await?;
/// assert_eq!(view.borrow_and_update().len(), 1);
/// ```
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.lock_current();
        f.debug_struct("CartStore")
            .field("storage_key", &self.inner.storage_key)
            .field("revision", &current.revision)
            .field("items", &current.snapshot.len())
            .finish()
    }
}

impl CartStore {
    /// Opens the backend named in `config` and loads the persisted cart.
    ///
    /// ## Errors
    /// `CartError::Storage` if the SQLite database cannot be opened or
    /// migrated. A missing or unreadable cart blob is NOT an error.
    pub async fn open(config: &CartConfig) -> CartResult<Self> {
        let storage = &config.storage;

        let backend: Arc<dyn KeyValueStore> = match storage.backend {
            StorageBackend::Memory => Arc::new(MemoryKvStore::new()),
            StorageBackend::Sqlite => {
                let sqlite = SqliteConfig::new(storage.resolved_database_path()?)
                    .max_connections(storage.max_connections)
                    .connect_timeout(std::time::Duration::from_secs(storage.connect_timeout_secs));
                Arc::new(Database::new(sqlite).await?.kv())
            }
        };

        info!(backend = %storage.backend, "Cart storage opened");
        Ok(Self::initialize(backend, storage.storage_key.clone()).await)
    }

    /// Builds a store over `backend`, adopting the snapshot stored under
    /// `storage_key` if there is a readable one.
    pub async fn initialize(backend: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let snapshot = Arc::new(load_snapshot(backend.as_ref(), &storage_key).await);

        info!(key = %storage_key, items = snapshot.len(), "Cart initialized");

        let (watchers, _) = watch::channel(snapshot.clone());

        CartStore {
            inner: Arc::new(Inner {
                backend,
                storage_key,
                current: Mutex::new(Current {
                    snapshot,
                    revision: 0,
                }),
                watchers,
                attempted: tokio::sync::Mutex::new(0),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<CartSnapshot> {
        self.lock_current().snapshot.clone()
    }

    /// Revision of the current snapshot. Starts at 0 after initialization.
    pub fn revision(&self) -> u64 {
        self.lock_current().revision
    }

    /// A receiver that is notified with every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartSnapshot>> {
        self.inner.watchers.subscribe()
    }

    /// Counts for the cart badge.
    pub fn summary(&self) -> CartSummary {
        self.snapshot().summary()
    }

    /// The line with this id, if present.
    pub fn get(&self, id: &str) -> Option<LineItem> {
        self.snapshot().get(id).cloned()
    }

    /// Key the snapshot is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of `candidate`, matching existing lines by title.
    ///
    /// Returns the post-update snapshot.
    pub async fn add_to_cart(&self, candidate: &ProductCandidate) -> CartResult<MutationOutcome> {
        debug!(id = %candidate.id, title = %candidate.title, "add_to_cart");
        self.mutate(|cart| cart.with_added(candidate)).await
    }

    /// Adds one to the quantity of line `id`.
    ///
    /// ## Errors
    /// `ItemNotFound` if no line has this id; nothing changes.
    pub async fn increment(&self, id: &str) -> CartResult<MutationOutcome> {
        debug!(id = %id, "increment");
        self.mutate(|cart| cart.with_incremented(id)).await
    }

    /// Subtracts one from line `id`, removing it at zero.
    ///
    /// ## Errors
    /// `ItemNotFound` if no line has this id; nothing changes.
    pub async fn decrement(&self, id: &str) -> CartResult<MutationOutcome> {
        debug!(id = %id, "decrement");
        self.mutate(|cart| cart.with_decremented(id)).await
    }

    /// Empties the cart.
    pub async fn clear(&self) -> CartResult<MutationOutcome> {
        debug!("clear");
        self.mutate(|_| Ok(CartSnapshot::empty())).await
    }

    async fn mutate<F>(&self, f: F) -> CartResult<MutationOutcome>
    where
        F: FnOnce(&CartSnapshot) -> CoreResult<CartSnapshot>,
    {
        let (snapshot, revision) = self.apply(f)?;
        let persistence = self.persist(&snapshot, revision).await;

        Ok(MutationOutcome {
            snapshot,
            revision,
            persistence,
        })
    }

    /// Swaps in the next snapshot. No `.await` happens here, so readers see
    /// the change before persistence starts.
    fn apply<F>(&self, f: F) -> CoreResult<(Arc<CartSnapshot>, u64)>
    where
        F: FnOnce(&CartSnapshot) -> CoreResult<CartSnapshot>,
    {
        let mut current = self.lock_current();

        let next = Arc::new(f(&current.snapshot)?);
        current.revision += 1;
        current.snapshot = next.clone();
        self.inner.watchers.send_replace(next.clone());

        debug!(
            revision = current.revision,
            items = next.len(),
            "Cart snapshot replaced"
        );
        Ok((next, current.revision))
    }

    async fn persist(&self, snapshot: &CartSnapshot, revision: u64) -> Persistence {
        let mut attempted = self.inner.attempted.lock().await;

        if *attempted >= revision {
            debug!(revision, newest = *attempted, "Skipping stale cart write");
            return Persistence::Superseded;
        }
        *attempted = revision;

        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(revision, error = %e, "Failed to encode cart snapshot");
                return Persistence::Failed(e.to_string());
            }
        };

        match self.inner.backend.set(&self.inner.storage_key, &json).await {
            Ok(()) => {
                debug!(revision, "Cart persisted");
                Persistence::Saved
            }
            Err(e) => {
                warn!(
                    revision,
                    key = %self.inner.storage_key,
                    error = %e,
                    "Failed to persist cart; in-memory state kept"
                );
                Persistence::Failed(e.to_string())
            }
        }
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Current> {
        // A poisoned lock still holds a consistent snapshot: fields are swapped after f() succeeds
        self.inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reads and decodes the persisted cart, falling back to empty on any failure.
async fn load_snapshot(backend: &dyn KeyValueStore, key: &str) -> CartSnapshot {
    let raw = match backend.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key = %key, "No persisted cart, starting empty");
            return CartSnapshot::empty();
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read persisted cart, starting empty");
            return CartSnapshot::empty();
        }
    };

    match CartSnapshot::from_json(&raw) {
        Ok((snapshot, dropped)) => {
            for entry in dropped {
                warn!(
                    id = %entry.item.id,
                    reason = %entry.reason,
                    "Dropped invalid line from persisted cart"
                );
            }
            snapshot
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Persisted cart is corrupt, starting empty");
            CartSnapshot::empty()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gomarket_core::CART_STORAGE_KEY;
    use gomarket_storage::{StorageError, StorageResult};

    /// Backend whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Internal("disk on fire".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Internal("disk on fire".into()))
        }

        async fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Internal("disk on fire".into()))
        }
    }

    /// Memory backend that refuses any value containing `reject`.
    struct PickyStore {
        entries: MemoryKvStore,
        reject: &'static str,
    }

    #[async_trait]
    impl KeyValueStore for PickyStore {
        async fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.entries.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if value.contains(self.reject) {
                return Err(StorageError::Internal("rejected".into()));
            }
            self.entries.set(key, value).await
        }

        async fn remove(&self, key: &str) -> StorageResult<()> {
            self.entries.remove(key).await
        }
    }

    fn shirt() -> ProductCandidate {
        ProductCandidate::new("1", "Shirt", "u", 10.0)
    }

    fn product(id: &str, title: &str) -> ProductCandidate {
        ProductCandidate::new(id, title, format!("https://img/{}.png", id), 5.0)
    }

    async fn memory_store() -> (Arc<MemoryKvStore>, CartStore) {
        let backend = Arc::new(MemoryKvStore::new());
        let store = CartStore::initialize(backend.clone(), CART_STORAGE_KEY).await;
        (backend, store)
    }

    async fn persisted(backend: &MemoryKvStore) -> Option<CartSnapshot> {
        let raw = backend.get(CART_STORAGE_KEY).await.unwrap()?;
        Some(CartSnapshot::from_json(&raw).unwrap().0)
    }

    #[tokio::test]
    async fn test_initialize_without_snapshot_is_empty() {
        let (_, store) = memory_store().await;
        assert!(store.snapshot().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn test_initialize_adopts_persisted_snapshot() {
        let json = r#"[
            {"id":"1","title":"Shirt","image_url":"u","price":10,"quantity":2},
            {"id":"2","title":"Hat","image_url":"v","price":4.5,"quantity":1}
        ]"#;
        let backend = Arc::new(MemoryKvStore::with_entry(CART_STORAGE_KEY, json));

        let store = CartStore::initialize(backend.clone(), CART_STORAGE_KEY).await;

        let cart = store.snapshot();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].id, "1");
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[1].title, "Hat");
        // Loading alone never writes
        assert_eq!(
            backend.get(CART_STORAGE_KEY).await.unwrap().as_deref(),
            Some(json)
        );
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let backend = Arc::new(MemoryKvStore::with_entry(CART_STORAGE_KEY, "{not json"));
        let store = CartStore::initialize(backend, CART_STORAGE_KEY).await;
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_storage_starts_empty() {
        let store = CartStore::initialize(Arc::new(BrokenStore), CART_STORAGE_KEY).await;
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_distinct_titles_one_line_each() {
        let (backend, store) = memory_store().await;

        for (id, title) in [("1", "Shirt"), ("2", "Hat"), ("3", "Socks")] {
            let outcome = store.add_to_cart(&product(id, title)).await.unwrap();
            assert!(outcome.persistence.is_saved());
        }

        let cart = store.snapshot();
        assert_eq!(cart.len(), 3);
        assert!(cart.items().iter().all(|i| i.quantity == 1));
        assert_eq!(persisted(&backend).await.as_ref(), Some(&*cart));
    }

    #[tokio::test]
    async fn test_add_returns_post_update_snapshot() {
        let (_, store) = memory_store().await;

        store.add_to_cart(&shirt()).await.unwrap();
        let outcome = store
            .add_to_cart(&ProductCandidate::new("other", "Shirt", "x", 99.0))
            .await
            .unwrap();

        assert_eq!(outcome.revision, 2);
        let item = outcome.snapshot.get("1").unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price, 10.0);
        assert_eq!(item.image_url, "u");
        assert!(outcome.snapshot.get("other").is_none());
    }

    #[tokio::test]
    async fn test_shirt_walkthrough_persists_every_step() {
        let (backend, store) = memory_store().await;

        store.add_to_cart(&shirt()).await.unwrap();
        assert_eq!(store.get("1").unwrap().quantity, 1);
        assert_eq!(persisted(&backend).await.as_ref(), Some(&*store.snapshot()));

        store.increment("1").await.unwrap();
        assert_eq!(store.get("1").unwrap().quantity, 2);
        assert_eq!(persisted(&backend).await.as_ref(), Some(&*store.snapshot()));

        store.decrement("1").await.unwrap();
        assert_eq!(store.get("1").unwrap().quantity, 1);
        assert_eq!(persisted(&backend).await.as_ref(), Some(&*store.snapshot()));

        store.decrement("1").await.unwrap();
        assert!(store.snapshot().is_empty());
        assert_eq!(persisted(&backend).await, Some(CartSnapshot::empty()));
    }

    #[tokio::test]
    async fn test_increment_leaves_others_and_order_alone() {
        let (_, store) = memory_store().await;
        store.add_to_cart(&product("a", "A")).await.unwrap();
        store.add_to_cart(&product("b", "B")).await.unwrap();
        store.add_to_cart(&product("c", "C")).await.unwrap();

        store.increment("a").await.unwrap();

        let cart = store.snapshot();
        let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(cart.get("a").unwrap().quantity, 2);
        assert_eq!(cart.get("b").unwrap().quantity, 1);
        assert_eq!(cart.get("c").unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_reported_and_changes_nothing() {
        let (backend, store) = memory_store().await;
        store.add_to_cart(&shirt()).await.unwrap();
        let before = store.snapshot();

        let err = store.increment("missing").await.unwrap_err();
        assert!(err.is_item_not_found());
        let err = store.decrement("missing").await.unwrap_err();
        assert!(err.is_item_not_found());

        assert_eq!(store.snapshot(), before);
        assert_eq!(store.revision(), 1);
        assert_eq!(persisted(&backend).await.as_ref(), Some(&*before));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_state() {
        let store = CartStore::initialize(Arc::new(BrokenStore), CART_STORAGE_KEY).await;

        let outcome = store.add_to_cart(&shirt()).await.unwrap();

        assert!(matches!(outcome.persistence, Persistence::Failed(_)));
        assert_eq!(store.get("1").unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_watchers_see_each_snapshot() {
        let (_, store) = memory_store().await;
        let mut view = store.subscribe();
        assert!(view.borrow_and_update().is_empty());

        store.add_to_cart(&shirt()).await.unwrap();
        assert!(view.has_changed().unwrap());
        assert_eq!(view.borrow_and_update().get("1").unwrap().quantity, 1);

        store.clear().await.unwrap();
        assert!(view.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_taps_converge() {
        let (backend, store) = memory_store().await;
        store.add_to_cart(&shirt()).await.unwrap();

        let hat = product("2", "Hat");
        let (a, b, c) = tokio::join!(
            store.increment("1"),
            store.add_to_cart(&hat),
            store.increment("1"),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        let cart = store.snapshot();
        assert_eq!(cart.get("1").unwrap().quantity, 3);
        assert_eq!(cart.get("2").unwrap().quantity, 1);
        assert_eq!(store.revision(), 4);
        assert_eq!(persisted(&backend).await.as_ref(), Some(&*cart));
    }

    #[tokio::test]
    async fn test_stale_write_is_superseded() {
        let (backend, store) = memory_store().await;

        let (first, first_rev) = store.apply(|c| c.with_added(&shirt())).unwrap();
        let (second, second_rev) = store.apply(|c| c.with_incremented("1")).unwrap();

        assert_eq!(store.persist(&second, second_rev).await, Persistence::Saved);
        assert_eq!(store.persist(&first, first_rev).await, Persistence::Superseded);

        assert_eq!(persisted(&backend).await.as_ref(), Some(&*second));
    }

    #[tokio::test]
    async fn test_older_write_after_failed_newer_is_superseded() {
        let backend = Arc::new(PickyStore {
            entries: MemoryKvStore::new(),
            reject: "\"quantity\":2",
        });
        let store = CartStore::initialize(backend.clone(), CART_STORAGE_KEY).await;

        let (first, first_rev) = store.apply(|c| c.with_added(&shirt())).unwrap();
        let (second, second_rev) = store.apply(|c| c.with_incremented("1")).unwrap();

        let newer = store.persist(&second, second_rev).await;
        assert!(matches!(newer, Persistence::Failed(_)));
        assert_eq!(store.persist(&first, first_rev).await, Persistence::Superseded);

        // Storage still holds nothing rather than the older snapshot
        assert!(backend.get(CART_STORAGE_KEY).await.unwrap().is_none());
        assert_eq!(store.get("1").unwrap().quantity, 2);

        // The next successful write catches storage up
        let outcome = store.add_to_cart(&product("2", "Hat")).await.unwrap();
        assert_eq!(
            outcome.persistence,
            Persistence::Failed("Internal storage error: rejected".into())
        );
        let outcome = store.decrement("1").await.unwrap();
        assert!(outcome.persistence.is_saved());
        let raw = backend.get(CART_STORAGE_KEY).await.unwrap().unwrap();
        assert_eq!(CartSnapshot::from_json(&raw).unwrap().0, *store.snapshot());
    }

    #[tokio::test]
    async fn test_reopen_from_sqlite() {
        let db = Database::new(SqliteConfig::in_memory()).await.unwrap();

        let store = CartStore::initialize(Arc::new(db.kv()), CART_STORAGE_KEY).await;
        store.add_to_cart(&shirt()).await.unwrap();
        store.add_to_cart(&product("2", "Hat")).await.unwrap();
        store.increment("2").await.unwrap();

        let reopened = CartStore::initialize(Arc::new(db.kv()), CART_STORAGE_KEY).await;
        assert_eq!(reopened.snapshot(), store.snapshot());
        assert_eq!(reopened.summary().total_quantity, 3);
    }

    #[tokio::test]
    async fn test_open_in_memory_config() {
        let store = CartStore::open(&CartConfig::in_memory()).await.unwrap();
        assert_eq!(store.storage_key(), CART_STORAGE_KEY);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_open_sqlite_file_survives_restart() {
        let dir = std::env::temp_dir().join(format!("gomarket-test-{}", uuid::Uuid::new_v4()));
        let mut config = CartConfig::default();
        config.storage.database_path = Some(dir.join("cart.db"));

        {
            let store = CartStore::open(&config).await.unwrap();
            store.add_to_cart(&shirt()).await.unwrap();
        }

        let store = CartStore::open(&config).await.unwrap();
        assert_eq!(store.get("1").unwrap().quantity, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
