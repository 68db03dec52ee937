//! # gomarket-storage: Key/Value Persistence for GoMarket
//!
//! The cart persists a single JSON blob under a fixed key. This crate defines
//! the [`KeyValueStore`] port that `gomarket-cart` writes through and ships two
//! adapters for it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Data Flow                               │
//! │                                                                         │
//! │  CartStore::add_to_cart                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 gomarket-storage (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │ KeyValueStore  │   │   Database     │   │  Migrations  │   │   │
//! │  │   │    (kv.rs)     │◄──│  SqliteKvStore │   │  (embedded)  │   │   │
//! │  │   │                │◄──│  MemoryKvStore │   │ 001_kv.sql   │   │   │
//! │  │   └────────────────┘   └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │          <data dir>/gomarket/cart.db  (kv_store table)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`kv`] - The `KeyValueStore` trait
//! - [`pool`] - SQLite connection pool and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - `SqliteKvStore`
//! - [`memory`] - `MemoryKvStore`
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_storage::{Database, KeyValueStore, SqliteConfig};
//!
//! let db = Database::new(SqliteConfig::new("cart.db")).await?;
//! let kv = db.kv();
//!
//! kv.set("@GoMarketPlace:Products", "[]").await?;
//! assert_eq!(kv.get("@GoMarketPlace:Products").await?.as_deref(), Some("[]"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StorageError, StorageResult};
pub use kv::KeyValueStore;
pub use memory::MemoryKvStore;
pub use pool::{Database, SqliteConfig};
pub use repository::kv::SqliteKvStore;
