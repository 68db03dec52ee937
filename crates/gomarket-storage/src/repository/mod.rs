//! # Repository Module
//!
//! SQLite-backed repository implementations.
//!
//! ## Available Repositories
//!
//! - [`kv::SqliteKvStore`] - The `kv_store` table behind the `KeyValueStore` port

pub mod kv;
