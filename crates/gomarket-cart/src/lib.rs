//! # gomarket-cart: Shopping Cart Store for GoMarket
//!
//! The crate a presentation layer embeds to get a cart: an in-memory snapshot
//! that every screen observes, mutated through a handful of async calls and
//! mirrored to on-device storage after each change.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Presentation layer (mobile UI)                 │   │
//! │  │        provider.use_cart()?.add_to_cart(&candidate).await       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-cart (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐     │   │
//! │  │   │ CartProvider │─►│  CartStore   │  │    CartConfig    │     │   │
//! │  │   │  use_cart()  │  │ watch + lock │  │ cart.toml + env  │     │   │
//! │  │   └──────────────┘  └──────┬───────┘  └──────────────────┘     │   │
//! │  └────────────────────────────┼────────────────────────────────────┘   │
//! │                  ┌────────────┴─────────────┐                          │
//! │                  ▼                          ▼                           │
//! │         gomarket-core               gomarket-storage                   │
//! │      (snapshot transitions)     (KeyValueStore: SQLite/memory)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_cart::{init_tracing, CartConfig, CartProvider, CartStore, ProductCandidate};
//!
//! let config = CartConfig::load_or_default(None);
//! init_tracing(&config.logging.filter);
//!
//! let provider = CartProvider::new();
//! provider.mount(CartStore::open(&config).await?);
//!
//! let cart = provider.use_cart()?;
//! cart.add_to_cart(&ProductCandidate::new("1", "Shirt", image_url, 10.0)).await?;
//! cart.increment("1").await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod store;
pub mod telemetry;

pub use config::{CartConfig, LoggingSettings, StorageBackend, StorageSettings};
pub use error::{CartError, CartResult};
pub use provider::CartProvider;
pub use store::{CartStore, MutationOutcome, Persistence};
pub use telemetry::init_tracing;

pub use gomarket_core::{
    CartSnapshot, CartSummary, CoreError, LineItem, ProductCandidate, CART_STORAGE_KEY,
};
