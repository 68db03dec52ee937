//! # Cart Provider
//!
//! Scopes access to a `CartStore`. Screens ask the provider for the cart
//! instead of holding the store directly, so using the cart before it is
//! mounted fails loudly.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Provider Lifecycle                                   │
//! │                                                                         │
//! │   CartProvider::new()          use_cart() ──► Err(Uninitialized)       │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   mount(CartStore::open(..))   use_cart() ──► Ok(store)                │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   unmount()                    use_cart() ──► Err(Uninitialized)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::{CartError, CartResult};
use crate::store::CartStore;

/// Gate in front of the cart store.
#[derive(Debug, Default)]
pub struct CartProvider {
    store: RwLock<Option<CartStore>>,
}

impl CartProvider {
    /// Creates a provider with nothing mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `store` available to `use_cart`. Returns the previously
    /// mounted store, if any.
    pub fn mount(&self, store: CartStore) -> Option<CartStore> {
        debug!(key = %store.storage_key(), "Cart provider mounted");
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(store)
    }

    /// Ends the scope. Handles already returned by `use_cart` keep working.
    pub fn unmount(&self) -> Option<CartStore> {
        debug!("Cart provider unmounted");
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_mounted(&self) -> bool {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The mounted cart.
    ///
    /// ## Errors
    /// `CartError::Uninitialized` outside a mount/unmount scope.
    pub fn use_cart(&self) -> CartResult<CartStore> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CartError::Uninitialized)
    }
}
