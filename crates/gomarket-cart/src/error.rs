//! # Cart Error Type
//!
//! What the presentation layer sees when a cart call fails.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in GoMarket Cart                          │
//! │                                                                         │
//! │  use_cart() outside a provider ──► Uninitialized   (programmer error)  │
//! │                                                                         │
//! │  increment("gone") ──────────────► Core(ItemNotFound) (state untouched)│
//! │                                                                         │
//! │  add_to_cart(bad candidate) ─────► Core(Validation)   (state untouched)│
//! │                                                                         │
//! │  CartStore::open, DB won't open ─► Storage(..)                         │
//! │                                                                         │
//! │  persistence write fails ────────► NOT an error: the mutation returns  │
//! │                                    Ok with Persistence::Failed and a   │
//! │                                    warn! is logged                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gomarket_core::CoreError;
use gomarket_storage::StorageError;
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was used outside an active `CartProvider` scope.
    #[error("use_cart must be used within a CartProvider")]
    Uninitialized,

    /// A cart rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The storage backend could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid cart configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

impl CartError {
    /// Returns true if the id passed to increment/decrement is not in the cart.
    pub fn is_item_not_found(&self) -> bool {
        matches!(self, CartError::Core(CoreError::ItemNotFound(_)))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidConfig(_)
                | CartError::ConfigLoadFailed(_)
                | CartError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_message() {
        assert_eq!(
            CartError::Uninitialized.to_string(),
            "use_cart must be used within a CartProvider"
        );
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err: CartError = CoreError::ItemNotFound("7".into()).into();
        assert!(err.is_item_not_found());
        assert_eq!(err.to_string(), "Item not found in cart: 7");
    }

    #[test]
    fn test_config_errors() {
        assert!(CartError::InvalidConfig("x".into()).is_config_error());
        assert!(!CartError::Uninitialized.is_config_error());
    }
}
