//! # gomarket-core: Pure Cart Rules for GoMarket
//!
//! This crate holds the cart's data model and every rule that decides how a
//! snapshot changes. Nothing here touches storage; `gomarket-cart` feeds
//! snapshots in and writes the results out.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Presentation layer (mobile UI)                 │   │
//! │  │     Product list ──► Cart badge ──► Cart screen (+ / - buttons)  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ watch receiver + mutations             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   gomarket-cart (CartStore)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────┐   ┌────────────────┐   ┌──────────────┐      │   │
//! │  │   │    types    │   │   validation   │   │    error     │      │   │
//! │  │   │  LineItem   │   │  candidates    │   │  CoreError   │      │   │
//! │  │   │ CartSnapshot│   │                │   │              │      │   │
//! │  │   └─────────────┘   └────────────────┘   └──────────────┘      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `LineItem`, `ProductCandidate`, `CartSnapshot`, `CartSummary`
//! - [`error`] - Domain error types
//! - [`validation`] - Candidate validation
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{CartSnapshot, ProductCandidate};
//!
//! let shirt = ProductCandidate::new("1", "Shirt", "https://img/shirt.png", 10.0);
//!
//! let cart = CartSnapshot::empty().with_added(&shirt).unwrap();
//! let cart = cart.with_incremented("1").unwrap();
//! assert_eq!(cart.get("1").unwrap().quantity, 2);
//!
//! let cart = cart.with_decremented("1").unwrap().with_decremented("1").unwrap();
//! assert!(cart.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the storefront app has always written the cart under.
///
/// Existing installs already hold a snapshot under this key, so changing it
/// would silently empty every user's cart.
pub const CART_STORAGE_KEY: &str = "@GoMarketPlace:Products";
