//! # Error Types
//!
//! Domain-specific error types for gomarket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gomarket-core errors (this file)                                      │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  └── ValidationError  - Bad product candidates                         │
//! │                                                                         │
//! │  gomarket-storage errors (separate crate)                              │
//! │  └── StorageError     - Key/value backend failures                     │
//! │                                                                         │
//! │  gomarket-cart errors                                                  │
//! │  └── CartError        - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → UI                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule errors.
///
/// Returning one of these always means the snapshot was left untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No line item with this id is in the cart.
    ///
    /// ## When This Occurs
    /// - `increment`/`decrement` for an item that was already removed
    /// - A stale UI row firing after another tap emptied the line
    #[error("Item not found in cart: {0}")]
    ItemNotFound(String),

    /// A new line would reuse an id that belongs to a differently titled item.
    ///
    /// Lines are matched by title when adding, so two products with distinct
    /// titles but the same id would otherwise break id uniqueness.
    #[error("Item id {id} is already used by '{title}'")]
    DuplicateId { id: String, title: String },

    /// Quantity cannot grow any further.
    #[error("Quantity for item {id} would overflow")]
    QuantityOverflow { id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for product candidates.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A numeric field is not usable (NaN, infinite, negative).
    #[error("{field} is not a valid number: {reason}")]
    InvalidNumber { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
