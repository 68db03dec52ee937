//! # Validation Module
//!
//! Checks a product candidate before it is allowed into the cart.
//!
//! ## Usage
//! ```rust
//! use gomarket_core::validation::validate_candidate;
//! use gomarket_core::ProductCandidate;
//!
//! let ok = ProductCandidate::new("1", "Shirt", "https://img/shirt.png", 10.0);
//! assert!(validate_candidate(&ok).is_ok());
//!
//! let bad = ProductCandidate::new("1", "  ", "https://img/shirt.png", 10.0);
//! assert!(validate_candidate(&bad).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::ProductCandidate;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates every field of a candidate.
///
/// The image URL is not checked: the UI falls back to a placeholder when it
/// cannot load one.
pub fn validate_candidate(candidate: &ProductCandidate) -> ValidationResult<()> {
    validate_required("id", &candidate.id)?;
    validate_required("title", &candidate.title)?;
    validate_price(candidate.price)?;
    Ok(())
}

/// Validates that a text field is not blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be finite (no NaN or infinity, which JSON cannot carry)
/// - Must not be negative
/// - Zero is allowed (free samples)
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidNumber {
            field: "price".to_string(),
            reason: "must be finite".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::InvalidNumber {
            field: "price".to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    Ok(())
}
