//! # Domain Types
//!
//! The cart's data model and the pure transitions between snapshots.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐     ┌──────────────────┐    ┌─────────────────┐  │
//! │  │ ProductCandidate │     │     LineItem     │    │  CartSnapshot   │  │
//! │  │  ──────────────  │ ──► │  ──────────────  │ ◄──│  ─────────────  │  │
//! │  │  id              │     │  id (unique)     │    │  Vec<LineItem>  │  │
//! │  │  title           │     │  title           │    │  (ordered)      │  │
//! │  │  image_url       │     │  image_url       │    └─────────────────┘  │
//! │  │  price           │     │  price           │                         │
//! │  └──────────────────┘     │  quantity ≥ 1    │                         │
//! │                           └──────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Transitions
//! Every `with_*` method borrows the current snapshot and returns a brand new
//! one. The caller swaps it in whole; nobody ever observes a half-applied
//! change. Updated lines stay where they were in the list.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::validate_candidate;

// =============================================================================
// Product Candidate
// =============================================================================

/// A product the shopper tapped "add to cart" on.
///
/// Same shape as [`LineItem`] minus the quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductCandidate {
    /// Catalogue id of the product.
    pub id: String,

    /// Display title. Adding matches existing lines by this field.
    pub title: String,

    /// Thumbnail shown on the cart screen.
    pub image_url: String,

    /// Unit price as shown in the catalogue.
    pub price: f64,
}

impl ProductCandidate {
    /// Creates a candidate from its parts.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        ProductCandidate {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart with its quantity.
///
/// ## Wire Format
/// Field names are the ones the storefront app has always persisted
/// (`image_url`, not `imageUrl`), so older snapshots load as-is:
/// ```json
/// {"id":"1","title":"Shirt","image_url":"https://…","price":10.0,"quantity":2}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,

    /// Always ≥ 1 inside a [`CartSnapshot`].
    pub quantity: u32,
}

impl LineItem {
    /// Creates a fresh line (quantity 1) from a candidate.
    pub fn from_candidate(candidate: &ProductCandidate) -> Self {
        LineItem {
            id: candidate.id.clone(),
            title: candidate.title.clone(),
            image_url: candidate.image_url.clone(),
            price: candidate.price,
            quantity: 1,
        }
    }

    fn incremented_quantity(&self) -> CoreResult<u32> {
        self.quantity
            .checked_add(1)
            .ok_or_else(|| CoreError::QuantityOverflow {
                id: self.id.clone(),
            })
    }
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// An immutable, ordered copy of the cart.
///
/// ## Invariants
/// - No two items share an `id`
/// - Every item has `quantity ≥ 1`
///
/// Both hold for every value this type hands out: the only ways in are
/// [`CartSnapshot::empty`], the `with_*` transitions, and
/// [`CartSnapshot::from_items`] which normalizes.
///
/// Serializes as a bare JSON array of [`LineItem`]s.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    items: Vec<LineItem>,
}

/// Why an entry was discarded while normalizing a loaded snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The entry had `quantity == 0`.
    ZeroQuantity,
    /// An earlier entry already used the same id.
    DuplicateId,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::ZeroQuantity => write!(f, "zero quantity"),
            DropReason::DuplicateId => write!(f, "duplicate id"),
        }
    }
}

/// An entry removed by [`CartSnapshot::from_items`].
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedItem {
    pub item: LineItem,
    pub reason: DropReason,
}

impl CartSnapshot {
    /// The empty cart.
    pub fn empty() -> Self {
        CartSnapshot::default()
    }

    /// Builds a snapshot from untrusted items, enforcing the invariants.
    ///
    /// Zero-quantity entries are dropped; for duplicate ids the first
    /// occurrence wins. Everything discarded is returned so the caller can
    /// log it.
    pub fn from_items(items: Vec<LineItem>) -> (Self, Vec<DroppedItem>) {
        let mut kept: Vec<LineItem> = Vec::with_capacity(items.len());
        let mut dropped = Vec::new();

        for item in items {
            let reason = if item.quantity == 0 {
                Some(DropReason::ZeroQuantity)
            } else if kept.iter().any(|k| k.id == item.id) {
                Some(DropReason::DuplicateId)
            } else {
                None
            };

            match reason {
                Some(reason) => dropped.push(DroppedItem { item, reason }),
                None => kept.push(item),
            }
        }

        (CartSnapshot { items: kept }, dropped)
    }

    /// Parses a persisted JSON array and normalizes it.
    pub fn from_json(json: &str) -> serde_json::Result<(Self, Vec<DroppedItem>)> {
        let items: Vec<LineItem> = serde_json::from_str(json)?;
        Ok(Self::from_items(items))
    }

    /// Serializes to the persisted JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Items in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up a line by exact id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn position_by_id(&self, id: &str) -> CoreResult<usize> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))
    }

    /// Adds one unit of `candidate`.
    ///
    /// ## Behavior
    /// - A line with the same **title** exists: its quantity goes up by one
    ///   and its original id, image and price are kept
    /// - Otherwise: a new line with quantity 1 is appended
    ///
    /// ## Errors
    /// - `Validation` if the candidate is malformed
    /// - `DuplicateId` if a new line would reuse another title's id
    pub fn with_added(&self, candidate: &ProductCandidate) -> CoreResult<Self> {
        validate_candidate(candidate)?;

        let mut items = self.items.clone();

        if let Some(index) = items.iter().position(|i| i.title == candidate.title) {
            items[index].quantity = items[index].incremented_quantity()?;
            return Ok(CartSnapshot { items });
        }

        if let Some(existing) = self.get(&candidate.id) {
            return Err(CoreError::DuplicateId {
                id: existing.id.clone(),
                title: existing.title.clone(),
            });
        }

        items.push(LineItem::from_candidate(candidate));
        Ok(CartSnapshot { items })
    }

    /// Adds one to the quantity of the line with this id.
    pub fn with_incremented(&self, id: &str) -> CoreResult<Self> {
        let index = self.position_by_id(id)?;
        let mut items = self.items.clone();
        items[index].quantity = items[index].incremented_quantity()?;
        Ok(CartSnapshot { items })
    }

    /// Subtracts one from the quantity of the line with this id.
    ///
    /// A line that reaches zero is removed entirely.
    pub fn with_decremented(&self, id: &str) -> CoreResult<Self> {
        let index = self.position_by_id(id)?;
        let mut items = self.items.clone();

        if items[index].quantity <= 1 {
            items.remove(index);
        } else {
            items[index].quantity -= 1;
        }

        Ok(CartSnapshot { items })
    }

    /// Counts for the cart badge.
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(self)
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Counts shown on the cart badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    /// Distinct lines.
    pub item_count: usize,

    /// Sum of all quantities.
    pub total_quantity: u32,
}

impl From<&CartSnapshot> for CartSummary {
    fn from(cart: &CartSnapshot) -> Self {
        CartSummary {
            item_count: cart.len(),
            total_quantity: cart
                .items()
                .iter()
                .fold(0u32, |acc, i| acc.saturating_add(i.quantity)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
