//! Cart line items and snapshots.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use redseam_core::{BrandId, ProductId, Quantity};

/// Identity key for a cart line.
///
/// Two lines with the same product but a different color or size are
/// distinct; a snapshot never holds two lines with the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineItemKey {
    pub product_id: ProductId,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl LineItemKey {
    /// Create a key from its parts.
    #[must_use]
    pub const fn new(product_id: ProductId, color: Option<String>, size: Option<String>) -> Self {
        Self {
            product_id,
            color,
            size,
        }
    }
}

impl fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.product_id,
            self.color.as_deref().unwrap_or("-"),
            self.size.as_deref().unwrap_or("-"),
        )
    }
}

/// Product brand reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub logo: Option<String>,
}

/// One distinct product+variant entry in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: Quantity,
    pub color: Option<String>,
    pub size: Option<String>,
    pub cover_image: Option<String>,
    /// Always `unit_price × quantity` after a mutation settles.
    pub total_price: Decimal,
    pub brand: Option<Brand>,
}

impl CartLineItem {
    /// The line's identity key.
    #[must_use]
    pub fn key(&self) -> LineItemKey {
        LineItemKey::new(self.product_id, self.color.clone(), self.size.clone())
    }

    /// Set the quantity and recompute the line total.
    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.total_price = self.unit_price * Decimal::from(quantity.get());
    }
}

/// A request to add a product (with its selected variant) to the cart.
///
/// Carries the full display data so a guest cart can build the line
/// locally; the authenticated path only sends the key and quantity and
/// takes the rest from the authoritative response.
#[derive(Debug, Clone)]
pub struct CartAddition {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: Quantity,
    pub color: Option<String>,
    pub size: Option<String>,
    pub cover_image: Option<String>,
    pub brand: Option<Brand>,
}

impl CartAddition {
    /// The key of the line this addition targets.
    #[must_use]
    pub fn key(&self) -> LineItemKey {
        LineItemKey::new(self.product_id, self.color.clone(), self.size.clone())
    }

    /// Build a fresh line item from this addition.
    #[must_use]
    pub fn into_line_item(self) -> CartLineItem {
        let total_price = self.unit_price * Decimal::from(self.quantity.get());
        CartLineItem {
            product_id: self.product_id,
            name: self.name,
            unit_price: self.unit_price,
            quantity: self.quantity,
            color: self.color,
            size: self.size,
            cover_image: self.cover_image,
            total_price,
            brand: self.brand,
        }
    }
}

/// An ordered view of the cart at a point in time.
///
/// Subscribers receive full snapshots, not deltas, and recompute derived
/// values (count, subtotal) themselves via the helpers here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    items: Vec<CartLineItem>,
}

impl CartSnapshot {
    /// Create a snapshot from a list of lines.
    #[must_use]
    pub const fn new(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the snapshot and return its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Find a line by its key.
    #[must_use]
    pub fn find(&self, key: &LineItemKey) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.key() == *key)
    }

    /// Total number of units across all lines (the header badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.quantity.get())
            .fold(0, u32::saturating_add)
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(|item| item.total_price).sum()
    }

    /// Subtotal plus a delivery fee.
    #[must_use]
    pub fn total(&self, delivery_fee: Decimal) -> Decimal {
        self.subtotal() + delivery_fee
    }
}
