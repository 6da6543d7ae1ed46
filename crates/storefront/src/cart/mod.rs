//! Cart state: local store, reconciliation engine, notification bus, and
//! guest fallback persistence.
//!
//! # Consistency model
//!
//! The remote service owns the authenticated cart; the local store is a
//! synchronized representation of it. Quantity updates and removals apply
//! optimistically (broadcast before network confirmation, to hide
//! latency) and roll back by restoring a pre-mutation snapshot when the
//! remote call fails. Adds wait for the authoritative line before
//! touching the store. Guest carts settle locally and persist to the
//! fallback file.

pub mod engine;
pub mod events;
pub mod fallback;
pub mod item;
pub mod store;

pub use engine::{CartEngine, CartError, CartGateway, CheckoutError};
pub use events::{CartEvent, CartEvents};
pub use fallback::GuestCartFile;
pub use item::{Brand, CartAddition, CartLineItem, CartSnapshot, LineItemKey};
pub use store::CartStore;

use rust_decimal::Decimal;

/// Flat-rate delivery fee applied on top of the items subtotal.
#[must_use]
pub fn delivery_fee() -> Decimal {
    Decimal::from(5)
}
