//! In-memory cart store.

use std::sync::{Arc, Mutex, PoisonError};

use super::item::{CartLineItem, CartSnapshot, LineItemKey};

/// The local cart representation for the current session.
///
/// A single shared mutable resource: handles are cheap clones of the same
/// underlying state. All mutation goes through the reconciliation engine
/// and the session tracker; UI surfaces only read snapshots.
#[derive(Clone, Default)]
pub struct CartStore {
    inner: Arc<Mutex<Vec<CartLineItem>>>,
}

impl CartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartLineItem>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A snapshot of the current cart contents.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::new(self.lock().clone())
    }

    /// Replace the cart wholesale (load, reset, rollback).
    pub fn replace(&self, snapshot: CartSnapshot) {
        *self.lock() = snapshot.into_items();
    }

    /// Find a line by its key.
    #[must_use]
    pub fn find(&self, key: &LineItemKey) -> Option<CartLineItem> {
        self.lock().iter().find(|item| item.key() == *key).cloned()
    }

    /// Insert a line, replacing any existing line with the same key.
    ///
    /// A key is never duplicated: an existing line is overwritten in place,
    /// keeping its position; a new key appends.
    pub fn upsert(&self, item: CartLineItem) {
        let mut items = self.lock();
        let key = item.key();
        match items.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    /// Remove and return the line with the given key, if present.
    pub fn remove(&self, key: &LineItemKey) -> Option<CartLineItem> {
        let mut items = self.lock();
        let index = items.iter().position(|item| item.key() == *key)?;
        Some(items.remove(index))
    }

    /// Remove all lines.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use redseam_core::{ProductId, Quantity};

    use super::*;

    fn line(product_id: i64, color: Option<&str>, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(product_id),
            name: "Shirt".to_string(),
            unit_price: Decimal::from(10),
            quantity: Quantity::new(quantity).unwrap(),
            color: color.map(String::from),
            size: None,
            cover_image: None,
            total_price: Decimal::from(10 * quantity),
            brand: None,
        }
    }

    #[test]
    fn test_upsert_appends_new_keys() {
        let store = CartStore::new();
        store.upsert(line(1, Some("Red"), 1));
        store.upsert(line(1, Some("Blue"), 1));

        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn test_upsert_replaces_existing_key_in_place() {
        let store = CartStore::new();
        store.upsert(line(1, Some("Red"), 1));
        store.upsert(line(2, None, 1));
        store.upsert(line(1, Some("Red"), 5));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        let first = snapshot.items().first().unwrap();
        assert_eq!(first.product_id, ProductId::new(1));
        assert_eq!(first.quantity.get(), 5);
    }

    #[test]
    fn test_remove_returns_line() {
        let store = CartStore::new();
        store.upsert(line(1, None, 2));

        let removed = store.remove(&line(1, None, 2).key());
        assert_eq!(removed.map(|l| l.quantity.get()), Some(2));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_unknown_key_is_none() {
        let store = CartStore::new();
        store.upsert(line(1, None, 2));

        assert!(store.remove(&line(9, None, 1).key()).is_none());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_replace_and_clear() {
        let store = CartStore::new();
        store.replace(CartSnapshot::new(vec![line(1, None, 1), line(2, None, 1)]));
        assert_eq!(store.snapshot().len(), 2);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = CartStore::new();
        let handle = store.clone();
        handle.upsert(line(1, None, 1));

        assert_eq!(store.snapshot().len(), 1);
    }
}
