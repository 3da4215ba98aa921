//! CartStore - 购物车
//!
//! Menu item id → quantity, shared by every consumer through a cloneable
//! handle. Every effective mutation is written through to storage under
//! [`CART_KEY`] before the write lock is released, so persisted state never
//! runs ahead of or behind the in-memory map.
//!
//! Invariant: no entry ever holds a quantity of zero.

use crate::storage::{CART_KEY, KeyValueStore, StorageError};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Dish id → quantity. Ordered so payloads and snapshots are deterministic.
pub type DishMap = BTreeMap<String, u32>;

#[derive(Debug, Default)]
struct CartInner {
    items: DishMap,
    /// Bumped on every effective mutation
    revision: u64,
}

/// Shared cart handle
///
/// Clones share the same underlying cart. Readers should call
/// [`CartStore::snapshot`] each time they need the contents rather than
/// holding on to an old copy.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<RwLock<CartInner>>,
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("CartStore")
            .field("items", &inner.items)
            .field("revision", &inner.revision)
            .finish()
    }
}

impl CartStore {
    /// Restore the cart from storage
    ///
    /// Missing, unreadable or malformed data yields an empty cart.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let items = match storage.get(CART_KEY) {
            Ok(Some(bytes)) => parse_cart(&bytes),
            Ok(None) => DishMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cart, starting empty");
                DishMap::new()
            }
        };

        tracing::debug!(items = items.len(), "Cart loaded");

        Self {
            inner: Arc::new(RwLock::new(CartInner { items, revision: 0 })),
            storage,
        }
    }

    /// Increment by one, starting at 1
    pub fn add(&self, item_id: &str) {
        self.mutate(item_id, |items| {
            let qty = items.entry(item_id.to_string()).or_insert(0);
            *qty = qty.saturating_add(1);
            true
        });
    }

    /// Drop the entry whatever its quantity
    pub fn remove(&self, item_id: &str) {
        self.mutate(item_id, |items| items.remove(item_id).is_some());
    }

    /// Set an exact quantity; zero or negative removes the entry
    pub fn set_quantity(&self, item_id: &str, qty: i64) {
        if qty <= 0 {
            self.remove(item_id);
            return;
        }
        let qty = u32::try_from(qty).unwrap_or(u32::MAX);
        self.mutate(item_id, |items| {
            items.insert(item_id.to_string(), qty) != Some(qty)
        });
    }

    /// Empty the cart
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        if inner.items.is_empty() {
            return;
        }
        inner.items.clear();
        inner.revision += 1;
        self.persist(&inner.items);
        tracing::debug!("Cart cleared");
    }

    pub fn snapshot(&self) -> DishMap {
        self.inner.read().items.clone()
    }

    /// Contents and revision read under one lock
    pub fn snapshot_with_revision(&self) -> (DishMap, u64) {
        let inner = self.inner.read();
        (inner.items.clone(), inner.revision)
    }

    pub fn quantity(&self, item_id: &str) -> u32 {
        self.inner.read().items.get(item_id).copied().unwrap_or(0)
    }

    /// Sum of all quantities (badge count)
    pub fn total_quantity(&self) -> u32 {
        self.inner
            .read()
            .items
            .values()
            .fold(0u32, |acc, q| acc.saturating_add(*q))
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }

    fn mutate(&self, item_id: &str, f: impl FnOnce(&mut DishMap) -> bool) {
        // 空 id 直接忽略
        if item_id.trim().is_empty() {
            return;
        }
        let mut inner = self.inner.write();
        if !f(&mut inner.items) {
            return;
        }
        inner.revision += 1;
        self.persist(&inner.items);
        tracing::debug!(
            item_id = %item_id,
            qty = inner.items.get(item_id).copied().unwrap_or(0),
            "Cart updated"
        );
    }

    fn persist(&self, items: &DishMap) {
        let result = serde_json::to_vec(items)
            .map_err(StorageError::from)
            .and_then(|bytes| self.storage.put(CART_KEY, &bytes));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }
}

/// Decode a stored cart, dropping any non-positive quantities
fn parse_cart(bytes: &[u8]) -> DishMap {
    match serde_json::from_slice::<BTreeMap<String, i64>>(bytes) {
        Ok(raw) => raw
            .into_iter()
            .filter(|(id, qty)| *qty > 0 && !id.trim().is_empty())
            .map(|(id, qty)| (id, u32::try_from(qty).unwrap_or(u32::MAX)))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored cart is malformed, starting empty");
            DishMap::new()
        }
    }
}
