//! Shopping cart with synchronous local persistence.
//!
//! The cart is independent of the auth session. It lives in `cart.json`
//! under the data directory and is rewritten in full on every mutation.
//! Lines are keyed by the (product id, color, size) tuple; the store
//! maintains at most one line per key.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use marigold_core::ProductId;

use crate::storage::{self, StorageError};

const CART_FILE: &str = "cart.json";

/// One cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    /// Product slug, for navigating back to the detail view.
    pub slug: String,
    /// Unit price at the time the line was added.
    pub price: Decimal,
    pub quantity: u32,
    pub color: String,
    pub size: String,
}

impl CartItem {
    /// The identifying (product, color, size) tuple.
    #[must_use]
    pub fn key(&self) -> (ProductId, &str, &str) {
        (self.product_id, self.color.as_str(), self.size.as_str())
    }

    /// price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    fn matches(&self, product_id: ProductId, color: &str, size: &str) -> bool {
        self.product_id == product_id && self.color == color && self.size == size
    }
}

/// Shopping cart handle owning the `cart.json` slot.
#[derive(Debug)]
pub struct CartStore {
    path: PathBuf,
    items: Vec<CartItem>,
}

impl CartStore {
    /// Load the cart from the data directory.
    ///
    /// A missing file yields an empty cart. An unreadable or corrupt file is
    /// logged and treated as empty; the next mutation overwrites it.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CART_FILE);
        let items = match storage::read_slot(&path) {
            Ok(Some(contents)) => match serde_json::from_str(&contents) {
                Ok(items) => items,
                Err(err) => {
                    warn!(error = %err, "corrupt cart file, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "cart file unreadable, starting empty");
                Vec::new()
            }
        };
        Self { path, items }
    }

    /// Add an item. An existing line with the same (product, color, size)
    /// key has its quantity incremented instead of a duplicate appended.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the cart cannot be persisted.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), StorageError> {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.matches(item.product_id, &item.color, &item.size))
        {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
        self.persist()
    }

    /// Replace the quantity of the matching line; no-op when absent.
    ///
    /// The store does not clamp: `quantity >= 1` is the caller's guard, and
    /// dropping a line goes through [`Self::remove_item`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the cart cannot be persisted.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        color: &str,
        size: &str,
        quantity: u32,
    ) -> Result<(), StorageError> {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.matches(product_id, color, size))
        {
            item.quantity = quantity;
        }
        self.persist()
    }

    /// Remove the matching line.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the cart cannot be persisted.
    pub fn remove_item(
        &mut self,
        product_id: ProductId,
        color: &str,
        size: &str,
    ) -> Result<(), StorageError> {
        self.items.retain(|item| !item.matches(product_id, color, size));
        self.persist()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.persist()
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
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

    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.items).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        storage::write_slot(&self.path, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: i32, color: &str, size: &str, quantity: u32, price: Decimal) -> CartItem {
        CartItem {
            product_id: ProductId::new(product_id),
            product_name: format!("Product {product_id}"),
            product_image: None,
            slug: format!("product-{product_id}"),
            price,
            quantity,
            color: color.to_owned(),
            size: size.to_owned(),
        }
    }

    #[test]
    fn test_add_same_key_merges_quantities() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cart = CartStore::load(dir.path());

        cart.add_item(item(1, "red", "M", 2, Decimal::new(1000, 2)))
            .expect("add");
        cart.add_item(item(1, "red", "M", 3, Decimal::new(1000, 2)))
            .expect("add");

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items().first().map(|i| i.quantity), Some(5));
    }

    #[test]
    fn test_different_variants_stay_separate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cart = CartStore::load(dir.path());

        cart.add_item(item(1, "red", "M", 1, Decimal::ONE)).expect("add");
        cart.add_item(item(1, "red", "L", 1, Decimal::ONE)).expect("add");
        cart.add_item(item(1, "blue", "M", 1, Decimal::ONE)).expect("add");

        assert_eq!(cart.len(), 3);
    }

    #[test]
    fn test_remove_then_add_yields_fresh_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cart = CartStore::load(dir.path());

        cart.add_item(item(1, "red", "M", 4, Decimal::ONE)).expect("add");
        cart.remove_item(ProductId::new(1), "red", "M").expect("remove");
        cart.add_item(item(1, "red", "M", 2, Decimal::ONE)).expect("add");

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items().first().map(|i| i.quantity), Some(2));
    }

    #[test]
    fn test_total() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cart = CartStore::load(dir.path());

        cart.add_item(item(1, "red", "M", 2, Decimal::new(1000, 2)))
            .expect("add");

        assert_eq!(cart.total(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_update_quantity_replaces() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cart = CartStore::load(dir.path());

        cart.add_item(item(2, "black", "S", 1, Decimal::ONE)).expect("add");
        cart.update_quantity(ProductId::new(2), "black", "S", 7)
            .expect("update");

        assert_eq!(cart.items().first().map(|i| i.quantity), Some(7));
    }

    #[test]
    fn test_update_quantity_missing_key_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cart = CartStore::load(dir.path());

        cart.add_item(item(2, "black", "S", 1, Decimal::ONE)).expect("add");
        cart.update_quantity(ProductId::new(2), "black", "XL", 7)
            .expect("update");

        assert_eq!(cart.items().first().map(|i| i.quantity), Some(1));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_persists_across_loads() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut cart = CartStore::load(dir.path());
        cart.add_item(item(3, "white", "M", 2, Decimal::new(4990, 2)))
            .expect("add");
        drop(cart);

        let reloaded = CartStore::load(dir.path());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.total(), Decimal::new(9980, 2));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CART_FILE), "not json").expect("write");

        let cart = CartStore::load(dir.path());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cart = CartStore::load(dir.path());

        cart.add_item(item(1, "red", "M", 2, Decimal::ONE)).expect("add");
        cart.add_item(item(2, "blue", "L", 1, Decimal::ONE)).expect("add");
        cart.clear().expect("clear");

        assert!(cart.is_empty());
        assert_eq!(cart.unit_count(), 0);

        let reloaded = CartStore::load(dir.path());
        assert!(reloaded.is_empty());
    }
}
