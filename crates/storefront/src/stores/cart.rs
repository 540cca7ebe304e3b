//! Shopping cart store.
//!
//! The cart is an ordered collection of line items keyed by product id:
//! insertion order is display order, a repeated add merges into the
//! existing line, and merges never reposition a line. State lives behind a
//! `watch` channel so header badges and totals can follow along without
//! polling. The cart is never persisted; a fresh process starts empty.

use tokio::sync::watch;

use velvet_mango_core::{Price, ProductId};

/// One line in the cart.
///
/// `quantity` is always at least 1; operations that would drive it to zero
/// remove the line instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Product this line refers to. At most one line per product id.
    pub product_id: ProductId,
    /// Display name captured when the line was added.
    pub name: String,
    /// Unit price captured when the line was added.
    pub price: Price,
    /// Product image URL captured when the line was added.
    pub image_url: Option<String>,
    /// Units of the product in the cart.
    pub quantity: u32,
}

impl CartItem {
    /// Line total at the captured unit price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The shopping cart.
///
/// All mutating operations are infallible and synchronous; consumers
/// recomputing derived values (item count, total) immediately after a call
/// returns will see the new state.
#[derive(Debug)]
pub struct CartStore {
    items: watch::Sender<Vec<CartItem>>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: watch::Sender::new(Vec::new()),
        }
    }

    /// Subscribe to cart changes.
    ///
    /// The receiver observes the full item list after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartItem>> {
        self.items.subscribe()
    }

    /// Add a line to the cart.
    ///
    /// If a line with the same product id exists, its quantity grows by the
    /// incoming quantity and every other field of the existing line is left
    /// unchanged; the line keeps its position. Otherwise the item is
    /// appended at the end. Adds with a zero quantity are ignored.
    pub fn add_item(&self, item: CartItem) {
        if item.quantity == 0 {
            return;
        }

        self.items.send_modify(|items| {
            if let Some(existing) = items.iter_mut().find(|i| i.product_id == item.product_id) {
                existing.quantity += item.quantity;
            } else {
                items.push(item);
            }
        });
    }

    /// Remove the line for `product_id`. A no-op if the cart has none.
    pub fn remove_item(&self, product_id: ProductId) {
        self.items.send_if_modified(|items| {
            let before = items.len();
            items.retain(|i| i.product_id != product_id);
            items.len() != before
        });
    }

    /// Replace the quantity of the line for `product_id`.
    ///
    /// A quantity of zero or less removes the line. A no-op if the cart has
    /// no such line.
    pub fn update_quantity(&self, product_id: ProductId, new_quantity: i64) {
        match u32::try_from(new_quantity) {
            Ok(0) | Err(_) => self.remove_item(product_id),
            Ok(quantity) => {
                self.items.send_if_modified(|items| {
                    items
                        .iter_mut()
                        .find(|i| i.product_id == product_id)
                        .is_some_and(|item| {
                            item.quantity = quantity;
                            true
                        })
                });
            }
        }
    }

    /// Empty the cart unconditionally.
    pub fn clear(&self) {
        self.items.send_if_modified(|items| {
            let was_empty = items.is_empty();
            items.clear();
            !was_empty
        });
    }

    /// Sum of price × quantity across all lines. Zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.borrow().iter().map(CartItem::line_total).sum()
    }

    /// Snapshot of the current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.items.borrow().clone()
    }

    /// Number of distinct lines (the header badge count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item(product_id: ProductId, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id,
            name: "Classic Tee".to_string(),
            price: Price::new(Decimal::from(price)),
            image_url: None,
            quantity,
        }
    }

    #[test]
    fn test_distinct_adds_grow_length() {
        let cart = CartStore::new();
        let ids = [
            ProductId::generate(),
            ProductId::generate(),
            ProductId::generate(),
        ];

        for (n, id) in ids.into_iter().enumerate() {
            cart.add_item(item(id, 100, 1));
            assert_eq!(cart.len(), n + 1);
        }
    }

    #[test]
    fn test_repeated_add_merges_quantity() {
        let cart = CartStore::new();
        let id = ProductId::generate();

        cart.add_item(item(id, 500, 1));
        cart.add_item(item(id, 500, 2));

        assert_eq!(cart.len(), 1);
        let items = cart.items();
        assert_eq!(items.first().unwrap().quantity, 3);
        assert_eq!(cart.total(), Price::new(Decimal::from(1500)));
    }

    #[test]
    fn test_merge_keeps_existing_fields_and_position() {
        let cart = CartStore::new();
        let first = ProductId::generate();
        let second = ProductId::generate();

        cart.add_item(item(first, 500, 1));
        cart.add_item(item(second, 300, 1));

        // Re-add the first product with a different price and name; the
        // original line wins everything but quantity
        let mut stale = item(first, 999, 1);
        stale.name = "Renamed Tee".to_string();
        cart.add_item(stale);

        let items = cart.items();
        assert_eq!(items.first().unwrap().product_id, first);
        assert_eq!(items.first().unwrap().name, "Classic Tee");
        assert_eq!(items.first().unwrap().price, Price::new(Decimal::from(500)));
        assert_eq!(items.first().unwrap().quantity, 2);
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let cart = CartStore::new();
        cart.add_item(item(ProductId::generate(), 500, 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_item() {
        let cart = CartStore::new();
        let id = ProductId::generate();
        cart.add_item(item(id, 500, 1));

        cart.remove_item(id);
        assert!(cart.is_empty());

        // Removing an absent id is a no-op, not an error
        cart.remove_item(id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let cart = CartStore::new();
        let id = ProductId::generate();

        cart.add_item(item(id, 500, 2));
        cart.update_quantity(id, 0);
        assert!(cart.is_empty());

        cart.add_item(item(id, 500, 2));
        cart.update_quantity(id, -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_exact_value() {
        let cart = CartStore::new();
        let id = ProductId::generate();

        cart.add_item(item(id, 500, 1));
        cart.update_quantity(id, 7);

        let items = cart.items();
        assert_eq!(items.first().unwrap().quantity, 7);
        assert_eq!(items.first().unwrap().price, Price::new(Decimal::from(500)));
    }

    #[test]
    fn test_update_quantity_absent_id_is_noop() {
        let cart = CartStore::new();
        cart.add_item(item(ProductId::generate(), 500, 1));

        cart.update_quantity(ProductId::generate(), 3);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items().first().unwrap().quantity, 1);
    }

    #[test]
    fn test_clear() {
        let cart = CartStore::new();
        cart.add_item(item(ProductId::generate(), 500, 1));
        cart.add_item(item(ProductId::generate(), 300, 2));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_total_empty_cart_is_zero() {
        assert_eq!(CartStore::new().total(), Price::ZERO);
    }

    #[test]
    fn test_total_is_order_independent() {
        let a = item(ProductId::generate(), 500, 2);
        let b = item(ProductId::generate(), 19, 3);

        let forward = CartStore::new();
        forward.add_item(a.clone());
        forward.add_item(b.clone());

        let backward = CartStore::new();
        backward.add_item(b);
        backward.add_item(a);

        assert_eq!(forward.total(), backward.total());
        assert_eq!(forward.total(), Price::new(Decimal::from(1057)));
    }

    #[test]
    fn test_mutations_are_visible_synchronously() {
        let cart = CartStore::new();
        let mut rx = cart.subscribe();
        assert!(!rx.has_changed().unwrap());

        cart.add_item(item(ProductId::generate(), 500, 1));

        // The mutation is observable the moment add_item returns
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
        assert_eq!(cart.total(), Price::new(Decimal::from(500)));
    }

    #[test]
    fn test_noop_mutations_do_not_notify() {
        let cart = CartStore::new();
        let mut rx = cart.subscribe();

        cart.remove_item(ProductId::generate());
        cart.update_quantity(ProductId::generate(), 5);
        cart.clear();

        assert!(!rx.has_changed().unwrap());
    }
}
