//! Session cart.
//!
//! The cart lives entirely in the visitor's session as JSON. Each line keeps
//! the price at the moment the product was added; checkout charges that price
//! even if the catalog price changes afterwards.

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// Errors from cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Adding one more unit would exceed the stock on hand.
    #[error("Requested quantity not available.")]
    InsufficientStock {
        /// Product that ran out.
        product_id: ProductId,
        /// Units currently in stock.
        available: i32,
    },
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i32,
}

impl CartItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Ordered list of cart lines, one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart has its quantity bumped; the stored
    /// price and name are left untouched. A new product is appended with
    /// quantity 1.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InsufficientStock`] when the new quantity would
    /// exceed `available_stock`. The cart is unchanged in that case.
    pub fn add(
        &mut self,
        product_id: ProductId,
        name: &str,
        unit_price: Money,
        available_stock: i32,
    ) -> Result<(), CartError> {
        let wanted = self.get(product_id).map_or(1, |item| item.quantity + 1);
        ensure_stock(product_id, wanted, available_stock)?;

        match self.items.iter_mut().find(|item| item.product_id == product_id) {
            Some(item) => item.quantity = wanted,
            None => self.items.push(CartItem {
                product_id,
                name: name.to_owned(),
                unit_price,
                quantity: 1,
            }),
        }
        Ok(())
    }

    /// Increase an existing line by one. Unknown products are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InsufficientStock`] when the stock is exhausted.
    pub fn increase(
        &mut self,
        product_id: ProductId,
        available_stock: i32,
    ) -> Result<(), CartError> {
        if let Some(item) = self.items.iter_mut().find(|item| item.product_id == product_id) {
            ensure_stock(product_id, item.quantity + 1, available_stock)?;
            item.quantity += 1;
        }
        Ok(())
    }

    /// Decrease a line by one, removing it when it would reach zero.
    pub fn decrease(&mut self, product_id: ProductId) {
        if let Some(pos) = self.items.iter().position(|item| item.product_id == product_id) {
            match self.items.get_mut(pos) {
                Some(item) if item.quantity > 1 => item.quantity -= 1,
                _ => {
                    self.items.remove(pos);
                }
            }
        }
    }

    /// Remove a product's line entirely.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id != product_id);
    }

    /// Total number of units (the cart badge).
    #[must_use]
    pub fn count(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Returns true when there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

const fn ensure_stock(product_id: ProductId, wanted: i32, available: i32) -> Result<(), CartError> {
    if wanted > available {
        return Err(CartError::InsufficientStock {
            product_id,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    fn tea() -> ProductId {
        ProductId::new(1)
    }

    fn mug() -> ProductId {
        ProductId::new(2)
    }

    #[test]
    fn test_add_new_and_existing() {
        let mut cart = Cart::new();
        cart.add(tea(), "Mountain tea", price("120"), 10).unwrap();
        cart.add(mug(), "Clay mug", price("350"), 10).unwrap();
        cart.add(tea(), "Mountain tea", price("999"), 10).unwrap();

        assert_eq!(cart.items().len(), 2);
        let line = cart.get(tea()).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, price("120"), "price captured on first add");
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.total(), price("590"));
    }

    #[test]
    fn test_add_respects_stock() {
        let mut cart = Cart::new();
        cart.add(tea(), "Mountain tea", price("120"), 1).unwrap();

        let err = cart.add(tea(), "Mountain tea", price("120"), 1).unwrap_err();
        assert_eq!(
            err,
            CartError::InsufficientStock {
                product_id: tea(),
                available: 1
            }
        );
        assert_eq!(cart.count(), 1);
        assert_eq!(err.to_string(), "Requested quantity not available.");
    }

    #[test]
    fn test_add_out_of_stock_product() {
        let mut cart = Cart::new();
        assert!(cart.add(mug(), "Clay mug", price("350"), 0).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_increase_and_decrease() {
        let mut cart = Cart::new();
        cart.add(tea(), "Mountain tea", price("120"), 5).unwrap();

        cart.increase(tea(), 5).unwrap();
        assert_eq!(cart.get(tea()).unwrap().quantity, 2);

        cart.decrease(tea());
        assert_eq!(cart.get(tea()).unwrap().quantity, 1);

        cart.decrease(tea());
        assert!(cart.get(tea()).is_none(), "decrease at 1 removes the line");
    }

    #[test]
    fn test_increase_unknown_product_is_noop() {
        let mut cart = Cart::new();
        cart.increase(mug(), 0).unwrap();
        cart.decrease(mug());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_increase_respects_stock() {
        let mut cart = Cart::new();
        cart.add(tea(), "Mountain tea", price("120"), 2).unwrap();
        cart.increase(tea(), 2).unwrap();
        assert!(cart.increase(tea(), 2).is_err());
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(tea(), "Mountain tea", price("120"), 5).unwrap();
        cart.add(mug(), "Clay mug", price("350"), 5).unwrap();

        cart.remove(tea());
        assert_eq!(cart.items().len(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::ZERO);
    }

    #[test]
    fn test_session_json_shape() {
        let mut cart = Cart::new();
        cart.add(tea(), "Mountain tea", price("120.50"), 5).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["product_id"], 1);
        assert_eq!(json[0]["quantity"], 1);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
