//! Session cart and its reducer.

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// A typed cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add `quantity` of a product, accumulating onto an existing line.
    AddItem { product: Product, quantity: i64 },
    /// Drop the line for a product.
    RemoveItem { product_id: ProductId },
    /// Replace the quantity of an existing line.
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    /// Empty the cart.
    Clear,
}

/// A cart line: a snapshot of the product when added plus a quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product: Product,
    /// Always at least 1.
    pub quantity: i64,
}

impl CartItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.product.price.try_multiply(self.quantity)
    }
}

/// The in-memory cart of the current session.
///
/// Holds at most one line per product id. `total` is recomputed from the
/// full item list after every action and only committed together with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
    total: Money,
    currency: Currency,
}

impl Cart {
    /// Create an empty cart in `currency`.
    pub fn new(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            total: Money::zero(currency),
            currency,
        }
    }

    /// Apply a typed action.
    pub fn dispatch(&mut self, action: CartAction) -> Result<(), CommerceError> {
        match action {
            CartAction::AddItem { product, quantity } => self.add_item(product, quantity),
            CartAction::RemoveItem { product_id } => self.remove_item(&product_id),
            CartAction::UpdateQuantity {
                product_id,
                quantity,
            } => self.update_quantity(&product_id, quantity),
            CartAction::Clear => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Add a product, accumulating quantity onto an existing line.
    ///
    /// Quantities below 1 are raised to 1. A line whose combined quantity
    /// would pass `MAX_QUANTITY_PER_ITEM` is rejected with
    /// `QuantityExceedsLimit` and the cart is left untouched, as are a
    /// product priced in another currency and an overflowing total.
    pub fn add_item(&mut self, product: Product, quantity: i64) -> Result<(), CommerceError> {
        if product.price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: product.price.currency.code().to_string(),
            });
        }

        let quantity = quantity.max(1);
        let mut items = self.items.clone();
        let line = items.iter_mut().find(|i| i.product.id == product.id);
        let combined = match &line {
            Some(existing) => existing.quantity.saturating_add(quantity),
            None => quantity,
        };
        if combined > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                combined,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        match line {
            Some(existing) => existing.quantity = combined,
            None => items.push(CartItem { product, quantity }),
        }
        self.commit(items)
    }

    /// Remove the line for `product_id`; no-op if absent.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<(), CommerceError> {
        let mut items = self.items.clone();
        items.retain(|i| &i.product.id != product_id);
        self.commit(items)
    }

    /// Set the quantity of an existing line.
    ///
    /// Quantities below 1 are rejected and leave the cart untouched; an
    /// unknown product id is a no-op.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let mut items = self.items.clone();
        if let Some(item) = items.iter_mut().find(|i| &i.product.id == product_id) {
            item.quantity = quantity;
        }
        self.commit(items)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total = Money::zero(self.currency);
    }

    /// Current lines, in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of price times quantity over all lines.
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Total units across lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product.id == product_id)
    }

    fn commit(&mut self, items: Vec<CartItem>) -> Result<(), CommerceError> {
        let total = compute_total(&items, self.currency)?;
        self.items = items;
        self.total = total;
        Ok(())
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

/// Sum of line totals.
pub fn compute_total(items: &[CartItem], currency: Currency) -> Result<Money, CommerceError> {
    items
        .iter()
        .map(CartItem::line_total)
        .try_fold(Money::zero(currency), |acc, line| acc.try_add(&line?))
}
