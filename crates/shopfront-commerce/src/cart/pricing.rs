//! Checkout price summary.

use crate::cart::Cart;
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Subtotal, shipping and total shown before an order is placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSummary {
    /// Sum of line totals.
    pub subtotal: Money,
    /// Flat shipping surcharge.
    pub shipping: Money,
    /// Subtotal plus shipping.
    pub total: Money,
}

impl CheckoutSummary {
    /// Price a cart with a flat shipping fee.
    pub fn for_cart(cart: &Cart, shipping_fee: Money) -> Result<Self, CommerceError> {
        let subtotal = cart.total();
        let total = subtotal.try_add(&shipping_fee)?;
        Ok(Self {
            subtotal,
            shipping: shipping_fee,
            total,
        })
    }
}
