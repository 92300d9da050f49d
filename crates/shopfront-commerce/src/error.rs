//! Commerce error types.

use thiserror::Error;

/// Errors raised by the storefront domain rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Quantity below the minimum of one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Checkout cannot be submitted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Required checkout fields are missing.
    #[error("Checkout incomplete: missing {0}")]
    CheckoutIncomplete(String),

    /// Order status change not permitted by the status machine.
    #[error("Invalid order status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Unknown order status label.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// Unknown payment method label.
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// Review rating outside 1..=5.
    #[error("Invalid rating: {0} (expected 1-5)")]
    InvalidRating(u8),

    /// Product fails a catalog invariant.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
}

impl CommerceError {
    /// Whether the error comes from user input rather than arithmetic limits.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            CommerceError::Overflow | CommerceError::CurrencyMismatch { .. }
        )
    }
}
