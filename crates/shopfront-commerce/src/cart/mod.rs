//! Shopping cart module.
//!
//! Contains the session cart, its typed actions and the checkout summary.

mod cart;
mod pricing;

pub use cart::{compute_total, Cart, CartAction, CartItem, MAX_QUANTITY_PER_ITEM};
pub use pricing::CheckoutSummary;
