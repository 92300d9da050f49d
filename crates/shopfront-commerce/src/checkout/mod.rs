//! Checkout module.
//!
//! Contains the checkout form, order rows and the order status machine.

mod form;
mod order;

pub use form::{CheckoutForm, PaymentMethod, ShippingDetails};
pub use order::{
    DraftLine, Order, OrderDetails, OrderDraft, OrderLineItem, OrderStatus, StatusChange,
};
