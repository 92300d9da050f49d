//! Storefront domain types and logic.
//!
//! This crate holds everything that does not talk to the backend:
//!
//! - **Catalog**: products, reviews and the rating aggregator
//! - **Cart**: the session cart as a reducer over typed actions
//! - **Checkout**: checkout form, order rows, order status machine
//! - **Notify**: notifications and the realtime feed reducer
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_commerce::prelude::*;
//!
//! let mut cart = Cart::new(Currency::USD);
//! cart.add_item(product.clone(), 2)?;
//! cart.add_item(product, 3)?; // one line, quantity 5
//!
//! let summary = CheckoutSummary::for_cart(&cart, Money::new(599, Currency::USD))?;
//! println!("Total: {}", summary.total);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notify;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        rate_products, RatedProduct, RatingSummary, Product, ProductDraft, Review, ReviewPolicy,
    };

    // Cart
    pub use crate::cart::{Cart, CartAction, CartItem, CheckoutSummary};

    // Checkout
    pub use crate::checkout::{
        CheckoutForm, Order, OrderDetails, OrderDraft, OrderLineItem, OrderStatus, PaymentMethod,
        ShippingDetails, StatusChange,
    };

    // Notify
    pub use crate::notify::{ChangeEvent, FeedNotice, Notification, UserFeed};
}
