//! Storefront workflows on top of the backend port.
//!
//! - [`CheckoutWorkflow`]: cart to persisted order, with orphan handling
//! - [`CatalogService`]: rated listings, product pages, seeding, reviews
//! - [`ProductAdmin`] / [`OrderAdmin`] / [`OrderDashboard`]: admin panel
//! - [`OrderStatusNotifier`]: live orders and notifications of one user
//! - [`StoreSession`]: cart and feed between sign-in and sign-out
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopfront_core::{StoreConfig, StoreSession};
//! use shopfront_data::MemoryBackend;
//!
//! let backend = Arc::new(MemoryBackend::open("store.json")?);
//! let mut session = StoreSession::new(backend, StoreConfig::default());
//! session.start().await?;
//! session.dispatch(CartAction::AddItem { product, quantity: 2 })?;
//! let placed = session.checkout(&form).await?;
//! ```

pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notifier;
pub mod session;

pub use admin::{OrderAdmin, OrderDashboard, ProductAdmin, StatusUpdate};
pub use catalog::{CatalogService, ProductDetail, SeedOutcome};
pub use checkout::CheckoutWorkflow;
pub use config::{ConfigError, OrphanPolicy, StoreConfig};
pub use error::{
    AdminAction, AdminError, CatalogError, CheckoutError, NotifierError, ReviewError,
    CHECKOUT_FAILED_MESSAGE,
};
pub use notifier::OrderStatusNotifier;
pub use session::StoreSession;
