//! Backend access for the storefront.
//!
//! The [`Backend`] trait is the only way the application reaches the hosted
//! row store and its change feed. [`MemoryBackend`] implements it in process
//! and persists to a JSON snapshot, which is what the CLI and tests run on.

pub mod backend;
pub mod error;
pub mod memory;

pub use backend::{
    Backend, NewNotification, NewOrder, NewOrderItem, NewReview, ProductFilter, ReviewFilter,
    Subscription, Table,
};
pub use error::{DataError, DataResult};
pub use memory::{MemoryBackend, Operation, Tables};
