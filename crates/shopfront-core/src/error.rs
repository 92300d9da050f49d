//! Operation-boundary errors.
//!
//! Each workflow converts domain, identity and backend failures into one
//! error type whose `user_message()` is the text shown to the shopper.

use thiserror::Error;

use shopfront_auth::AuthError;
use shopfront_commerce::ids::{OrderId, ProductId};
use shopfront_commerce::CommerceError;
use shopfront_data::{DataError, Table};

/// Toast shown for any failed order submission.
pub const CHECKOUT_FAILED_MESSAGE: &str = "Error creating order. Please try again.";

/// Errors from placing an order.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Rejected before any backend call.
    #[error(transparent)]
    Invalid(#[from] CommerceError),

    /// The order header could not be saved.
    #[error("order submission failed: {0}")]
    Backend(#[from] DataError),

    /// The header was saved but its line items were not.
    #[error("line items for order {order_id} failed: {source}")]
    PartialFailure {
        order_id: OrderId,
        source: DataError,
        /// Whether the orphaned header was deleted.
        compensated: bool,
    },
}

impl CheckoutError {
    /// True when no backend call was made.
    pub fn is_validation(&self) -> bool {
        matches!(self, CheckoutError::Auth(_) | CheckoutError::Invalid(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Auth(_) => "Please sign in to place an order".to_string(),
            CheckoutError::Invalid(CommerceError::EmptyCart) => "Your cart is empty".to_string(),
            CheckoutError::Invalid(CommerceError::CheckoutIncomplete(fields)) => {
                format!("Please fill in: {}", fields)
            }
            CheckoutError::Invalid(e) if e.is_validation() => e.to_string(),
            _ => CHECKOUT_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Administrative actions, for messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    FetchProducts,
    FetchOrders,
    AddProduct,
    UpdateProduct,
    DeleteProduct,
    DeleteAllProducts,
    UpdateOrderStatus,
}

impl AdminAction {
    pub fn failure_message(&self) -> &'static str {
        match self {
            AdminAction::FetchProducts => "Error fetching products",
            AdminAction::FetchOrders => "Error fetching orders",
            AdminAction::AddProduct => "Error adding product",
            AdminAction::UpdateProduct => "Error updating product",
            AdminAction::DeleteProduct => "Error deleting product",
            AdminAction::DeleteAllProducts => "Error deleting all products",
            AdminAction::UpdateOrderStatus => "Error updating order status",
        }
    }

    /// Confirmation text; `None` for reads.
    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            AdminAction::FetchProducts | AdminAction::FetchOrders => None,
            AdminAction::AddProduct => Some("Product added successfully"),
            AdminAction::UpdateProduct => Some("Product updated successfully"),
            AdminAction::DeleteProduct => Some("Product deleted successfully"),
            AdminAction::DeleteAllProducts => Some("All products deleted successfully"),
            AdminAction::UpdateOrderStatus => Some("Order status updated"),
        }
    }
}

/// Errors from the admin panel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdminError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Invalid(#[from] CommerceError),

    #[error("{}: {source}", .action.failure_message())]
    Backend { action: AdminAction, source: DataError },
}

impl AdminError {
    pub(crate) fn backend(action: AdminAction) -> impl FnOnce(DataError) -> Self {
        move |source| AdminError::Backend { action, source }
    }

    pub fn user_message(&self) -> String {
        match self {
            AdminError::Auth(AuthError::InsufficientPermissions(_)) => {
                "Administrator access required".to_string()
            }
            AdminError::Auth(_) => "Please sign in".to_string(),
            AdminError::Invalid(e) => e.to_string(),
            AdminError::Backend { action, .. } => action.failure_message().to_string(),
        }
    }
}

/// Errors from catalog reads.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error(transparent)]
    Invalid(#[from] CommerceError),

    #[error("catalog request failed: {0}")]
    Backend(DataError),
}

impl From<DataError> for CatalogError {
    fn from(e: DataError) -> Self {
        match e {
            DataError::NotFound {
                table: Table::Products,
                id,
            } => CatalogError::ProductNotFound(ProductId::new(id)),
            other => CatalogError::Backend(other),
        }
    }
}

impl CatalogError {
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::ProductNotFound(_) => "Product not found".to_string(),
            CatalogError::Invalid(e) => e.to_string(),
            CatalogError::Backend(_) => "Error fetching products".to_string(),
        }
    }
}

/// Errors from submitting a review.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Invalid(#[from] CommerceError),

    /// The policy requires a prior purchase and there is none.
    #[error("no qualifying purchase of product {0}")]
    NotEligible(ProductId),

    #[error("review request failed: {0}")]
    Backend(#[from] DataError),
}

impl ReviewError {
    pub fn user_message(&self) -> String {
        match self {
            ReviewError::Auth(_) => "Please sign in to write a review".to_string(),
            ReviewError::Invalid(e) => e.to_string(),
            ReviewError::NotEligible(_) => {
                "Only customers who purchased this product can review it".to_string()
            }
            ReviewError::Backend(_) => "Error submitting review".to_string(),
        }
    }
}

/// Errors from the order and notification feed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifierError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("feed request failed: {0}")]
    Backend(#[from] DataError),
}

impl NotifierError {
    pub fn user_message(&self) -> String {
        match self {
            NotifierError::Auth(_) => "Please sign in".to_string(),
            NotifierError::OrderNotFound(_) => "Order not found".to_string(),
            NotifierError::Backend(_) => "Error fetching orders".to_string(),
        }
    }
}
