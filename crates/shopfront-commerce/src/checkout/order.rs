//! Order types and the order status machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CheckoutSummary};
use crate::checkout::{CheckoutForm, PaymentMethod};
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId, UserId};
use crate::money::Money;

/// Order status.
///
/// `Pending -> Processing -> Shipped -> Delivered`, with `Cancelled`
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order being prepared.
    Processing,
    /// Order handed to the courier.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

/// Outcome of applying a status to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// Target equals the current status; nothing to persist or announce.
    Unchanged,
    /// Status moves from one state to another.
    Changed { from: OrderStatus, to: OrderStatus },
}

impl StatusChange {
    pub fn is_changed(&self) -> bool {
        matches!(self, StatusChange::Changed { .. })
    }
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Position along the fulfilment path; `None` for `Cancelled`.
    fn stage(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::Shipped => Some(2),
            OrderStatus::Delivered => Some(3),
            OrderStatus::Cancelled => None,
        }
    }

    /// Validate moving from `self` to `next`.
    ///
    /// Forward moves may skip stages. Setting the current status again is
    /// `Unchanged`, even for terminal states.
    pub fn transition(self, next: OrderStatus) -> Result<StatusChange, CommerceError> {
        if self == next {
            return Ok(StatusChange::Unchanged);
        }

        let allowed = !self.is_terminal()
            && match (self.stage(), next.stage()) {
                (_, None) => true,
                (Some(from), Some(to)) => to > from,
                (None, Some(_)) => false,
            };

        if allowed {
            Ok(StatusChange::Changed {
                from: self,
                to: next,
            })
        } else {
            Err(CommerceError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }

    /// Message sent to the customer when an order enters this status.
    pub fn notification_message(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Your order is now being processed",
            OrderStatus::Shipped => "Great news! Your order has been shipped",
            OrderStatus::Delivered => "Your order has been delivered successfully",
            OrderStatus::Cancelled => "Your order has been cancelled",
            OrderStatus::Pending => "Your order status has been updated",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.to_lowercase())
            .ok_or_else(|| CommerceError::UnknownStatus(s.to_string()))
    }
}

/// An order header row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    /// Purchasing user.
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Line items plus shipping fee.
    pub total: Money,
    pub payment_method: PaymentMethod,
    /// Formatted single-line address.
    pub shipping_address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// An order line row; the unit price is captured at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

impl OrderLineItem {
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// An order header with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
}

impl OrderDetails {
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// A line of an order that has not been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

/// An order built from a cart and a checkout form, ready to submit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub lines: Vec<DraftLine>,
    pub summary: CheckoutSummary,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub phone: String,
    pub status: OrderStatus,
}

impl OrderDraft {
    /// Snapshot the cart into an order draft.
    ///
    /// Fails on an empty cart or an incomplete form. Prices are copied from
    /// the cart lines, not looked up again.
    pub fn from_cart(
        user_id: UserId,
        cart: &Cart,
        form: &CheckoutForm,
        shipping_fee: Money,
    ) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        form.validate()?;

        let lines = cart
            .items()
            .iter()
            .map(|item| DraftLine {
                product_id: item.product.id.clone(),
                quantity: item.quantity,
                unit_price: item.product.price,
            })
            .collect();

        Ok(Self {
            user_id,
            lines,
            summary: CheckoutSummary::for_cart(cart, shipping_fee)?,
            payment_method: form.payment_method,
            shipping_address: form.shipping.one_line(),
            phone: form.shipping.phone.trim().to_string(),
            status: OrderStatus::Pending,
        })
    }

    pub fn total(&self) -> Money {
        self.summary.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::checkout::ShippingDetails;
    use crate::money::Currency;

    #[test]
    fn test_forward_transitions() {
        assert_eq!(
            OrderStatus::Pending.transition(OrderStatus::Processing),
            Ok(StatusChange::Changed {
                from: OrderStatus::Pending,
                to: OrderStatus::Processing
            })
        );
        assert!(OrderStatus::Pending.transition(OrderStatus::Shipped).is_ok());
        assert!(OrderStatus::Shipped.transition(OrderStatus::Delivered).is_ok());
    }

    #[test]
    fn test_cancel_from_non_terminal_only() {
        assert!(OrderStatus::Processing.transition(OrderStatus::Cancelled).is_ok());
        assert!(OrderStatus::Delivered.transition(OrderStatus::Cancelled).is_err());
        assert!(OrderStatus::Cancelled.transition(OrderStatus::Pending).is_err());
    }

    #[test]
    fn test_backward_transition_rejected() {
        assert!(OrderStatus::Shipped.transition(OrderStatus::Processing).is_err());
    }

    #[test]
    fn test_same_status_is_unchanged() {
        for status in OrderStatus::ALL {
            assert_eq!(status.transition(status), Ok(StatusChange::Unchanged));
        }
    }

    #[test]
    fn test_notification_messages() {
        assert_eq!(
            OrderStatus::Shipped.notification_message(),
            "Great news! Your order has been shipped"
        );
        assert_eq!(
            OrderStatus::Pending.notification_message(),
            "Your order status has been updated"
        );
    }

    #[test]
    fn test_status_parse_roundtrip() {
        assert_eq!("Shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_draft_total_includes_shipping() {
        let product = |id: &str, price: i64| Product {
            id: ProductId::new(id),
            name: id.into(),
            price: Money::new(price, Currency::USD),
            original_price: Money::new(price, Currency::USD),
            discount: 0,
            description: String::new(),
            images: vec![],
            category: "misc".into(),
            in_stock: 5,
        };
        let mut cart = Cart::new(Currency::USD);
        cart.add_item(product("p1", 1000), 2).unwrap();
        cart.add_item(product("p2", 500), 1).unwrap();

        let form = CheckoutForm {
            shipping: ShippingDetails {
                phone: "555".into(),
                email: None,
                address: "1 Main".into(),
                city: "Town".into(),
                state: "ST".into(),
                postal_code: "00001".into(),
            },
            payment_method: PaymentMethod::OnlineGateway,
        };

        let draft = OrderDraft::from_cart(
            UserId::new("u1"),
            &cart,
            &form,
            Money::new(599, Currency::USD),
        )
        .unwrap();

        assert_eq!(draft.total().amount_cents, 3099);
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.status, OrderStatus::Pending);
        assert_eq!(draft.shipping_address, "1 Main, Town, ST - 00001");
    }

    #[test]
    fn test_draft_rejects_empty_cart() {
        let cart = Cart::new(Currency::USD);
        let err = OrderDraft::from_cart(
            UserId::new("u1"),
            &cart,
            &CheckoutForm::default(),
            Money::zero(Currency::USD),
        )
        .unwrap_err();
        assert_eq!(err, CommerceError::EmptyCart);
    }
}
