//! Realtime change events and the per-user feed reducer.

use serde::{Deserialize, Serialize};

use crate::checkout::Order;
use crate::ids::NotificationId;
use crate::notify::Notification;

/// A change pushed by the backend for one of the current user's rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "row", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// An order row was updated; carries the new row.
    OrderUpdated(Order),
    /// A notification row was inserted.
    NotificationInserted(Notification),
}

/// What the user should see after an event is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedNotice {
    /// Show a toast with this text.
    Toast(String),
}

/// Local view of the user's orders and notifications.
///
/// Events are merged by identity, so applying the same event twice leaves
/// the same state as applying it once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFeed {
    orders: Vec<Order>,
    notifications: Vec<Notification>,
    unread: usize,
}

impl UserFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace orders with a fresh fetch (newest first).
    pub fn load_orders(&mut self, orders: Vec<Order>) {
        self.orders = orders;
    }

    /// Replace notifications with a fresh fetch and recount unread.
    pub fn load_notifications(&mut self, notifications: Vec<Notification>) {
        self.unread = notifications.iter().filter(|n| !n.read).count();
        self.notifications = notifications;
    }

    /// Merge one change event.
    pub fn apply(&mut self, event: ChangeEvent) -> Option<FeedNotice> {
        match event {
            ChangeEvent::OrderUpdated(order) => {
                self.upsert_order(order);
                None
            }
            ChangeEvent::NotificationInserted(notification) => {
                if self.notifications.iter().any(|n| n.id == notification.id) {
                    return None;
                }
                let message = notification.message.clone();
                if !notification.read {
                    self.unread += 1;
                }
                self.notifications.insert(0, notification);
                Some(FeedNotice::Toast(message))
            }
        }
    }

    fn upsert_order(&mut self, order: Order) {
        match self.orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => *existing = order,
            None => self.orders.insert(0, order),
        }
    }

    /// Mark a notification read locally.
    ///
    /// Returns true when it was unread. The counter never drops below zero.
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        match self.notifications.iter_mut().find(|n| &n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                self.unread = self.unread.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{OrderStatus, PaymentMethod};
    use crate::ids::{OrderId, UserId};
    use crate::money::{Currency, Money};
    use chrono::Utc;

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new("u1"),
            status,
            total: Money::new(3099, Currency::USD),
            payment_method: PaymentMethod::CashOnDelivery,
            shipping_address: "1 Main, Town, ST - 00001".into(),
            phone: "555".into(),
            created_at: Utc::now(),
        }
    }

    fn notification(id: &str, read: bool) -> Notification {
        Notification {
            id: NotificationId::new(id),
            user_id: UserId::new("u1"),
            message: format!("message {id}"),
            read,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_update_is_idempotent() {
        let mut feed = UserFeed::new();
        feed.load_orders(vec![order("o1", OrderStatus::Pending), order("o2", OrderStatus::Pending)]);

        let event = ChangeEvent::OrderUpdated(order("o1", OrderStatus::Shipped));
        feed.apply(event.clone());
        let once = feed.clone();
        feed.apply(event);

        assert_eq!(feed, once);
        assert_eq!(feed.orders().len(), 2);
        assert_eq!(feed.orders()[0].status, OrderStatus::Shipped);
    }

    #[test]
    fn test_unknown_order_is_inserted() {
        let mut feed = UserFeed::new();
        feed.apply(ChangeEvent::OrderUpdated(order("o9", OrderStatus::Processing)));
        assert_eq!(feed.orders().len(), 1);
    }

    #[test]
    fn test_notification_insert_prepends_and_counts() {
        let mut feed = UserFeed::new();
        feed.load_notifications(vec![notification("n1", true), notification("n2", false)]);
        assert_eq!(feed.unread_count(), 1);

        let notice = feed.apply(ChangeEvent::NotificationInserted(notification("n3", false)));
        assert_eq!(notice, Some(FeedNotice::Toast("message n3".into())));
        assert_eq!(feed.notifications()[0].id, NotificationId::new("n3"));
        assert_eq!(feed.unread_count(), 2);
    }

    #[test]
    fn test_duplicate_notification_ignored() {
        let mut feed = UserFeed::new();
        let event = ChangeEvent::NotificationInserted(notification("n1", false));
        feed.apply(event.clone());
        assert_eq!(feed.apply(event), None);
        assert_eq!(feed.unread_count(), 1);
        assert_eq!(feed.notifications().len(), 1);
    }

    #[test]
    fn test_mark_read_never_negative() {
        let mut feed = UserFeed::new();
        feed.apply(ChangeEvent::NotificationInserted(notification("n1", false)));

        assert!(feed.mark_read(&NotificationId::new("n1")));
        assert!(!feed.mark_read(&NotificationId::new("n1")));
        assert!(!feed.mark_read(&NotificationId::new("missing")));
        assert_eq!(feed.unread_count(), 0);
    }
}
