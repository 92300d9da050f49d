//! Live view of the current user's orders and notifications.
//!
//! The notifier subscribes to both entities for the signed-in user, loads
//! the initial rows and then folds change events into a [`UserFeed`].

use tracing::{debug, info, warn};

use shopfront_commerce::checkout::{Order, OrderDetails};
use shopfront_commerce::ids::{NotificationId, OrderId, UserId};
use shopfront_commerce::notify::{ChangeEvent, FeedNotice, Notification, UserFeed};
use shopfront_data::{Backend, DataError, Subscription, Table};

use crate::error::NotifierError;

async fn recv(subscription: &mut Option<Subscription>) -> Option<ChangeEvent> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => None,
    }
}

/// Orders and notifications of one user, kept current by the change feed.
#[derive(Debug)]
pub struct OrderStatusNotifier<B> {
    backend: B,
    user_id: UserId,
    limit: usize,
    feed: UserFeed,
    orders: Option<Subscription>,
    notifications: Option<Subscription>,
}

impl<B: Backend> OrderStatusNotifier<B> {
    /// Subscribe and load the initial state for the signed-in user.
    ///
    /// Subscriptions are opened before the first fetch so that no change
    /// between the two is lost; replays are absorbed by the feed.
    pub async fn start(backend: B, notification_limit: usize) -> Result<Self, NotifierError> {
        let user = backend.current_user().await?;
        let user_id = user.require_authenticated()?.clone();

        let orders = backend.subscribe(Table::Orders, &user_id)?;
        let notifications = backend.subscribe(Table::Notifications, &user_id)?;

        let mut notifier = Self {
            backend,
            user_id,
            limit: notification_limit,
            feed: UserFeed::new(),
            orders: Some(orders),
            notifications: Some(notifications),
        };
        notifier.reload().await?;
        info!(user_id = %notifier.user_id, "Notifier started");
        Ok(notifier)
    }

    /// Replace local state with a fresh fetch.
    pub async fn reload(&mut self) -> Result<(), NotifierError> {
        let (orders, notifications) = futures::try_join!(
            self.backend.list_orders(Some(&self.user_id)),
            self.backend.list_notifications(&self.user_id, self.limit)
        )?;
        debug!(
            orders = orders.len(),
            notifications = notifications.len(),
            "Feed loaded"
        );
        self.feed.load_orders(orders);
        self.feed.load_notifications(notifications);
        Ok(())
    }

    /// Merge one event into local state.
    pub fn apply(&mut self, event: ChangeEvent) -> Option<FeedNotice> {
        match &event {
            ChangeEvent::OrderUpdated(order) => {
                debug!(order_id = %order.id, status = %order.status, "Order update received")
            }
            ChangeEvent::NotificationInserted(n) => {
                debug!(notification_id = %n.id, "Notification received")
            }
        }
        self.feed.apply(event)
    }

    /// Wait for the next event that produces a notice.
    ///
    /// Order updates are merged along the way. Returns `None` once both
    /// subscriptions are closed.
    pub async fn next_notice(&mut self) -> Option<FeedNotice> {
        loop {
            let event = tokio::select! {
                Some(event) = recv(&mut self.orders) => event,
                Some(event) = recv(&mut self.notifications) => event,
                else => return None,
            };
            if let Some(notice) = self.apply(event) {
                return Some(notice);
            }
        }
    }

    /// Apply every event already delivered, without waiting.
    pub fn drain(&mut self) -> Vec<FeedNotice> {
        let mut events = Vec::new();
        for sub in [&mut self.orders, &mut self.notifications].into_iter().flatten() {
            while let Some(event) = sub.try_recv() {
                events.push(event);
            }
        }
        events
            .into_iter()
            .filter_map(|event| self.apply(event))
            .collect()
    }

    /// Mark a notification read here and in the backend.
    ///
    /// Returns false when it was unknown or already read; then nothing is sent.
    pub async fn mark_read(&mut self, id: &NotificationId) -> Result<bool, NotifierError> {
        let unread = self
            .feed
            .notifications()
            .iter()
            .any(|n| &n.id == id && !n.read);
        if !unread {
            return Ok(false);
        }
        self.backend.mark_notification_read(id).await?;
        Ok(self.feed.mark_read(id))
    }

    /// One of the user's orders with its line items.
    pub async fn order_details(&self, id: &OrderId) -> Result<OrderDetails, NotifierError> {
        let order = self.backend.get_order(id).await.map_err(|e| match e {
            DataError::NotFound { .. } => NotifierError::OrderNotFound(id.clone()),
            other => NotifierError::Backend(other),
        })?;
        if order.user_id != self.user_id {
            warn!(order_id = %id, user_id = %self.user_id, "Order belongs to another user");
            return Err(NotifierError::OrderNotFound(id.clone()));
        }
        let items = self.backend.list_order_items(id).await?;
        Ok(OrderDetails { order, items })
    }

    /// Drop both subscriptions.
    pub fn close(&mut self) {
        for mut sub in [self.orders.take(), self.notifications.take()]
            .into_iter()
            .flatten()
        {
            sub.close();
        }
        debug!(user_id = %self.user_id, "Notifier closed");
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The user's orders, newest first.
    pub fn orders(&self) -> &[Order] {
        self.feed.orders()
    }

    pub fn notifications(&self) -> &[Notification] {
        self.feed.notifications()
    }

    pub fn unread_count(&self) -> usize {
        self.feed.unread_count()
    }

    pub fn feed(&self) -> &UserFeed {
        &self.feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use shopfront_auth::User;
    use shopfront_commerce::checkout::{OrderStatus, PaymentMethod};
    use shopfront_commerce::money::{Currency, Money};
    use shopfront_data::{MemoryBackend, NewNotification, NewOrder};

    fn new_order(owner: &str) -> NewOrder {
        NewOrder {
            user_id: UserId::new(owner),
            total: Money::new(3099, Currency::USD),
            payment_method: PaymentMethod::OnlineGateway,
            shipping_address: "1 Main St, Springfield, IL - 62701".into(),
            phone: "555-0100".into(),
            status: OrderStatus::Pending,
        }
    }

    type TestNotifier = OrderStatusNotifier<Arc<MemoryBackend>>;

    async fn started() -> (Arc<MemoryBackend>, TestNotifier, Order) {
        let backend = Arc::new(MemoryBackend::new());
        let order = backend.insert_order(new_order("u1")).await.unwrap();
        backend.insert_order(new_order("u2")).await.unwrap();
        backend.sign_in(User::customer("u1", "a@b.c")).unwrap();
        let notifier = OrderStatusNotifier::start(Arc::clone(&backend), 10)
            .await
            .unwrap();
        (backend, notifier, order)
    }

    #[tokio::test]
    async fn test_start_requires_sign_in() {
        let backend = Arc::new(MemoryBackend::new());
        let err = OrderStatusNotifier::start(backend, 10).await.unwrap_err();
        assert!(matches!(err, NotifierError::Auth(_)));
    }

    #[tokio::test]
    async fn test_initial_load_is_scoped_to_user() {
        let (_backend, notifier, order) = started().await;
        assert_eq!(notifier.orders().len(), 1);
        assert_eq!(notifier.orders()[0].id, order.id);
        assert_eq!(notifier.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_status_event_updates_order() {
        let (backend, mut notifier, order) = started().await;
        backend
            .update_order_status(&order.id, OrderStatus::Shipped)
            .await
            .unwrap();
        backend
            .insert_notification(NewNotification {
                user_id: UserId::new("u1"),
                message: OrderStatus::Shipped.notification_message().into(),
            })
            .await
            .unwrap();

        let notice = notifier.next_notice().await.unwrap();
        assert_eq!(
            notice,
            FeedNotice::Toast("Great news! Your order has been shipped".into())
        );
        notifier.drain();
        assert_eq!(notifier.orders()[0].status, OrderStatus::Shipped);
        assert_eq!(notifier.unread_count(), 1);
    }

    #[tokio::test]
    async fn test_drain_and_mark_read() {
        let (backend, mut notifier, _order) = started().await;
        let n = backend
            .insert_notification(NewNotification {
                user_id: UserId::new("u1"),
                message: "hello".into(),
            })
            .await
            .unwrap();
        backend
            .insert_notification(NewNotification {
                user_id: UserId::new("u2"),
                message: "not mine".into(),
            })
            .await
            .unwrap();

        assert_eq!(notifier.drain(), vec![FeedNotice::Toast("hello".into())]);
        assert_eq!(notifier.unread_count(), 1);

        assert!(notifier.mark_read(&n.id).await.unwrap());
        assert!(!notifier.mark_read(&n.id).await.unwrap());
        assert_eq!(notifier.unread_count(), 0);

        let stored = backend
            .list_notifications(&UserId::new("u1"), 10)
            .await
            .unwrap();
        assert!(stored[0].read);
    }

    #[tokio::test]
    async fn test_order_details_hides_other_users_orders() {
        let (backend, notifier, order) = started().await;
        let details = notifier.order_details(&order.id).await.unwrap();
        assert_eq!(details.order.id, order.id);

        let foreign = backend.list_orders(Some(&UserId::new("u2"))).await.unwrap();
        let err = notifier.order_details(&foreign[0].id).await.unwrap_err();
        assert_eq!(err, NotifierError::OrderNotFound(foreign[0].id.clone()));
    }

    #[tokio::test]
    async fn test_close_ends_next_notice() {
        let (backend, mut notifier, _order) = started().await;
        notifier.close();
        assert_eq!(backend.subscriber_count(), 0);
        assert!(notifier.next_notice().await.is_none());
    }
}
