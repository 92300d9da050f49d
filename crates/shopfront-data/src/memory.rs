//! In-process backend with a JSON snapshot.
//!
//! Rows live in memory behind a mutex. Status updates and notification
//! inserts are pushed to subscribers of the owning user, and any operation
//! can be made to fail on demand for exercising error paths.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use shopfront_auth::{AuthError, IdentityProvider, StaticIdentity, User};
use shopfront_commerce::catalog::{Product, ProductDraft, Review};
use shopfront_commerce::checkout::{Order, OrderLineItem, OrderStatus};
use shopfront_commerce::ids::{
    NotificationId, OrderId, OrderItemId, ProductId, ReviewId, UserId,
};
use shopfront_commerce::notify::{ChangeEvent, Notification};

use crate::backend::{
    Backend, NewNotification, NewOrder, NewOrderItem, NewReview, ProductFilter, ReviewFilter,
    Subscription, Table,
};
use crate::{DataError, DataResult};

/// Backend calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListProducts,
    GetProduct,
    CountProducts,
    InsertProducts,
    UpdateProduct,
    DeleteProduct,
    DeleteAllProducts,
    ListReviews,
    InsertReview,
    InsertOrder,
    InsertOrderItems,
    DeleteOrder,
    GetOrder,
    ListOrders,
    ListOrderItems,
    UpdateOrderStatus,
    HasPurchased,
    InsertNotification,
    ListNotifications,
    MarkNotificationRead,
    Subscribe,
}

impl Operation {
    /// The table the operation works on.
    pub fn table(&self) -> Table {
        use Operation::*;
        match self {
            ListProducts | GetProduct | CountProducts | InsertProducts | UpdateProduct
            | DeleteProduct | DeleteAllProducts => Table::Products,
            ListReviews | InsertReview => Table::Reviews,
            InsertOrder | DeleteOrder | GetOrder | ListOrders | UpdateOrderStatus
            | HasPurchased => Table::Orders,
            InsertOrderItems | ListOrderItems => Table::OrderItems,
            InsertNotification | ListNotifications | MarkNotificationRead | Subscribe => {
                Table::Notifications
            }
        }
    }
}

/// All rows, as persisted in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub order_items: Vec<OrderLineItem>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[derive(Debug)]
struct Subscriber {
    table: Table,
    owner: UserId,
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

/// In-memory [`Backend`] and [`IdentityProvider`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    failures: Mutex<HashMap<Operation, String>>,
    subscribers: Mutex<Vec<Subscriber>>,
    identity: StaticIdentity,
}

fn lock<T>(mutex: &Mutex<T>) -> DataResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| DataError::Poisoned)
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing rows.
    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: Mutex::new(tables),
            ..Self::default()
        }
    }

    /// Load a snapshot file; a missing file yields an empty backend.
    pub fn open(path: impl AsRef<Path>) -> DataResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No snapshot, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let tables: Tables = serde_json::from_str(&content)
            .map_err(|e| DataError::Snapshot(format!("{}: {}", path.display(), e)))?;
        info!(
            path = %path.display(),
            products = tables.products.len(),
            orders = tables.orders.len(),
            "Loaded snapshot"
        );
        Ok(Self::with_tables(tables))
    }

    /// Write every row to `path` as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> DataResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.tables()?)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Saved snapshot");
        Ok(())
    }

    /// Copy of the current rows.
    pub fn tables(&self) -> DataResult<Tables> {
        Ok(lock(&self.tables)?.clone())
    }

    /// Make `operation` fail with `reason` until cleared.
    pub fn inject_failure(&self, operation: Operation, reason: impl Into<String>) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(operation, reason.into());
        }
    }

    pub fn clear_failure(&self, operation: Operation) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.remove(&operation);
        }
    }

    pub fn sign_in(&self, user: User) -> Result<(), AuthError> {
        self.identity.sign_in(user)
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.identity.sign_out()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|mut subs| {
                subs.retain(|s| !s.tx.is_closed());
                subs.len()
            })
            .unwrap_or(0)
    }

    fn check(&self, operation: Operation) -> DataResult<()> {
        match lock(&self.failures)?.get(&operation) {
            Some(reason) => {
                warn!(?operation, %reason, "Injected failure");
                Err(DataError::RequestFailed {
                    table: operation.table(),
                    reason: reason.clone(),
                })
            }
            None => Ok(()),
        }
    }

    fn publish(&self, table: Table, owner: &UserId, event: ChangeEvent) -> DataResult<()> {
        let mut subs = lock(&self.subscribers)?;
        subs.retain(|s| !s.tx.is_closed());
        let mut delivered = 0usize;
        for sub in subs.iter().filter(|s| s.table == table && &s.owner == owner) {
            if sub.tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        debug!(%table, owner = %owner, delivered, "Published change");
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn current_user(&self) -> Result<User, AuthError> {
        self.identity.current_user().await
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_products(&self, filter: &ProductFilter) -> DataResult<Vec<Product>> {
        self.check(Operation::ListProducts)?;
        let tables = lock(&self.tables)?;
        let matching = tables.products.iter().filter(|p| filter.matches(p)).cloned();
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn get_product(&self, id: &ProductId) -> DataResult<Product> {
        self.check(Operation::GetProduct)?;
        lock(&self.tables)?
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| DataError::not_found(Table::Products, id))
    }

    async fn count_products(&self) -> DataResult<usize> {
        self.check(Operation::CountProducts)?;
        Ok(lock(&self.tables)?.products.len())
    }

    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    async fn insert_products(&self, drafts: Vec<ProductDraft>) -> DataResult<Vec<Product>> {
        self.check(Operation::InsertProducts)?;
        let created: Vec<Product> = drafts
            .into_iter()
            .map(|draft| Product::from_draft(ProductId::generate(), draft))
            .collect();
        lock(&self.tables)?.products.extend(created.iter().cloned());
        info!(count = created.len(), "Products inserted");
        Ok(created)
    }

    async fn update_product(&self, id: &ProductId, draft: ProductDraft) -> DataResult<Product> {
        self.check(Operation::UpdateProduct)?;
        let mut tables = lock(&self.tables)?;
        let slot = tables
            .products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| DataError::not_found(Table::Products, id))?;
        *slot = Product::from_draft(id.clone(), draft);
        Ok(slot.clone())
    }

    async fn delete_product(&self, id: &ProductId) -> DataResult<()> {
        self.check(Operation::DeleteProduct)?;
        let mut tables = lock(&self.tables)?;
        let before = tables.products.len();
        tables.products.retain(|p| &p.id != id);
        if tables.products.len() == before {
            return Err(DataError::not_found(Table::Products, id));
        }
        Ok(())
    }

    async fn delete_all_products(&self) -> DataResult<usize> {
        self.check(Operation::DeleteAllProducts)?;
        let removed = std::mem::take(&mut lock(&self.tables)?.products).len();
        info!(removed, "All products deleted");
        Ok(removed)
    }

    async fn list_reviews(&self, filter: &ReviewFilter) -> DataResult<Vec<Review>> {
        self.check(Operation::ListReviews)?;
        Ok(lock(&self.tables)?
            .reviews
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn insert_review(&self, review: NewReview) -> DataResult<Review> {
        self.check(Operation::InsertReview)?;
        let mut tables = lock(&self.tables)?;
        if !tables.products.iter().any(|p| p.id == review.product_id) {
            return Err(DataError::not_found(Table::Products, &review.product_id));
        }
        let row = Review {
            id: ReviewId::generate(),
            product_id: review.product_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            verified_purchase: review.verified_purchase,
            created_at: Utc::now(),
        };
        tables.reviews.push(row.clone());
        Ok(row)
    }

    #[instrument(skip(self, order), fields(user_id = %order.user_id))]
    async fn insert_order(&self, order: NewOrder) -> DataResult<Order> {
        self.check(Operation::InsertOrder)?;
        let row = Order {
            id: OrderId::generate(),
            user_id: order.user_id,
            status: order.status,
            total: order.total,
            payment_method: order.payment_method,
            shipping_address: order.shipping_address,
            phone: order.phone,
            created_at: Utc::now(),
        };
        lock(&self.tables)?.orders.push(row.clone());
        info!(order_id = %row.id, total = %row.total, "Order inserted");
        Ok(row)
    }

    async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> DataResult<Vec<OrderLineItem>> {
        self.check(Operation::InsertOrderItems)?;
        let mut tables = lock(&self.tables)?;
        if let Some(missing) = items
            .iter()
            .find(|item| !tables.orders.iter().any(|o| o.id == item.order_id))
        {
            return Err(DataError::not_found(Table::Orders, &missing.order_id));
        }
        let rows: Vec<OrderLineItem> = items
            .into_iter()
            .map(|item| OrderLineItem {
                id: OrderItemId::generate(),
                order_id: item.order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();
        tables.order_items.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn delete_order(&self, id: &OrderId) -> DataResult<()> {
        self.check(Operation::DeleteOrder)?;
        let mut tables = lock(&self.tables)?;
        let before = tables.orders.len();
        tables.orders.retain(|o| &o.id != id);
        if tables.orders.len() == before {
            return Err(DataError::not_found(Table::Orders, id));
        }
        tables.order_items.retain(|i| &i.order_id != id);
        info!(order_id = %id, "Order deleted");
        Ok(())
    }

    async fn get_order(&self, id: &OrderId) -> DataResult<Order> {
        self.check(Operation::GetOrder)?;
        lock(&self.tables)?
            .orders
            .iter()
            .find(|o| &o.id == id)
            .cloned()
            .ok_or_else(|| DataError::not_found(Table::Orders, id))
    }

    async fn list_orders(&self, owner: Option<&UserId>) -> DataResult<Vec<Order>> {
        self.check(Operation::ListOrders)?;
        let tables = lock(&self.tables)?;
        // Later inserts first among equal timestamps.
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .rev()
            .filter(|o| owner.map_or(true, |u| &o.user_id == u))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_order_items(&self, order_id: &OrderId) -> DataResult<Vec<OrderLineItem>> {
        self.check(Operation::ListOrderItems)?;
        Ok(lock(&self.tables)?
            .order_items
            .iter()
            .filter(|i| &i.order_id == order_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> DataResult<Order> {
        self.check(Operation::UpdateOrderStatus)?;
        let updated = {
            let mut tables = lock(&self.tables)?;
            let order = tables
                .orders
                .iter_mut()
                .find(|o| &o.id == id)
                .ok_or_else(|| DataError::not_found(Table::Orders, id))?;
            order.status = status;
            order.clone()
        };
        info!(order_id = %id, status = %status, "Order status updated");
        self.publish(
            Table::Orders,
            &updated.user_id,
            ChangeEvent::OrderUpdated(updated.clone()),
        )?;
        Ok(updated)
    }

    async fn has_purchased(&self, user: &UserId, product: &ProductId) -> DataResult<bool> {
        self.check(Operation::HasPurchased)?;
        let tables = lock(&self.tables)?;
        Ok(tables
            .orders
            .iter()
            .filter(|o| &o.user_id == user && o.status != OrderStatus::Cancelled)
            .any(|o| {
                tables
                    .order_items
                    .iter()
                    .any(|i| i.order_id == o.id && &i.product_id == product)
            }))
    }

    async fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> DataResult<Notification> {
        self.check(Operation::InsertNotification)?;
        let row = Notification {
            id: NotificationId::generate(),
            user_id: notification.user_id,
            message: notification.message,
            read: false,
            created_at: Utc::now(),
        };
        lock(&self.tables)?.notifications.push(row.clone());
        self.publish(
            Table::Notifications,
            &row.user_id,
            ChangeEvent::NotificationInserted(row.clone()),
        )?;
        Ok(row)
    }

    async fn list_notifications(
        &self,
        owner: &UserId,
        limit: usize,
    ) -> DataResult<Vec<Notification>> {
        self.check(Operation::ListNotifications)?;
        let tables = lock(&self.tables)?;
        let mut rows: Vec<Notification> = tables
            .notifications
            .iter()
            .rev()
            .filter(|n| &n.user_id == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn mark_notification_read(&self, id: &NotificationId) -> DataResult<()> {
        self.check(Operation::MarkNotificationRead)?;
        let mut tables = lock(&self.tables)?;
        let row = tables
            .notifications
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| DataError::not_found(Table::Notifications, id))?;
        row.read = true;
        Ok(())
    }

    fn subscribe(&self, table: Table, owner: &UserId) -> DataResult<Subscription> {
        self.check(Operation::Subscribe)?;
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.subscribers)?.push(Subscriber {
            table,
            owner: owner.clone(),
            tx,
        });
        debug!(%table, owner = %owner, "Subscribed");
        Ok(Subscription::new(table, owner.clone(), rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_commerce::checkout::PaymentMethod;
    use shopfront_commerce::money::{Currency, Money};

    fn draft(name: &str, category: &str, cents: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            price: Money::new(cents, Currency::USD),
            original_price: Money::new(cents, Currency::USD),
            discount: 0,
            description: String::new(),
            images: vec![],
            category: category.to_string(),
            in_stock: 10,
        }
    }

    fn new_order(user: &str) -> NewOrder {
        NewOrder {
            user_id: UserId::new(user),
            total: Money::new(3099, Currency::USD),
            payment_method: PaymentMethod::CashOnDelivery,
            shipping_address: "1 Main St, Springfield, IL - 62701".to_string(),
            phone: "555-0100".to_string(),
            status: OrderStatus::Pending,
        }
    }

    async fn place(backend: &MemoryBackend, user: &str, product: &ProductId) -> Order {
        let order = backend.insert_order(new_order(user)).await.unwrap();
        backend
            .insert_order_items(vec![NewOrderItem {
                order_id: order.id.clone(),
                product_id: product.clone(),
                quantity: 1,
                unit_price: Money::new(1000, Currency::USD),
            }])
            .await
            .unwrap();
        order
    }

    #[tokio::test]
    async fn test_product_filter_excludes_and_limits() {
        let backend = MemoryBackend::new();
        let created = backend
            .insert_products(vec![
                draft("A", "shoes", 100),
                draft("B", "shoes", 200),
                draft("C", "shoes", 300),
                draft("D", "hats", 400),
            ])
            .await
            .unwrap();

        let similar = backend
            .list_products(&ProductFilter::similar_to(&created[0], 1))
            .await
            .unwrap();
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].name, "B");

        let all_shoes = backend
            .list_products(&ProductFilter {
                category: Some("shoes".into()),
                ..ProductFilter::all()
            })
            .await
            .unwrap();
        assert_eq!(all_shoes.len(), 3);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let backend = MemoryBackend::new();
        let err = backend.get_product(&ProductId::new("nope")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_all_products() {
        let backend = MemoryBackend::new();
        backend
            .insert_products(vec![draft("A", "x", 1), draft("B", "x", 2)])
            .await
            .unwrap();
        assert_eq!(backend.delete_all_products().await.unwrap(), 2);
        assert_eq!(backend.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let backend = MemoryBackend::new();
        backend.inject_failure(Operation::InsertOrder, "connection reset");

        let err = backend.insert_order(new_order("u1")).await.unwrap_err();
        assert_eq!(
            err,
            DataError::RequestFailed {
                table: Table::Orders,
                reason: "connection reset".into()
            }
        );

        backend.clear_failure(Operation::InsertOrder);
        assert!(backend.insert_order(new_order("u1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_order_items_require_existing_order() {
        let backend = MemoryBackend::new();
        let err = backend
            .insert_order_items(vec![NewOrderItem {
                order_id: OrderId::new("ghost"),
                product_id: ProductId::new("p"),
                quantity: 1,
                unit_price: Money::new(1, Currency::USD),
            }])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_order_removes_items() {
        let backend = MemoryBackend::new();
        let order = place(&backend, "u1", &ProductId::new("p1")).await;
        backend.delete_order(&order.id).await.unwrap();
        assert!(backend.list_order_items(&order.id).await.unwrap().is_empty());
        assert!(backend.get_order(&order.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_per_owner() {
        let backend = MemoryBackend::new();
        let first = backend.insert_order(new_order("u1")).await.unwrap();
        let second = backend.insert_order(new_order("u1")).await.unwrap();
        backend.insert_order(new_order("u2")).await.unwrap();

        let mine = backend.list_orders(Some(&UserId::new("u1"))).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[1].id, first.id);

        assert_eq!(backend.list_orders(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_has_purchased_ignores_cancelled_orders() {
        let backend = MemoryBackend::new();
        let product = ProductId::new("p1");
        let order = place(&backend, "u1", &product).await;
        let user = UserId::new("u1");

        assert!(backend.has_purchased(&user, &product).await.unwrap());
        assert!(!backend.has_purchased(&UserId::new("u2"), &product).await.unwrap());

        backend
            .update_order_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert!(!backend.has_purchased(&user, &product).await.unwrap());
    }

    #[tokio::test]
    async fn test_subscription_receives_own_events_only() {
        let backend = MemoryBackend::new();
        let mine = backend.insert_order(new_order("u1")).await.unwrap();
        let theirs = backend.insert_order(new_order("u2")).await.unwrap();

        let mut sub = backend.subscribe(Table::Orders, &UserId::new("u1")).unwrap();
        backend
            .update_order_status(&theirs.id, OrderStatus::Shipped)
            .await
            .unwrap();
        backend
            .update_order_status(&mine.id, OrderStatus::Processing)
            .await
            .unwrap();

        match sub.recv().await {
            Some(ChangeEvent::OrderUpdated(order)) => {
                assert_eq!(order.id, mine.id);
                assert_eq!(order.status, OrderStatus::Processing);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_closed_subscriptions_are_pruned() {
        let backend = MemoryBackend::new();
        let sub = backend
            .subscribe(Table::Notifications, &UserId::new("u1"))
            .unwrap();
        assert_eq!(backend.subscriber_count(), 1);
        drop(sub);
        assert_eq!(backend.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_notifications_newest_first_with_limit() {
        let backend = MemoryBackend::new();
        let owner = UserId::new("u1");
        for i in 0..12 {
            backend
                .insert_notification(NewNotification {
                    user_id: owner.clone(),
                    message: format!("n{}", i),
                })
                .await
                .unwrap();
        }

        let latest = backend.list_notifications(&owner, 10).await.unwrap();
        assert_eq!(latest.len(), 10);
        assert_eq!(latest[0].message, "n11");

        backend.mark_notification_read(&latest[0].id).await.unwrap();
        let again = backend.list_notifications(&owner, 1).await.unwrap();
        assert!(again[0].read);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = MemoryBackend::new();
        backend.insert_products(vec![draft("A", "x", 1)]).await.unwrap();
        backend.insert_order(new_order("u1")).await.unwrap();
        backend.save(&path).unwrap();

        let reopened = MemoryBackend::open(&path).unwrap();
        assert_eq!(reopened.tables().unwrap(), backend.tables().unwrap());
    }

    #[test]
    fn test_open_missing_snapshot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MemoryBackend::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(backend.tables().unwrap(), Tables::default());
    }

    #[tokio::test]
    async fn test_identity_switch() {
        let backend = MemoryBackend::new();
        assert!(!backend.current_user().await.unwrap().is_authenticated());
        backend.sign_in(User::customer("u1", "a@b.c")).unwrap();
        assert!(backend.current_user().await.unwrap().is_authenticated());
    }
}
