//! The hosted backend as seen by the storefront.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use shopfront_auth::IdentityProvider;
use shopfront_commerce::catalog::{Product, ProductDraft, Review};
use shopfront_commerce::checkout::{Order, OrderDraft, OrderLineItem, OrderStatus, PaymentMethod};
use shopfront_commerce::ids::{NotificationId, OrderId, ProductId, UserId};
use shopfront_commerce::money::Money;
use shopfront_commerce::notify::{ChangeEvent, Notification};

use crate::DataResult;

/// Named entities of the row store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Products,
    Reviews,
    Orders,
    OrderItems,
    Notifications,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Reviews => "reviews",
            Table::Orders => "orders",
            Table::OrderItems => "order_items",
            Table::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product query: equality on category, exclusion of one id, limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub exclude: Option<ProductId>,
    pub limit: Option<usize>,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Products sharing `category`, other than `exclude`.
    pub fn similar_to(product: &Product, limit: usize) -> Self {
        Self {
            category: Some(product.category.clone()),
            exclude: Some(product.id.clone()),
            limit: Some(limit),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_ref()
            .map_or(true, |c| &product.category == c)
            && self.exclude.as_ref().map_or(true, |id| &product.id != id)
    }
}

/// Review query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    pub product_id: Option<ProductId>,
    pub verified_only: bool,
}

impl ReviewFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_product(product_id: ProductId) -> Self {
        Self {
            product_id: Some(product_id),
            verified_only: false,
        }
    }

    pub fn verified(mut self) -> Self {
        self.verified_only = true;
        self
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.product_id
            .as_ref()
            .map_or(true, |id| &review.product_id == id)
            && (!self.verified_only || review.verified_purchase)
    }
}

/// Review insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: u8,
    pub comment: String,
    pub verified_purchase: bool,
}

/// Order header insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub phone: String,
    pub status: OrderStatus,
}

impl From<&OrderDraft> for NewOrder {
    fn from(draft: &OrderDraft) -> Self {
        Self {
            user_id: draft.user_id.clone(),
            total: draft.total(),
            payment_method: draft.payment_method,
            shipping_address: draft.shipping_address.clone(),
            phone: draft.phone.clone(),
            status: draft.status,
        }
    }
}

/// Order line insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

impl NewOrderItem {
    /// One insert per draft line, bound to the created order.
    pub fn for_draft(order_id: &OrderId, draft: &OrderDraft) -> Vec<Self> {
        draft
            .lines
            .iter()
            .map(|line| Self {
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect()
    }
}

/// Notification insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: UserId,
    pub message: String,
}

/// Live change events for one entity and owner.
///
/// Delivery is at-least-once; consumers merge by identity.
#[derive(Debug)]
pub struct Subscription {
    table: Table,
    owner: UserId,
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl Subscription {
    pub fn new(table: Table, owner: UserId, rx: mpsc::UnboundedReceiver<ChangeEvent>) -> Self {
        Self { table, owner, rx }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Wait for the next event; `None` once the backend drops the feed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Take an already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }

    /// Stop receiving; pending events are discarded.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// Row store, change feed and identity of the hosted backend.
#[async_trait]
pub trait Backend: IdentityProvider {
    // Products
    async fn list_products(&self, filter: &ProductFilter) -> DataResult<Vec<Product>>;
    async fn get_product(&self, id: &ProductId) -> DataResult<Product>;
    async fn count_products(&self) -> DataResult<usize>;
    async fn insert_products(&self, drafts: Vec<ProductDraft>) -> DataResult<Vec<Product>>;
    async fn update_product(&self, id: &ProductId, draft: ProductDraft) -> DataResult<Product>;
    async fn delete_product(&self, id: &ProductId) -> DataResult<()>;
    /// Delete every product; returns how many were removed.
    async fn delete_all_products(&self) -> DataResult<usize>;

    // Reviews
    async fn list_reviews(&self, filter: &ReviewFilter) -> DataResult<Vec<Review>>;
    async fn insert_review(&self, review: NewReview) -> DataResult<Review>;

    // Orders
    async fn insert_order(&self, order: NewOrder) -> DataResult<Order>;
    async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> DataResult<Vec<OrderLineItem>>;
    async fn delete_order(&self, id: &OrderId) -> DataResult<()>;
    async fn get_order(&self, id: &OrderId) -> DataResult<Order>;
    /// Orders newest first, optionally restricted to one owner.
    async fn list_orders(&self, owner: Option<&UserId>) -> DataResult<Vec<Order>>;
    async fn list_order_items(&self, order_id: &OrderId) -> DataResult<Vec<OrderLineItem>>;
    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> DataResult<Order>;
    /// Whether `user` has a non-cancelled order containing `product`.
    async fn has_purchased(&self, user: &UserId, product: &ProductId) -> DataResult<bool>;

    // Notifications
    async fn insert_notification(&self, notification: NewNotification)
        -> DataResult<Notification>;
    /// Latest notifications of `owner`, newest first.
    async fn list_notifications(&self, owner: &UserId, limit: usize)
        -> DataResult<Vec<Notification>>;
    async fn mark_notification_read(&self, id: &NotificationId) -> DataResult<()>;

    /// Subscribe to changes on `table` rows owned by `owner`.
    fn subscribe(&self, table: Table, owner: &UserId) -> DataResult<Subscription>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn list_products(&self, filter: &ProductFilter) -> DataResult<Vec<Product>> {
        (**self).list_products(filter).await
    }
    async fn get_product(&self, id: &ProductId) -> DataResult<Product> {
        (**self).get_product(id).await
    }
    async fn count_products(&self) -> DataResult<usize> {
        (**self).count_products().await
    }
    async fn insert_products(&self, drafts: Vec<ProductDraft>) -> DataResult<Vec<Product>> {
        (**self).insert_products(drafts).await
    }
    async fn update_product(&self, id: &ProductId, draft: ProductDraft) -> DataResult<Product> {
        (**self).update_product(id, draft).await
    }
    async fn delete_product(&self, id: &ProductId) -> DataResult<()> {
        (**self).delete_product(id).await
    }
    async fn delete_all_products(&self) -> DataResult<usize> {
        (**self).delete_all_products().await
    }
    async fn list_reviews(&self, filter: &ReviewFilter) -> DataResult<Vec<Review>> {
        (**self).list_reviews(filter).await
    }
    async fn insert_review(&self, review: NewReview) -> DataResult<Review> {
        (**self).insert_review(review).await
    }
    async fn insert_order(&self, order: NewOrder) -> DataResult<Order> {
        (**self).insert_order(order).await
    }
    async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> DataResult<Vec<OrderLineItem>> {
        (**self).insert_order_items(items).await
    }
    async fn delete_order(&self, id: &OrderId) -> DataResult<()> {
        (**self).delete_order(id).await
    }
    async fn get_order(&self, id: &OrderId) -> DataResult<Order> {
        (**self).get_order(id).await
    }
    async fn list_orders(&self, owner: Option<&UserId>) -> DataResult<Vec<Order>> {
        (**self).list_orders(owner).await
    }
    async fn list_order_items(&self, order_id: &OrderId) -> DataResult<Vec<OrderLineItem>> {
        (**self).list_order_items(order_id).await
    }
    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> DataResult<Order> {
        (**self).update_order_status(id, status).await
    }
    async fn has_purchased(&self, user: &UserId, product: &ProductId) -> DataResult<bool> {
        (**self).has_purchased(user, product).await
    }
    async fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> DataResult<Notification> {
        (**self).insert_notification(notification).await
    }
    async fn list_notifications(
        &self,
        owner: &UserId,
        limit: usize,
    ) -> DataResult<Vec<Notification>> {
        (**self).list_notifications(owner, limit).await
    }
    async fn mark_notification_read(&self, id: &NotificationId) -> DataResult<()> {
        (**self).mark_notification_read(id).await
    }
    fn subscribe(&self, table: Table, owner: &UserId) -> DataResult<Subscription> {
        (**self).subscribe(table, owner)
    }
}
