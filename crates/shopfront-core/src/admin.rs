//! Admin panel: product management and order status.
//!
//! Every call checks the administrator role claim of the current user
//! before touching the backend.

use tracing::{error, info, instrument, warn};

use shopfront_commerce::catalog::{Product, ProductDraft};
use shopfront_commerce::checkout::{Order, OrderDetails, OrderStatus, StatusChange};
use shopfront_commerce::ids::{OrderId, ProductId, UserId};
use shopfront_commerce::notify::Notification;
use shopfront_data::{Backend, DataError, NewNotification, ProductFilter, Table};

use crate::error::{AdminAction, AdminError};

async fn require_admin<B: Backend>(backend: &B) -> Result<UserId, AdminError> {
    let user = backend.current_user().await?;
    Ok(user.require_admin()?.clone())
}

/// Product CRUD for administrators.
#[derive(Debug, Clone)]
pub struct ProductAdmin<B> {
    backend: B,
}

impl<B: Backend> ProductAdmin<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AdminError> {
        require_admin(&self.backend).await?;
        self.backend
            .list_products(&ProductFilter::all())
            .await
            .map_err(AdminError::backend(AdminAction::FetchProducts))
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product, AdminError> {
        require_admin(&self.backend).await?;
        let draft = draft.validate()?;
        let mut created = self
            .backend
            .insert_products(vec![draft])
            .await
            .map_err(AdminError::backend(AdminAction::AddProduct))?;
        let product = created
            .pop()
            .ok_or_else(|| AdminError::Backend {
                action: AdminAction::AddProduct,
                source: DataError::RequestFailed {
                    table: Table::Products,
                    reason: "insert returned no row".into(),
                },
            })?;
        info!(product_id = %product.id, "Product added");
        Ok(product)
    }

    #[instrument(skip(self, draft))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: ProductDraft,
    ) -> Result<Product, AdminError> {
        require_admin(&self.backend).await?;
        let draft = draft.validate()?;
        let product = self
            .backend
            .update_product(id, draft)
            .await
            .map_err(AdminError::backend(AdminAction::UpdateProduct))?;
        info!(product_id = %id, "Product updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), AdminError> {
        require_admin(&self.backend).await?;
        self.backend
            .delete_product(id)
            .await
            .map_err(AdminError::backend(AdminAction::DeleteProduct))?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Remove the whole catalog; returns how many products were deleted.
    pub async fn delete_all_products(&self) -> Result<usize, AdminError> {
        require_admin(&self.backend).await?;
        let removed = self
            .backend
            .delete_all_products()
            .await
            .map_err(AdminError::backend(AdminAction::DeleteAllProducts))?;
        warn!(removed, "All products deleted");
        Ok(removed)
    }
}

/// Result of a status update.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub order: Order,
    pub change: StatusChange,
    /// The notification sent to the owner; `None` when nothing changed.
    pub notification: Option<Notification>,
}

/// Order management for administrators.
#[derive(Debug, Clone)]
pub struct OrderAdmin<B> {
    backend: B,
}

impl<B: Backend> OrderAdmin<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// All orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>, AdminError> {
        require_admin(&self.backend).await?;
        self.backend
            .list_orders(None)
            .await
            .map_err(AdminError::backend(AdminAction::FetchOrders))
    }

    pub async fn order_details(&self, id: &OrderId) -> Result<OrderDetails, AdminError> {
        require_admin(&self.backend).await?;
        let fetch = AdminError::backend(AdminAction::FetchOrders);
        let (order, items) = futures::try_join!(
            self.backend.get_order(id),
            self.backend.list_order_items(id)
        )
        .map_err(fetch)?;
        Ok(OrderDetails { order, items })
    }

    /// Move an order to `status` and notify its owner.
    ///
    /// Setting the current status again changes nothing and sends nothing.
    /// If the notification cannot be stored the previous status is written
    /// back, so every transition that sticks has exactly one notification.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<StatusUpdate, AdminError> {
        require_admin(&self.backend).await?;
        let current = self
            .backend
            .get_order(id)
            .await
            .map_err(AdminError::backend(AdminAction::UpdateOrderStatus))?;

        let change = current.status.transition(status)?;
        if !change.is_changed() {
            info!(order_id = %id, status = %status, "Status unchanged");
            return Ok(StatusUpdate {
                order: current,
                change,
                notification: None,
            });
        }

        let order = self
            .backend
            .update_order_status(id, status)
            .await
            .map_err(AdminError::backend(AdminAction::UpdateOrderStatus))?;

        let notification = match self
            .backend
            .insert_notification(NewNotification {
                user_id: order.user_id.clone(),
                message: status.notification_message().to_string(),
            })
            .await
        {
            Ok(notification) => notification,
            Err(e) => {
                error!(order_id = %id, error = %e, "Notification failed, restoring previous status");
                self.restore_status(id, current.status).await;
                return Err(AdminError::backend(AdminAction::UpdateOrderStatus)(e));
            }
        };

        info!(
            order_id = %id,
            from = %current.status,
            to = %status,
            user_id = %order.user_id,
            "Order status updated"
        );
        Ok(StatusUpdate {
            order,
            change,
            notification: Some(notification),
        })
    }

    /// Put back the status an order had before a half-finished update.
    async fn restore_status(&self, id: &OrderId, previous: OrderStatus) {
        match self.backend.update_order_status(id, previous).await {
            Ok(_) => info!(order_id = %id, status = %previous, "Order status restored"),
            Err(e) => error!(
                order_id = %id,
                status = %previous,
                error = %e,
                "Failed to restore order status"
            ),
        }
    }
}

/// The admin order list with optimistic status edits.
///
/// A status edit is shown immediately; if the backend rejects it the list
/// is re-fetched so it shows the authoritative state again, or the old
/// status is put back locally when the re-fetch fails too.
#[derive(Debug, Clone)]
pub struct OrderDashboard<B> {
    admin: OrderAdmin<B>,
    orders: Vec<Order>,
}

impl<B: Backend> OrderDashboard<B> {
    pub fn new(backend: B) -> Self {
        Self {
            admin: OrderAdmin::new(backend),
            orders: Vec::new(),
        }
    }

    pub async fn refresh(&mut self) -> Result<&[Order], AdminError> {
        self.orders = self.admin.list_orders().await?;
        Ok(&self.orders)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == id)
    }

    pub async fn set_status(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<StatusUpdate, AdminError> {
        let previous = self
            .orders
            .iter_mut()
            .find(|o| &o.id == id)
            .map(|order| std::mem::replace(&mut order.status, status));

        match self.admin.update_status(id, status).await {
            Ok(update) => {
                if let Some(order) = self.orders.iter_mut().find(|o| &o.id == id) {
                    *order = update.order.clone();
                }
                Ok(update)
            }
            Err(e) => {
                if let Err(refetch) = self.refresh().await {
                    warn!(order_id = %id, error = %refetch, "Refetch failed, reverting locally");
                    if let (Some(order), Some(previous)) =
                        (self.orders.iter_mut().find(|o| &o.id == id), previous)
                    {
                        order.status = previous;
                    }
                }
                Err(e)
            }
        }
    }
}
