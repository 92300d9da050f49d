//! Order placement.
//!
//! Submission is two backend writes: the order header, then one line item
//! per cart entry. The cart is cleared only after both succeed. When the
//! second write fails the header is an orphan, handled per [`OrphanPolicy`].

use tracing::{error, info, instrument, warn};

use shopfront_commerce::cart::{Cart, CheckoutSummary};
use shopfront_commerce::checkout::{CheckoutForm, OrderDetails, OrderDraft, ShippingDetails};
use shopfront_commerce::ids::OrderId;
use shopfront_data::{Backend, NewOrder, NewOrderItem};

use crate::config::{OrphanPolicy, StoreConfig};
use crate::error::CheckoutError;

/// Turns a cart into a persisted order.
#[derive(Debug, Clone)]
pub struct CheckoutWorkflow<B> {
    backend: B,
    config: StoreConfig,
}

impl<B: Backend> CheckoutWorkflow<B> {
    pub fn new(backend: B, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    /// Subtotal, shipping and total for the cart as it stands.
    pub fn summary(&self, cart: &Cart) -> Result<CheckoutSummary, CheckoutError> {
        Ok(CheckoutSummary::for_cart(cart, self.config.shipping_fee())?)
    }

    /// An empty form with the email taken from the signed-in identity.
    pub async fn prefill(&self) -> Result<CheckoutForm, CheckoutError> {
        let user = self.backend.current_user().await?;
        user.require_authenticated()?;
        Ok(CheckoutForm {
            shipping: ShippingDetails {
                email: user.email().map(str::to_string),
                ..ShippingDetails::default()
            },
            ..CheckoutForm::default()
        })
    }

    /// Submit the cart as an order.
    ///
    /// Validation failures return before any backend call. On success the
    /// cart is empty and the saved order with its line items is returned;
    /// on any failure the cart is left as it was.
    #[instrument(skip_all, fields(lines = cart.line_count()))]
    pub async fn place_order(
        &self,
        cart: &mut Cart,
        form: &CheckoutForm,
    ) -> Result<OrderDetails, CheckoutError> {
        let user = self.backend.current_user().await?;
        let user_id = user.require_authenticated()?.clone();
        let draft = OrderDraft::from_cart(user_id, cart, form, self.config.shipping_fee())?;

        let order = self
            .backend
            .insert_order(NewOrder::from(&draft))
            .await
            .map_err(|e| {
                error!(user_id = %draft.user_id, error = %e, "Order header submission failed");
                CheckoutError::Backend(e)
            })?;

        let items = match self
            .backend
            .insert_order_items(NewOrderItem::for_draft(&order.id, &draft))
            .await
        {
            Ok(items) => items,
            Err(source) => {
                error!(order_id = %order.id, error = %source, "Line item submission failed");
                let compensated = self.resolve_orphan(&order.id).await;
                return Err(CheckoutError::PartialFailure {
                    order_id: order.id,
                    source,
                    compensated,
                });
            }
        };

        cart.clear();
        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total,
            items = items.len(),
            "Order placed"
        );
        Ok(OrderDetails { order, items })
    }

    /// Returns true when the orphaned header no longer exists.
    async fn resolve_orphan(&self, order_id: &OrderId) -> bool {
        match self.config.orphan_policy {
            OrphanPolicy::Keep => {
                warn!(order_id = %order_id, "Keeping order header without line items");
                false
            }
            OrphanPolicy::Compensate => match self.backend.delete_order(order_id).await {
                Ok(()) => {
                    info!(order_id = %order_id, "Deleted orphaned order header");
                    true
                }
                Err(e) => {
                    error!(
                        order_id = %order_id,
                        error = %e,
                        "Failed to delete orphaned order header"
                    );
                    false
                }
            },
        }
    }
}
