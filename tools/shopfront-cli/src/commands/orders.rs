//! Order history and order status administration.

use anyhow::{bail, Result};

use shopfront_commerce::checkout::{Order, OrderStatus, StatusChange};
use shopfront_commerce::ids::OrderId;
use shopfront_core::{OrderAdmin, OrderDashboard, OrderStatusNotifier};

use super::{admin_result, OrdersArgs, OrdersCommand};
use crate::context::Context;

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(OrdersCommand::List { all: false }) {
        OrdersCommand::List { all } => list_orders(all, ctx).await,
        OrdersCommand::Show { id } => show_order(OrderId::new(id), ctx).await,
        OrdersCommand::SetStatus { id, status } => {
            set_status(OrderId::new(id), status.parse()?, ctx).await
        }
    }
}

async fn list_orders(all: bool, ctx: &Context) -> Result<()> {
    let orders = if all {
        let mut dashboard = OrderDashboard::new(ctx.backend.clone());
        admin_result(dashboard.refresh().await.map(<[Order]>::to_vec))?
    } else {
        let mut notifier =
            match OrderStatusNotifier::start(ctx.backend.clone(), ctx.config.store.notification_limit)
                .await
            {
                Ok(notifier) => notifier,
                Err(e) => bail!("{}", e.user_message()),
            };
        let orders = notifier.orders().to_vec();
        notifier.close();
        orders
    };

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    ctx.output.header(&format!("Orders ({})", orders.len()));
    if orders.is_empty() {
        ctx.output.info("No orders yet");
        return Ok(());
    }

    ctx.output.order_table(&orders);
    Ok(())
}

async fn show_order(id: OrderId, ctx: &Context) -> Result<()> {
    let details = if ctx.is_admin() {
        admin_result(OrderAdmin::new(ctx.backend.clone()).order_details(&id).await)?
    } else {
        let mut notifier =
            match OrderStatusNotifier::start(ctx.backend.clone(), ctx.config.store.notification_limit)
                .await
            {
                Ok(notifier) => notifier,
                Err(e) => bail!("{}", e.user_message()),
            };
        let details = notifier.order_details(&id).await;
        notifier.close();
        match details {
            Ok(details) => details,
            Err(e) => bail!("{}", e.user_message()),
        }
    };

    if ctx.output.is_json() {
        ctx.output.json(&details);
        return Ok(());
    }
    ctx.output.order_details(&details)?;
    Ok(())
}

async fn set_status(id: OrderId, status: OrderStatus, ctx: &Context) -> Result<()> {
    let mut dashboard = OrderDashboard::new(ctx.backend.clone());
    admin_result(dashboard.refresh().await.map(|_| ()))?;

    let spinner = ctx.output.spinner("Updating order status...");
    let result = dashboard.set_status(&id, status).await;
    spinner.finish_and_clear();

    let update = match result {
        Ok(update) => update,
        Err(e) => {
            // The dashboard re-fetched after the failure; anything it wrote is in the store.
            ctx.persist()?;
            return admin_result(Err(e));
        }
    };
    ctx.persist()?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "order": update.order,
            "changed": update.change.is_changed(),
            "notification": update.notification,
        }));
        return Ok(());
    }

    match update.change {
        StatusChange::Unchanged => {
            ctx.output
                .info(&format!("Order {} is already {}", id, status.display_name()));
        }
        StatusChange::Changed { from, to } => {
            ctx.output.success(&format!(
                "Order status updated: {} -> {}",
                from.display_name(),
                to.display_name()
            ));
            if let Some(notification) = &update.notification {
                ctx.output.kv("notified", update.order.user_id.as_str());
                ctx.output.kv("message", &notification.message);
            }
        }
    }

    Ok(())
}
