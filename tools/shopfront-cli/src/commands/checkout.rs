//! Order placement.

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;

use shopfront_commerce::cart::CartAction;
use shopfront_commerce::checkout::{CheckoutForm, PaymentMethod, ShippingDetails};
use shopfront_commerce::ids::ProductId;
use shopfront_core::{CatalogService, CheckoutError, StoreSession};

use super::CheckoutArgs;
use crate::context::Context;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let mut session = StoreSession::new(ctx.backend.clone(), ctx.config.store.clone());
    if let Err(e) = session.start().await {
        bail!("{}", e.user_message());
    }

    let catalog = CatalogService::new(ctx.backend.clone(), &ctx.config.store);
    for line in &args.items {
        let (id, quantity) = parse_line(line)?;
        let product = catalog.product(&id).await?;
        ctx.output
            .debug(&format!("Adding {} x {} ({})", quantity, product.name, product.price));
        session.dispatch(CartAction::AddItem { product, quantity })?;
    }

    let summary = session.summary()?;
    ctx.output.cart_summary(session.cart(), &summary)?;

    let payment_method: PaymentMethod = args.payment.parse()?;
    let form = CheckoutForm {
        shipping: ShippingDetails {
            phone: args.phone,
            email: session.user().email().map(str::to_string),
            address: args.address,
            city: args.city,
            state: args.state,
            postal_code: args.postal_code,
        },
        payment_method,
    };

    if args.dry_run {
        form.validate()?;
        ctx.output.info("Dry run, no order placed");
        return Ok(());
    }

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Place order for {}?", summary.total))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.info("Checkout cancelled");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner("Placing order...");
    let result = session.checkout(&form).await;
    spinner.finish_and_clear();

    match result {
        Ok(placed) => {
            ctx.persist()?;
            if ctx.output.is_json() {
                ctx.output.json(&placed);
            } else {
                ctx.output.success(&format!(
                    "Order {} placed: {} items, total {}",
                    placed.order.id,
                    placed.item_count(),
                    placed.order.total
                ));
                ctx.output.kv("payment", placed.order.payment_method.display_name());
                ctx.output.kv("ship to", &placed.order.shipping_address);
            }
            session.end();
            Ok(())
        }
        Err(e) => {
            if matches!(e, CheckoutError::PartialFailure { .. }) {
                // A kept or uncompensated header is still in the store.
                ctx.persist()?;
            }
            ctx.output.debug(&e.to_string());
            bail!("{}", e.user_message())
        }
    }
}

/// Parse `PRODUCT_ID[:QUANTITY]`.
fn parse_line(line: &str) -> Result<(ProductId, i64)> {
    let (id, quantity) = match line.rsplit_once(':') {
        Some((id, quantity)) => {
            let quantity = quantity
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid quantity in '{}'", line))?;
            (id, quantity)
        }
        None => (line, 1),
    };
    let id = id.trim();
    if id.is_empty() {
        bail!("Missing product id in '{}'", line);
    }
    Ok((ProductId::new(id), quantity))
}
