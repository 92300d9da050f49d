//! Catalog browsing.

use anyhow::Result;

use shopfront_commerce::ids::ProductId;
use shopfront_core::CatalogService;

use super::{CatalogArgs, ProductArgs};
use crate::context::Context;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let catalog = CatalogService::new(ctx.backend.clone(), &ctx.config.store);
    let mut products = catalog.list_products().await?;
    if let Some(category) = args.category.as_deref() {
        products.retain(|p| p.product.category.eq_ignore_ascii_case(category));
    }

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header(&format!("Products ({})", products.len()));
    if products.is_empty() {
        ctx.output.info("No products. Run `shopfront seed` to load the catalog.");
        return Ok(());
    }

    ctx.output.catalog_table(&products);
    Ok(())
}

/// Run the product command.
pub async fn show(args: ProductArgs, ctx: &Context) -> Result<()> {
    let catalog = CatalogService::new(ctx.backend.clone(), &ctx.config.store);
    let detail = catalog.product_detail(&ProductId::new(args.id)).await?;

    if ctx.output.is_json() {
        ctx.output.json(&detail);
        return Ok(());
    }

    ctx.output.product_page(&detail);
    Ok(())
}
