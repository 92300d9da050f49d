//! Product administration.

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;

use shopfront_commerce::catalog::ProductDraft;
use shopfront_commerce::ids::ProductId;
use shopfront_core::{AdminAction, ProductAdmin};

use super::{admin_result, ProductsArgs, ProductsCommand};
use crate::context::Context;

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let admin = ProductAdmin::new(ctx.backend.clone());
    match args.command {
        ProductsCommand::List => {
            let products = admin_result(admin.list_products().await)?;
            if ctx.output.is_json() {
                ctx.output.json(&products);
                return Ok(());
            }
            ctx.output.header(&format!("Products ({})", products.len()));
            ctx.output.inventory_table(&products);
            Ok(())
        }
        ProductsCommand::Add { file } => {
            let draft = read_draft(&file)?;
            let product = admin_result(admin.add_product(draft).await)?;
            ctx.persist()?;
            done(ctx, AdminAction::AddProduct, &product.id);
            Ok(())
        }
        ProductsCommand::Update { id, file } => {
            let draft = read_draft(&file)?;
            let product = admin_result(admin.update_product(&ProductId::new(id), draft).await)?;
            ctx.persist()?;
            done(ctx, AdminAction::UpdateProduct, &product.id);
            Ok(())
        }
        ProductsCommand::Delete { id, yes } => {
            let id = ProductId::new(id);
            if !confirm(ctx, yes, &format!("Delete product {}?", id))? {
                ctx.output.info("Nothing deleted");
                return Ok(());
            }
            admin_result(admin.delete_product(&id).await)?;
            ctx.persist()?;
            done(ctx, AdminAction::DeleteProduct, &id);
            Ok(())
        }
        ProductsCommand::DeleteAll { yes } => {
            if !confirm(ctx, yes, "Delete ALL products? This cannot be undone")? {
                ctx.output.info("Nothing deleted");
                return Ok(());
            }
            let removed = admin_result(admin.delete_all_products().await)?;
            ctx.persist()?;
            if let Some(msg) = AdminAction::DeleteAllProducts.success_message() {
                ctx.output.success(&format!("{} ({} removed)", msg, removed));
            }
            Ok(())
        }
    }
}

fn read_draft(path: &str) -> Result<ProductDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read product file: {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse product file: {}", path))
}

fn confirm(ctx: &Context, yes: bool, prompt: &str) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if ctx.output.is_json() {
        bail!("Confirmation required; pass --yes");
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn done(ctx: &Context, action: AdminAction, id: &ProductId) {
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "product_id": id }));
    } else if let Some(msg) = action.success_message() {
        ctx.output.success(&format!("{} ({})", msg, id));
    }
}
