//! Catalog seeding.

use anyhow::{Context as _, Result};

use shopfront_commerce::catalog::ProductDraft;
use shopfront_core::{CatalogService, SeedOutcome};

use super::SeedArgs;
use crate::context::Context;

/// Catalog shipped with the CLI.
const BUNDLED_CATALOG: &str = include_str!("../../seed/products.json");

/// Run the seed command.
pub async fn run(args: SeedArgs, ctx: &Context) -> Result<()> {
    let drafts = match args.file.as_deref() {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read seed file: {}", path))?;
            parse_drafts(&content).with_context(|| format!("Failed to parse seed file: {}", path))?
        }
        None => parse_drafts(BUNDLED_CATALOG).context("Failed to parse bundled catalog")?,
    };
    ctx.output.debug(&format!("{} products to seed", drafts.len()));

    let catalog = CatalogService::new(ctx.backend.clone(), &ctx.config.store);
    let spinner = ctx.output.spinner("Seeding catalog...");
    let outcome = catalog.seed_if_empty(drafts).await;
    spinner.finish_and_clear();

    match outcome? {
        SeedOutcome::Seeded(count) => {
            ctx.persist()?;
            ctx.output
                .success(&format!("Seeded {} products into {}", count, ctx.snapshot().display()));
        }
        SeedOutcome::AlreadyPopulated(count) => {
            ctx.output
                .info(&format!("Catalog already has {} products, nothing seeded", count));
        }
    }

    Ok(())
}

fn parse_drafts(content: &str) -> Result<Vec<ProductDraft>> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_is_valid() {
        let drafts = parse_drafts(BUNDLED_CATALOG).unwrap();
        assert_eq!(drafts.len(), 20);
        assert_eq!(drafts[0].name, "Premium Wireless Headphones");
        for draft in drafts {
            draft.validate().unwrap();
        }
    }
}
