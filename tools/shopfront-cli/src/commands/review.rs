//! Product reviews.

use anyhow::{bail, Result};

use shopfront_commerce::ids::ProductId;
use shopfront_core::{CatalogService, ReviewError};

use super::ReviewArgs;
use crate::context::Context;

/// Run the review command.
pub async fn run(args: ReviewArgs, ctx: &Context) -> Result<()> {
    let catalog = CatalogService::new(ctx.backend.clone(), &ctx.config.store);
    let product_id = ProductId::new(args.product);
    // Surfaces a missing product before any eligibility check.
    let product = catalog.product(&product_id).await?;

    if args.check {
        let allowed = catalog.can_review(&product_id).await?;
        if ctx.output.is_json() {
            ctx.output
                .json(&serde_json::json!({ "product_id": product_id, "can_review": allowed }));
        } else if allowed {
            ctx.output.success(&format!("You can review {}", product.name));
        } else {
            ctx.output
                .warn(&format!("Only verified buyers can review {}", product.name));
        }
        return Ok(());
    }

    let Some(rating) = args.rating else {
        bail!("--rating is required to submit a review");
    };

    match catalog.submit_review(&product_id, rating, &args.comment).await {
        Ok(review) => {
            ctx.persist()?;
            if ctx.output.is_json() {
                ctx.output.json(&review);
            } else {
                ctx.output.success(&format!(
                    "Review {} saved for {}{}",
                    review.id,
                    product.name,
                    if review.verified_purchase {
                        " (verified purchase)"
                    } else {
                        ""
                    }
                ));
            }
            Ok(())
        }
        Err(e @ (ReviewError::Auth(_) | ReviewError::NotEligible(_))) => {
            bail!("{}", e.user_message())
        }
        Err(e) => Err(e.into()),
    }
}
