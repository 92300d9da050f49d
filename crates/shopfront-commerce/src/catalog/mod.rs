//! Product catalog module.
//!
//! Contains product rows, reviews and the rating aggregator.

mod product;
mod review;

pub use product::{Product, ProductDraft};
pub use review::{
    rate_products, summarize_by_product, validate_rating, RatedProduct, RatingSummary, Review,
    ReviewPolicy, MAX_RATING, MIN_RATING,
};
