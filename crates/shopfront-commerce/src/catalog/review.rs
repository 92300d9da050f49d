//! Reviews and rating aggregation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{ProductId, ReviewId, UserId};

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;

/// A review row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Star rating, 1-5.
    pub rating: u8,
    pub comment: String,
    /// Whether the author had bought the product when reviewing.
    pub verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

/// Who may submit a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPolicy {
    /// The author must hold a prior purchase of the product.
    #[default]
    VerifiedPurchase,
    /// Any signed-in user may review.
    AnyAuthenticated,
}

impl ReviewPolicy {
    pub fn requires_purchase(&self) -> bool {
        matches!(self, ReviewPolicy::VerifiedPurchase)
    }
}

/// Check a star rating against the accepted range.
pub fn validate_rating(rating: u8) -> Result<u8, CommerceError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(CommerceError::InvalidRating(rating))
    }
}

/// Derived rating projection for one product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RatingSummary {
    /// Mean rating, 0 when there are no reviews.
    pub average: f64,
    /// Number of reviews.
    pub count: usize,
}

impl RatingSummary {
    /// Aggregate a set of ratings.
    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0u64, 0usize), |(sum, count), r| (sum + u64::from(r), count + 1));
        let average = if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        };
        Self { average, count }
    }

    /// Aggregate the reviews belonging to `product_id`.
    pub fn for_product<'a>(
        product_id: &ProductId,
        reviews: impl IntoIterator<Item = &'a Review>,
    ) -> Self {
        Self::from_ratings(
            reviews
                .into_iter()
                .filter(|r| &r.product_id == product_id)
                .map(|r| r.rating),
        )
    }

    /// Whole stars to fill when rendering, rounded down.
    pub fn filled_stars(&self) -> u8 {
        self.average.floor().clamp(0.0, f64::from(MAX_RATING)) as u8
    }
}

/// Group reviews by product and aggregate each group.
pub fn summarize_by_product<'a>(
    reviews: impl IntoIterator<Item = &'a Review>,
) -> HashMap<ProductId, RatingSummary> {
    let mut ratings: HashMap<ProductId, Vec<u8>> = HashMap::new();
    for review in reviews {
        ratings
            .entry(review.product_id.clone())
            .or_default()
            .push(review.rating);
    }
    ratings
        .into_iter()
        .map(|(id, r)| (id, RatingSummary::from_ratings(r)))
        .collect()
}

/// A product together with its derived rating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatedProduct {
    pub product: Product,
    pub rating: RatingSummary,
}

/// Attach derived ratings to every product, keeping product order.
pub fn rate_products<'a>(
    products: Vec<Product>,
    reviews: impl IntoIterator<Item = &'a Review>,
) -> Vec<RatedProduct> {
    let summaries = summarize_by_product(reviews);
    products
        .into_iter()
        .map(|product| {
            let rating = summaries.get(&product.id).copied().unwrap_or_default();
            RatedProduct { product, rating }
        })
        .collect()
}
