//! Catalog reads, seeding and reviews.

use serde::Serialize;
use tracing::{debug, info, instrument};

use shopfront_commerce::catalog::{
    rate_products, validate_rating, Product, ProductDraft, RatedProduct, RatingSummary, Review,
    ReviewPolicy,
};
use shopfront_commerce::ids::ProductId;
use shopfront_data::{Backend, NewReview, ProductFilter, ReviewFilter};

use crate::config::StoreConfig;
use crate::error::{CatalogError, ReviewError};

/// A product page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
    /// The product, rated from the reviews shown below it.
    pub product: RatedProduct,
    /// Verified-purchase reviews.
    pub reviews: Vec<Review>,
    /// Other products from the same category.
    pub similar: Vec<RatedProduct>,
}

/// Outcome of [`CatalogService::seed_if_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The catalog was empty and this many products were inserted.
    Seeded(usize),
    /// The catalog already held this many products; nothing was written.
    AlreadyPopulated(usize),
}

/// Products with ratings derived from review rows.
#[derive(Debug, Clone)]
pub struct CatalogService<B> {
    backend: B,
    similar_limit: usize,
    review_policy: ReviewPolicy,
}

impl<B: Backend> CatalogService<B> {
    pub fn new(backend: B, config: &StoreConfig) -> Self {
        Self {
            backend,
            similar_limit: config.similar_products_limit,
            review_policy: config.review_policy,
        }
    }

    /// Every product with its rating and review count.
    pub async fn list_products(&self) -> Result<Vec<RatedProduct>, CatalogError> {
        let all_products = ProductFilter::all();
        let all_reviews = ReviewFilter::all();
        let (products, reviews) = futures::try_join!(
            self.backend.list_products(&all_products),
            self.backend.list_reviews(&all_reviews)
        )?;
        debug!(products = products.len(), reviews = reviews.len(), "Catalog loaded");
        Ok(rate_products(products, &reviews))
    }

    /// Product page: the product, its verified reviews and similar products.
    pub async fn product_detail(&self, id: &ProductId) -> Result<ProductDetail, CatalogError> {
        let product = self.backend.get_product(id).await?;

        let similar_filter = ProductFilter::similar_to(&product, self.similar_limit);
        let verified = ReviewFilter::for_product(id.clone()).verified();
        let any_review = ReviewFilter::all();
        let (reviews, similar, all_reviews) = futures::try_join!(
            self.backend.list_reviews(&verified),
            self.backend.list_products(&similar_filter),
            self.backend.list_reviews(&any_review)
        )?;

        let rating = RatingSummary::for_product(id, &reviews);
        Ok(ProductDetail {
            product: RatedProduct { product, rating },
            similar: rate_products(similar, &all_reviews),
            reviews,
        })
    }

    /// Insert `drafts` only when there are no products yet.
    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    pub async fn seed_if_empty(
        &self,
        drafts: Vec<ProductDraft>,
    ) -> Result<SeedOutcome, CatalogError> {
        let existing = self.backend.count_products().await?;
        if existing > 0 {
            debug!(existing, "Catalog already populated");
            return Ok(SeedOutcome::AlreadyPopulated(existing));
        }

        let drafts = drafts
            .into_iter()
            .map(ProductDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        let created = self.backend.insert_products(drafts).await?;
        info!(count = created.len(), "Catalog seeded");
        Ok(SeedOutcome::Seeded(created.len()))
    }

    /// Whether the current user may review `product_id` under the policy.
    pub async fn can_review(&self, product_id: &ProductId) -> Result<bool, ReviewError> {
        let user = self.backend.current_user().await?;
        let Some(user_id) = user.user_id() else {
            return Ok(false);
        };
        if !self.review_policy.requires_purchase() {
            return Ok(true);
        }
        Ok(self.backend.has_purchased(user_id, product_id).await?)
    }

    /// Submit a review as the current user.
    ///
    /// The stored review is flagged as verified when the author holds a
    /// qualifying purchase, whichever policy is active.
    #[instrument(skip(self, comment))]
    pub async fn submit_review(
        &self,
        product_id: &ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, ReviewError> {
        let user = self.backend.current_user().await?;
        let user_id = user.require_authenticated()?.clone();
        let rating = validate_rating(rating)?;

        let purchased = self.backend.has_purchased(&user_id, product_id).await?;
        if self.review_policy.requires_purchase() && !purchased {
            return Err(ReviewError::NotEligible(product_id.clone()));
        }

        let review = self
            .backend
            .insert_review(NewReview {
                product_id: product_id.clone(),
                user_id,
                rating,
                comment: comment.trim().to_string(),
                verified_purchase: purchased,
            })
            .await?;
        info!(review_id = %review.id, product_id = %product_id, rating, "Review submitted");
        Ok(review)
    }

    /// A single product without ratings.
    pub async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        Ok(self.backend.get_product(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use shopfront_auth::{AuthError, User};
    use shopfront_commerce::checkout::{OrderStatus, PaymentMethod};
    use shopfront_commerce::ids::UserId;
    use shopfront_commerce::money::{Currency, Money};
    use shopfront_commerce::CommerceError;
    use shopfront_data::{MemoryBackend, NewOrder, NewOrderItem};

    fn draft(name: &str, category: &str) -> ProductDraft {
        ProductDraft {
            name: name.into(),
            price: Money::new(1000, Currency::USD),
            original_price: Money::new(1000, Currency::USD),
            discount: 0,
            description: String::new(),
            images: vec![],
            category: category.into(),
            in_stock: 1,
        }
    }

    async fn seeded() -> (Arc<MemoryBackend>, Vec<Product>) {
        let backend = Arc::new(MemoryBackend::new());
        let products = backend
            .insert_products(vec![
                draft("Headphones", "Electronics"),
                draft("Watch", "Electronics"),
                draft("Speaker", "Electronics"),
                draft("Bag", "Fashion"),
            ])
            .await
            .unwrap();
        (backend, products)
    }

    async fn review(backend: &MemoryBackend, product: &Product, rating: u8, verified: bool) {
        backend
            .insert_review(NewReview {
                product_id: product.id.clone(),
                user_id: UserId::new("someone"),
                rating,
                comment: String::new(),
                verified_purchase: verified,
            })
            .await
            .unwrap();
    }

    async fn purchase(backend: &MemoryBackend, user: &str, product: &Product) {
        let order = backend
            .insert_order(NewOrder {
                user_id: UserId::new(user),
                total: Money::new(1599, Currency::USD),
                payment_method: PaymentMethod::CashOnDelivery,
                shipping_address: "a, b, c - d".into(),
                phone: "1".into(),
                status: OrderStatus::Pending,
            })
            .await
            .unwrap();
        backend
            .insert_order_items(vec![NewOrderItem {
                order_id: order.id,
                product_id: product.id.clone(),
                quantity: 1,
                unit_price: product.price,
            }])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_products_with_ratings() {
        let (backend, products) = seeded().await;
        for rating in [5, 3, 4] {
            review(&backend, &products[0], rating, true).await;
        }
        let catalog = CatalogService::new(Arc::clone(&backend), &StoreConfig::default());

        let listed = catalog.list_products().await.unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].rating.average, 4.0);
        assert_eq!(listed[0].rating.count, 3);
        assert_eq!(listed[1].rating, RatingSummary::default());
    }

    #[tokio::test]
    async fn test_product_detail() {
        let (backend, products) = seeded().await;
        review(&backend, &products[0], 5, true).await;
        review(&backend, &products[0], 1, false).await;
        review(&backend, &products[1], 2, true).await;
        let config = StoreConfig {
            similar_products_limit: 1,
            ..StoreConfig::default()
        };
        let catalog = CatalogService::new(Arc::clone(&backend), &config);

        let detail = catalog.product_detail(&products[0].id).await.unwrap();
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.product.rating.average, 5.0);
        assert_eq!(detail.similar.len(), 1);
        assert_eq!(detail.similar[0].product.id, products[1].id);
        assert_eq!(detail.similar[0].rating.count, 1);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let backend = Arc::new(MemoryBackend::new());
        let catalog = CatalogService::new(Arc::clone(&backend), &StoreConfig::default());
        let err = catalog
            .product_detail(&ProductId::new("nope"))
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::ProductNotFound(ProductId::new("nope")));
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let backend = Arc::new(MemoryBackend::new());
        let catalog = CatalogService::new(Arc::clone(&backend), &StoreConfig::default());

        let first = catalog
            .seed_if_empty(vec![draft("A", "x"), draft("B", "x")])
            .await
            .unwrap();
        assert_eq!(first, SeedOutcome::Seeded(2));

        let second = catalog.seed_if_empty(vec![draft("C", "x")]).await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadyPopulated(2));
    }

    #[tokio::test]
    async fn test_review_requires_purchase_by_default() {
        let (backend, products) = seeded().await;
        backend.sign_in(User::customer("u1", "a@b.c")).unwrap();
        let catalog = CatalogService::new(Arc::clone(&backend), &StoreConfig::default());

        assert!(!catalog.can_review(&products[0].id).await.unwrap());
        let err = catalog
            .submit_review(&products[0].id, 5, "great")
            .await
            .unwrap_err();
        assert_eq!(err, ReviewError::NotEligible(products[0].id.clone()));

        purchase(&backend, "u1", &products[0]).await;
        assert!(catalog.can_review(&products[0].id).await.unwrap());
        let review = catalog
            .submit_review(&products[0].id, 5, " great ")
            .await
            .unwrap();
        assert!(review.verified_purchase);
        assert_eq!(review.comment, "great");
    }

    #[tokio::test]
    async fn test_any_authenticated_policy() {
        let (backend, products) = seeded().await;
        backend.sign_in(User::customer("u1", "a@b.c")).unwrap();
        let config = StoreConfig::default().with_review_policy(ReviewPolicy::AnyAuthenticated);
        let catalog = CatalogService::new(Arc::clone(&backend), &config);

        let review = catalog
            .submit_review(&products[0].id, 4, "nice")
            .await
            .unwrap();
        assert!(!review.verified_purchase);
    }

    #[tokio::test]
    async fn test_review_validation() {
        let (backend, products) = seeded().await;
        let catalog = CatalogService::new(Arc::clone(&backend), &StoreConfig::default());

        let err = catalog
            .submit_review(&products[0].id, 5, "")
            .await
            .unwrap_err();
        assert_eq!(err, ReviewError::Auth(AuthError::NotAuthenticated));

        backend.sign_in(User::customer("u1", "a@b.c")).unwrap();
        let err = catalog
            .submit_review(&products[0].id, 6, "")
            .await
            .unwrap_err();
        assert_eq!(err, ReviewError::Invalid(CommerceError::InvalidRating(6)));
    }
}
