//! Store configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shopfront_commerce::catalog::ReviewPolicy;
use shopfront_commerce::money::{Currency, Money};
use shopfront_observability::LogConfig;

/// Flat shipping surcharge in minor units ($5.99).
pub const DEFAULT_SHIPPING_FEE_CENTS: i64 = 599;
/// Notifications fetched on session start.
pub const DEFAULT_NOTIFICATION_LIMIT: usize = 10;
/// Similar products shown on a product page.
pub const DEFAULT_SIMILAR_PRODUCTS_LIMIT: usize = 4;

/// What to do with an order header whose line items failed to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Delete the header so no empty order remains.
    #[default]
    Compensate,
    /// Leave the header in place.
    Keep,
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Storefront settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Currency of the catalog, carts and orders.
    pub currency: Currency,
    pub shipping_fee_cents: i64,
    pub notification_limit: usize,
    pub similar_products_limit: usize,
    pub review_policy: ReviewPolicy,
    pub orphan_policy: OrphanPolicy,
    pub log: LogConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
            shipping_fee_cents: DEFAULT_SHIPPING_FEE_CENTS,
            notification_limit: DEFAULT_NOTIFICATION_LIMIT,
            similar_products_limit: DEFAULT_SIMILAR_PRODUCTS_LIMIT,
            review_policy: ReviewPolicy::default(),
            orphan_policy: OrphanPolicy::default(),
            log: LogConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn shipping_fee(&self) -> Money {
        Money::new(self.shipping_fee_cents, self.currency)
    }

    pub fn with_review_policy(mut self, policy: ReviewPolicy) -> Self {
        self.review_policy = policy;
        self
    }

    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shipping_fee_cents < 0 {
            return Err(ConfigError::Invalid(format!(
                "shipping_fee_cents must not be negative, got {}",
                self.shipping_fee_cents
            )));
        }
        if self.notification_limit == 0 {
            return Err(ConfigError::Invalid(
                "notification_limit must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_observability::LogFormat;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.shipping_fee().to_string(), "$5.99");
        assert_eq!(config.notification_limit, 10);
        assert_eq!(config.similar_products_limit, 4);
        assert_eq!(config.review_policy, ReviewPolicy::VerifiedPurchase);
        assert_eq!(config.orphan_policy, OrphanPolicy::Compensate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: StoreConfig = toml::from_str(
            r#"
            shipping_fee_cents = 0
            review_policy = "any_authenticated"
            orphan_policy = "keep"

            [log]
            format = "json"
            "#,
        )
        .unwrap();

        assert!(config.shipping_fee().is_zero());
        assert_eq!(config.review_policy, ReviewPolicy::AnyAuthenticated);
        assert_eq!(config.orphan_policy, OrphanPolicy::Keep);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.notification_limit, DEFAULT_NOTIFICATION_LIMIT);
    }

    #[test]
    fn test_validate_rejects_negative_fee() {
        let config = StoreConfig {
            shipping_fee_cents: -1,
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
