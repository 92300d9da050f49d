//! Product types.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product row in the catalog.
///
/// Rating and review count are not stored here; they are derived from the
/// review rows by [`crate::catalog::RatingSummary`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current selling price.
    pub price: Money,
    /// Price before discount.
    pub original_price: Money,
    /// Discount percentage shown on the listing (0 when not discounted).
    pub discount: u8,
    /// Long description.
    pub description: String,
    /// Ordered image URLs; the first one is the primary image.
    pub images: Vec<String>,
    /// Category label.
    pub category: String,
    /// Units in stock.
    pub in_stock: i64,
}

impl Product {
    /// Build a product from a validated draft and its assigned identity.
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            name: draft.name,
            price: draft.price,
            original_price: draft.original_price,
            discount: draft.discount,
            description: draft.description,
            images: draft.images,
            category: draft.category,
            in_stock: draft.in_stock,
        }
    }

    /// First image, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_in_stock(&self) -> bool {
        self.in_stock > 0
    }

    pub fn is_discounted(&self) -> bool {
        self.discount > 0
    }
}

/// Product fields as submitted by the admin panel or a seed file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Money,
    pub original_price: Money,
    #[serde(default)]
    pub discount: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub in_stock: i64,
}

impl ProductDraft {
    /// Check catalog invariants.
    ///
    /// A positive discount requires the original price to be strictly above
    /// the selling price. Blank image entries are dropped.
    pub fn validate(mut self) -> Result<Self, CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::InvalidProduct("name is required".into()));
        }
        if self.price.is_negative() || self.original_price.is_negative() {
            return Err(CommerceError::InvalidProduct("price must not be negative".into()));
        }
        if self.price.currency != self.original_price.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.price.currency.code().to_string(),
                got: self.original_price.currency.code().to_string(),
            });
        }
        if self.discount > 100 {
            return Err(CommerceError::InvalidProduct(format!(
                "discount {}% is above 100%",
                self.discount
            )));
        }
        if self.discount > 0 && self.original_price.amount_cents <= self.price.amount_cents {
            return Err(CommerceError::InvalidProduct(
                "discounted product needs an original price above its price".into(),
            ));
        }
        if self.in_stock < 0 {
            return Err(CommerceError::InvalidProduct("stock must not be negative".into()));
        }
        self.images.retain(|url| !url.trim().is_empty());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn draft(price: i64, original: i64, discount: u8) -> ProductDraft {
        ProductDraft {
            name: "Linen Shirt".into(),
            price: Money::new(price, Currency::USD),
            original_price: Money::new(original, Currency::USD),
            discount,
            description: String::new(),
            images: vec!["https://img/1.jpg".into(), "  ".into()],
            category: "apparel".into(),
            in_stock: 4,
        }
    }

    #[test]
    fn test_discount_requires_higher_original_price() {
        assert!(draft(1000, 1000, 10).validate().is_err());
        assert!(draft(900, 1000, 10).validate().is_ok());
    }

    #[test]
    fn test_no_discount_allows_equal_prices() {
        assert!(draft(1000, 1000, 0).validate().is_ok());
    }

    #[test]
    fn test_validate_drops_blank_images() {
        let product = Product::from_draft(ProductId::new("p1"), draft(900, 1000, 10).validate().unwrap());
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.primary_image(), Some("https://img/1.jpg"));
    }
}
