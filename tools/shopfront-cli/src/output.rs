//! Terminal rendering of storefront data.

use console::{pad_str, style, Alignment, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

use shopfront_commerce::cart::{Cart, CheckoutSummary};
use shopfront_commerce::catalog::{Product, RatedProduct, RatingSummary, Review, MAX_RATING};
use shopfront_commerce::checkout::{Order, OrderDetails, OrderStatus};
use shopfront_commerce::error::CommerceError;
use shopfront_core::ProductDetail;

const CATALOG_COLUMNS: [(&str, usize); 6] = [
    ("ID", 8),
    ("NAME", 32),
    ("CATEGORY", 12),
    ("PRICE", 10),
    ("RATING", 18),
    ("STOCK", 6),
];

const INVENTORY_COLUMNS: [(&str, usize); 6] = [
    ("ID", 8),
    ("NAME", 32),
    ("CATEGORY", 12),
    ("PRICE", 10),
    ("ORIGINAL", 10),
    ("STOCK", 6),
];

const ORDER_COLUMNS: [(&str, usize); 5] = [
    ("ORDER", 10),
    ("CUSTOMER", 10),
    ("PLACED", 18),
    ("TOTAL", 12),
    ("STATUS", 12),
];

const TIMESTAMP: &str = "%Y-%m-%d %H:%M";

/// Prints storefront data as text, or stays quiet in `--json` mode
/// apart from the JSON documents and errors.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    fn line(&self, text: impl std::fmt::Display) {
        if !self.json {
            println!("{}", text);
        }
    }

    fn note(&self, mark: StyledObject<&str>, msg: &str) {
        self.line(format!("{} {}", mark, msg));
    }

    pub fn info(&self, msg: &str) {
        self.note(style("ℹ").blue(), msg);
    }

    pub fn success(&self, msg: &str) {
        self.note(style("✓").green(), msg);
    }

    pub fn warn(&self, msg: &str) {
        if !self.json {
            eprintln!("{} {}", style("⚠").yellow(), msg);
        }
    }

    /// Errors are printed in both modes; JSON mode wraps them in an object.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        } else {
            eprintln!("{} {}", style("✗").red(), style(msg).red());
        }
    }

    pub fn debug(&self, msg: &str) {
        if self.verbose && !self.json {
            eprintln!("{} {}", style("→").dim(), style(msg).dim());
        }
    }

    pub fn header(&self, msg: &str) {
        self.line(format!("\n{}", style(msg).bold().underlined()));
    }

    pub fn json<T: serde::Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => self.error(&format!("Failed to encode output: {}", e)),
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        self.line(format!("  {}: {}", style(key).dim(), value));
    }

    pub fn list_item(&self, item: &str) {
        self.line(format!("  {} {}", style("•").dim(), item));
    }

    /// Spinner shown while a backend call is in flight; hidden in JSON mode.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Storefront listing: one row per product with its rating.
    pub fn catalog_table(&self, products: &[RatedProduct]) {
        self.line(heading(&CATALOG_COLUMNS));
        for rated in products {
            self.line(catalog_row(rated));
        }
    }

    /// Admin listing: stored prices and stock, no ratings.
    pub fn inventory_table(&self, products: &[Product]) {
        self.line(heading(&INVENTORY_COLUMNS));
        for product in products {
            self.line(row(
                &[
                    product.id.as_str(),
                    &product.name,
                    &product.category,
                    &product.price.to_string(),
                    &product.original_price.to_string(),
                    &product.in_stock.to_string(),
                ],
                &INVENTORY_COLUMNS,
            ));
        }
    }

    pub fn order_table(&self, orders: &[Order]) {
        self.line(heading(&ORDER_COLUMNS));
        for order in orders {
            self.line(row(
                &[
                    order.id.as_str(),
                    order.user_id.as_str(),
                    &order.created_at.format(TIMESTAMP).to_string(),
                    &order.total.to_string(),
                    &status_badge(order.status),
                ],
                &ORDER_COLUMNS,
            ));
        }
    }

    /// Product page: fields, reviews newest first, then similar products.
    pub fn product_page(&self, detail: &ProductDetail) {
        let product = &detail.product.product;
        self.header(&product.name);
        self.kv("id", product.id.as_str());
        self.kv("category", &product.category);
        self.kv("price", &price_label(product));
        self.kv("rating", &stars(&detail.product.rating));
        self.kv("stock", &stock_label(product));
        if !product.description.is_empty() {
            self.kv("description", &product.description);
        }

        self.header(&format!("Reviews ({})", detail.reviews.len()));
        for review in &detail.reviews {
            self.list_item(&review_line(review));
        }

        if !detail.similar.is_empty() {
            self.header("Similar products");
            for rated in &detail.similar {
                self.line(catalog_row(rated));
            }
        }
    }

    /// Cart lines and the totals the order will be placed with.
    pub fn cart_summary(&self, cart: &Cart, summary: &CheckoutSummary) -> Result<(), CommerceError> {
        self.header("Order summary");
        for item in cart.items() {
            self.list_item(&format!(
                "{} x {} = {}",
                item.quantity,
                item.product.name,
                item.line_total()?
            ));
        }
        self.kv("subtotal", &summary.subtotal.to_string());
        self.kv("shipping", &summary.shipping.to_string());
        self.kv("total", &summary.total.to_string());
        Ok(())
    }

    pub fn order_details(&self, details: &OrderDetails) -> Result<(), CommerceError> {
        let order = &details.order;
        self.header(&format!("Order {}", order.id));
        self.kv("status", &status_badge(order.status));
        self.kv("customer", order.user_id.as_str());
        self.kv("placed", &order.created_at.format(TIMESTAMP).to_string());
        self.kv("payment", order.payment_method.display_name());
        self.kv("ship to", &order.shipping_address);
        self.kv("phone", &order.phone);

        self.header(&format!("Items ({})", details.item_count()));
        for item in &details.items {
            self.list_item(&format!(
                "{} x {} @ {} = {}",
                item.quantity,
                item.product_id,
                item.unit_price,
                item.line_total()?
            ));
        }
        self.kv("total", &order.total.to_string());
        Ok(())
    }
}

fn heading(columns: &[(&str, usize)]) -> String {
    let titles: Vec<&str> = columns.iter().map(|(title, _)| *title).collect();
    style(row(&titles, columns)).bold().to_string()
}

/// Pad each cell to its column, cutting long values with an ellipsis.
fn row(cells: &[&str], columns: &[(&str, usize)]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(columns)
        .map(|(cell, (_, width))| pad_str(cell, *width, Alignment::Left, Some("…")).into_owned())
        .collect();
    format!("  {}", padded.join("  "))
}

fn catalog_row(rated: &RatedProduct) -> String {
    let product = &rated.product;
    row(
        &[
            product.id.as_str(),
            &product.name,
            &product.category,
            &product.price.to_string(),
            &stars(&rated.rating),
            &product.in_stock.to_string(),
        ],
        &CATALOG_COLUMNS,
    )
}

/// Current price, with the list price and discount when marked down.
pub fn price_label(product: &Product) -> String {
    if product.is_discounted() {
        format!(
            "{} (was {}, {}% off)",
            product.price, product.original_price, product.discount
        )
    } else {
        product.price.to_string()
    }
}

pub fn stock_label(product: &Product) -> String {
    if product.is_in_stock() {
        format!("{} in stock", product.in_stock)
    } else {
        "out of stock".to_string()
    }
}

pub fn review_line(review: &Review) -> String {
    let comment = if review.comment.is_empty() {
        "(no comment)"
    } else {
        review.comment.as_str()
    };
    let verified = if review.verified_purchase {
        " [verified]"
    } else {
        ""
    };
    format!(
        "{}/{} by {}{} on {}: {}",
        review.rating,
        MAX_RATING,
        review.user_id,
        verified,
        review.created_at.format("%Y-%m-%d"),
        comment
    )
}

/// Colored order status.
pub fn status_badge(status: OrderStatus) -> String {
    let name = status.display_name();
    match status {
        OrderStatus::Delivered => style(name).green().to_string(),
        OrderStatus::Pending | OrderStatus::Processing => style(name).yellow().to_string(),
        OrderStatus::Shipped => style(name).cyan().to_string(),
        OrderStatus::Cancelled => style(name).red().to_string(),
    }
}

/// Five-star strip, e.g. `★★★★☆ 4.3 (12)`.
pub fn stars(rating: &RatingSummary) -> String {
    let filled = usize::from(rating.filled_stars().min(MAX_RATING));
    format!(
        "{}{} {:.1} ({})",
        "★".repeat(filled),
        "☆".repeat(usize::from(MAX_RATING) - filled),
        rating.average,
        rating.count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_commerce::ids::{ProductId, ReviewId, UserId};
    use shopfront_commerce::money::{Currency, Money};

    fn product(price: i64, original: i64, discount: u8, in_stock: i64) -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Trail Runner".into(),
            price: Money::new(price, Currency::USD),
            original_price: Money::new(original, Currency::USD),
            discount,
            description: String::new(),
            images: vec![],
            category: "shoes".into(),
            in_stock,
        }
    }

    #[test]
    fn test_stars() {
        let rating = RatingSummary::from_ratings([5, 4, 4]);
        assert_eq!(stars(&rating), "★★★★☆ 4.3 (3)");
        assert_eq!(stars(&RatingSummary::default()), "☆☆☆☆☆ 0.0 (0)");
    }

    #[test]
    fn test_price_and_stock_labels() {
        let full = product(8000, 8000, 0, 3);
        assert_eq!(price_label(&full), "$80.00");
        assert_eq!(stock_label(&full), "3 in stock");

        let marked_down = product(6000, 8000, 25, 0);
        assert_eq!(price_label(&marked_down), "$60.00 (was $80.00, 25% off)");
        assert_eq!(stock_label(&marked_down), "out of stock");
    }

    #[test]
    fn test_review_line() {
        let review = Review {
            id: ReviewId::new("r1"),
            product_id: ProductId::new("p1"),
            user_id: UserId::new("u1"),
            rating: 4,
            comment: String::new(),
            verified_purchase: true,
            created_at: "2024-03-09T12:00:00Z".parse().unwrap(),
        };
        assert_eq!(review_line(&review), "4/5 by u1 [verified] on 2024-03-09: (no comment)");
    }

    #[test]
    fn test_row_pads_and_truncates() {
        let columns = [("A", 4), ("B", 6)];
        assert_eq!(row(&["ab", "xyz"], &columns), "  ab    xyz   ");
        let cut = row(&["abcdefgh", "x"], &columns);
        assert!(cut.starts_with("  abc…  "));
        assert_eq!(console::measure_text_width(&cut), 2 + 4 + 2 + 6);
    }
}
