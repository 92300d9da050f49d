//! CLI command implementations.

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod review;
pub mod seed;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use shopfront_core::AdminError;

/// Replace an admin failure with the admin panel wording.
pub(crate) fn admin_result<T>(result: Result<T, AdminError>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => bail!("{}", e.user_message()),
    }
}

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// JSON file with a list of products (default: bundled catalog).
    #[arg(short, long)]
    pub file: Option<String>,
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only show this category.
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    /// Product ID.
    pub id: String,
}

/// Arguments for the review command.
#[derive(Args)]
pub struct ReviewArgs {
    /// Product ID.
    pub product: String,

    /// Stars, 1 to 5.
    #[arg(short, long)]
    pub rating: Option<u8>,

    /// Review text.
    #[arg(short = 'm', long, default_value = "")]
    pub comment: String,

    /// Only report whether a review is allowed.
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Cart line as PRODUCT_ID or PRODUCT_ID:QUANTITY; repeat for more lines.
    #[arg(short, long = "item", required = true)]
    pub items: Vec<String>,

    /// Contact phone.
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Street address.
    #[arg(long, default_value = "")]
    pub address: String,

    /// City.
    #[arg(long, default_value = "")]
    pub city: String,

    /// State or region.
    #[arg(long, default_value = "")]
    pub state: String,

    /// Postal code.
    #[arg(long, default_value = "")]
    pub postal_code: String,

    /// Payment method: cod or online.
    #[arg(short, long, default_value = "cod")]
    pub payment: String,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,

    /// Show the summary without placing the order.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List orders, newest first.
    List {
        /// Every customer's orders (administrators).
        #[arg(long)]
        all: bool,
    },
    /// Show an order with its line items.
    Show {
        /// Order ID.
        id: String,
    },
    /// Change an order's status and notify the customer (administrators).
    SetStatus {
        /// Order ID.
        id: String,
        /// pending, processing, shipped, delivered or cancelled.
        status: String,
    },
}

/// Arguments for the notifications command.
#[derive(Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: Option<NotificationsCommand>,
}

#[derive(Subcommand)]
pub enum NotificationsCommand {
    /// List recent notifications.
    List,
    /// Mark a notification read.
    Read {
        /// Notification ID.
        id: String,
    },
    /// Mark every unread notification read.
    ReadAll,
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Subcommand)]
pub enum ProductsCommand {
    /// List products as stored.
    List,
    /// Add a product from a JSON file.
    Add {
        /// JSON file with one product.
        file: String,
    },
    /// Replace a product's fields from a JSON file.
    Update {
        /// Product ID.
        id: String,
        /// JSON file with the new fields.
        file: String,
    },
    /// Delete a product.
    Delete {
        /// Product ID.
        id: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every product.
    DeleteAll {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}
