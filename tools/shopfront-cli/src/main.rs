//! Shopfront CLI - drive the storefront against a local snapshot store.
//!
//! Commands:
//! - `shopfront seed` - Load the catalog when it is empty
//! - `shopfront catalog` - List products with ratings
//! - `shopfront product` - Show a product page
//! - `shopfront review` - Review a purchased product
//! - `shopfront checkout` - Place an order
//! - `shopfront orders` - Order history and admin order management
//! - `shopfront notifications` - List or acknowledge notifications
//! - `shopfront products` - Admin product management
//! - `shopfront config` - Inspect configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{
    CatalogArgs, CheckoutArgs, ConfigArgs, NotificationsArgs, OrdersArgs, ProductArgs,
    ProductsArgs, ReviewArgs, SeedArgs,
};

/// Shopfront CLI - browse, buy and administer a storefront
#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Snapshot file holding the store data
    #[arg(long, global = true)]
    store: Option<String>,

    #[command(flatten)]
    identity: IdentityArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Who the command runs as.
#[derive(Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// Act as this signed-in user id
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Email of the signed-in user
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// Sign in with the administrator role
    #[arg(long, global = true)]
    pub admin: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the product catalog if it is empty
    Seed(SeedArgs),

    /// List products with their ratings
    Catalog(CatalogArgs),

    /// Show a product with its reviews and similar products
    Product(ProductArgs),

    /// Review a product
    Review(ReviewArgs),

    /// Place an order
    Checkout(CheckoutArgs),

    /// Show orders or update their status
    Orders(OrdersArgs),

    /// List notifications or mark them read
    Notifications(NotificationsArgs),

    /// Manage products (administrators)
    Products(ProductsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    if let Err(e) = run(cli, &output).await {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &output::Output) -> Result<()> {
    let ctx = context::Context::load(
        cli.config.as_deref(),
        cli.store.as_deref(),
        cli.identity,
        output.clone(),
    )?;
    ctx.init_logging(cli.verbose)?;

    match cli.command {
        Commands::Seed(args) => commands::seed::run(args, &ctx).await,
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Product(args) => commands::catalog::show(args, &ctx).await,
        Commands::Review(args) => commands::review::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Notifications(args) => commands::notifications::run(args, &ctx).await,
        Commands::Products(args) => commands::products::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    }
}
