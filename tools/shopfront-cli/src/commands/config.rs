//! Configuration management commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::CliConfig;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    let store = &ctx.config.store;
    ctx.output.header("Current Configuration");

    ctx.output.info("[store]");
    ctx.output.kv("currency", store.currency.code());
    ctx.output.kv("shipping_fee", &store.shipping_fee().to_string());
    ctx.output
        .kv("notification_limit", &store.notification_limit.to_string());
    ctx.output.kv(
        "similar_products_limit",
        &store.similar_products_limit.to_string(),
    );
    ctx.output.kv("review_policy", &format!("{:?}", store.review_policy));
    ctx.output.kv("orphan_policy", &format!("{:?}", store.orphan_policy));

    ctx.output.info("[store.log]");
    ctx.output.kv("level", store.log.level.as_str());
    ctx.output.kv("filter", &store.log.directive());

    ctx.output.info("[data]");
    ctx.output.kv("snapshot", &ctx.snapshot().display().to_string());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("shopfront.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    CliConfig::default().save(&config_path.to_string_lossy())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    if let Err(e) = ctx.config.store.validate() {
        bail!("{}", e);
    }

    if ctx.config.store.similar_products_limit == 0 {
        ctx.output
            .warn("store.similar_products_limit is 0; product pages show no similar products");
    }
    if !ctx.snapshot().exists() {
        ctx.output.warn(&format!(
            "Snapshot {} does not exist yet; run `shopfront seed`",
            ctx.snapshot().display()
        ));
    }

    ctx.output.success("Configuration is valid");
    Ok(())
}
