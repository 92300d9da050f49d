//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::debug;

use shopfront_auth::User;
use shopfront_data::MemoryBackend;
use shopfront_observability::LogLevel;

use crate::config::CliConfig;
use crate::output::Output;
use crate::IdentityArgs;

/// Config file names searched from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["shopfront.toml", ".shopfront.toml", "shopfront.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Store data, loaded from the snapshot.
    pub backend: Arc<MemoryBackend>,
    snapshot: PathBuf,
    identity: IdentityArgs,
}

impl Context {
    /// Load config and open the snapshot store.
    pub fn load(
        config_path: Option<&str>,
        store_path: Option<&str>,
        identity: IdentityArgs,
        output: Output,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            Self::find_config(&cwd).unwrap_or_default()
        };

        let snapshot = resolve_path(&cwd, store_path.unwrap_or(&config.data.snapshot));
        let backend = MemoryBackend::open(&snapshot)
            .with_context(|| format!("Failed to open store: {}", snapshot.display()))?;

        let ctx = Self {
            config,
            output,
            cwd,
            backend: Arc::new(backend),
            snapshot,
            identity,
        };
        ctx.sign_in()?;
        Ok(ctx)
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Install the log subscriber from the `[store.log]` section.
    pub fn init_logging(&self, verbose: bool) -> Result<()> {
        let mut log = self.config.store.log.clone();
        if verbose {
            log = log.with_level(LogLevel::Debug);
        }
        shopfront_observability::init(&log).context("Failed to initialize logging")
    }

    fn sign_in(&self) -> Result<()> {
        let Some(id) = self.identity.user.as_deref() else {
            return Ok(());
        };
        let email = self
            .identity
            .email
            .clone()
            .unwrap_or_else(|| format!("{}@shopfront.local", id));
        let user = if self.identity.admin {
            User::administrator(id, email)
        } else {
            User::customer(id, email)
        };
        self.backend.sign_in(user)?;
        Ok(())
    }

    /// Whether the command runs with the administrator role.
    pub fn is_admin(&self) -> bool {
        self.identity.user.is_some() && self.identity.admin
    }

    /// Write the store back to its snapshot file.
    pub fn persist(&self) -> Result<()> {
        self.backend
            .save(&self.snapshot)
            .with_context(|| format!("Failed to save store: {}", self.snapshot.display()))?;
        debug!(path = %self.snapshot.display(), "Store saved");
        Ok(())
    }

    /// Snapshot path in use.
    pub fn snapshot(&self) -> &Path {
        &self.snapshot
    }
}

/// Resolve a path relative to `base` unless it is absolute.
pub fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/srv/shop");
        assert_eq!(
            resolve_path(base, "store.json"),
            PathBuf::from("/srv/shop/store.json")
        );
        assert_eq!(
            resolve_path(base, "/tmp/store.json"),
            PathBuf::from("/tmp/store.json")
        );
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("shopfront.toml"),
            "[data]\nsnapshot = \"up.json\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Context::find_config(&nested).unwrap();
        assert_eq!(config.data.snapshot, "up.json");
    }
}
