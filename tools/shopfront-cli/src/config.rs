//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use shopfront_core::StoreConfig;

/// Snapshot file used when none is configured.
pub const DEFAULT_SNAPSHOT: &str = "shopfront-data.json";

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Storefront settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Where the store data lives.
    #[serde(default)]
    pub data: DataConfig,
}

/// Location of the local store snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON snapshot path, relative to the working directory.
    #[serde(default = "default_snapshot")]
    pub snapshot: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
        }
    }
}

fn default_snapshot() -> String {
    DEFAULT_SNAPSHOT.to_string()
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))?
        };

        config
            .store
            .validate()
            .with_context(|| format!("Invalid config: {}", path))?;
        Ok(config)
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_commerce::catalog::ReviewPolicy;
    use shopfront_core::OrphanPolicy;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.data.snapshot, DEFAULT_SNAPSHOT);
    }

    #[test]
    fn test_load_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("shopfront.toml");
        std::fs::write(
            &toml_path,
            r#"
[store]
shipping_fee_cents = 0
review_policy = "any_authenticated"
orphan_policy = "keep"

[data]
snapshot = "store.json"
"#,
        )
        .unwrap();
        let config = CliConfig::load(toml_path.to_str().unwrap()).unwrap();
        assert_eq!(config.store.shipping_fee_cents, 0);
        assert_eq!(config.store.review_policy, ReviewPolicy::AnyAuthenticated);
        assert_eq!(config.store.orphan_policy, OrphanPolicy::Keep);
        assert_eq!(config.data.snapshot, "store.json");

        let json_path = dir.path().join("shopfront.json");
        config.save(json_path.to_str().unwrap()).unwrap();
        assert_eq!(CliConfig::load(json_path.to_str().unwrap()).unwrap(), config);
    }

    #[test]
    fn test_invalid_store_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopfront.toml");
        std::fs::write(&path, "[store]\nnotification_limit = 0\n").unwrap();
        assert!(CliConfig::load(path.to_str().unwrap()).is_err());
    }
}
