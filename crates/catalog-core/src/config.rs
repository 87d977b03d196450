//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/catalog/config.toml)
//! 3. Environment variables (CATALOG_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::UpdateReconciliation;

/// Environment variable prefix
const ENV_PREFIX: &str = "CATALOG";

/// Default product service
pub const DEFAULT_API_URL: &str = "https://fakestoreapi.com";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the product service
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Whether a successful update replaces the stored product
    #[serde(default = "default_true")]
    pub reconcile_updates: bool,

    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            reconcile_updates: true,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (CATALOG_API_URL, CATALOG_RECONCILE_UPDATES, CATALOG_LOG_LEVEL)
    /// 2. Config file (~/.config/catalog/config.toml or CATALOG_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a config file given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load only what the config file holds, without environment overrides
    ///
    /// This is what gets edited and saved back. If the file doesn't exist,
    /// defaults are used.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // CATALOG_API_URL
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        // CATALOG_RECONCILE_UPDATES
        if let Ok(val) = std::env::var(format!("{}_RECONCILE_UPDATES", ENV_PREFIX)) {
            self.reconcile_updates = val.eq_ignore_ascii_case("true") || val == "1";
        }

        // CATALOG_LOG_LEVEL
        if let Ok(val) = std::env::var(format!("{}_LOG_LEVEL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.log_level = val;
            }
        }
    }

    /// How the store treats successful updates
    pub fn update_reconciliation(&self) -> UpdateReconciliation {
        if self.reconcile_updates {
            UpdateReconciliation::Replace
        } else {
            UpdateReconciliation::Detached
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with CATALOG_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("catalog")
            .join("config.toml")
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}
