//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use catalog_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "reconcile_updates": config.reconcile_updates,
                    "log_level": config.log_level
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.api_url);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  api_url:           {}", config.api_url);
            println!("  reconcile_updates: {}", config.reconcile_updates);
            println!("  log_level:         {}", config.log_level);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    // Edit the file as stored; CATALOG_* overrides must not be written back
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    let mut config = Config::load_file(&save_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply a single key/value to a configuration
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "api_url" => {
            if value.is_empty() {
                bail!("api_url cannot be empty");
            }
            config.api_url = value.trim_end_matches('/').to_string();
        }
        "reconcile_updates" => {
            config.reconcile_updates = value
                .parse()
                .context("Invalid value for reconcile_updates. Use 'true' or 'false'.")?;
        }
        "log_level" => {
            config.log_level = value.to_string();
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: api_url, reconcile_updates, log_level",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "api_url", "http://localhost:3000/").unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");

        apply(&mut config, "reconcile_updates", "false").unwrap();
        assert!(!config.reconcile_updates);

        apply(&mut config, "log_level", "debug").unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_set_keeps_env_out_of_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"http://from-file\"\n").unwrap();

        let saved = env::var("CATALOG_API_URL").ok();
        env::set_var("CATALOG_API_URL", "http://from-env");
        let result = set(
            "log_level".to_string(),
            "debug".to_string(),
            Some(&path),
            &Output::new(OutputFormat::Quiet),
        );
        match saved {
            Some(v) => env::set_var("CATALOG_API_URL", v),
            None => env::remove_var("CATALOG_API_URL"),
        }
        result.unwrap();

        let stored = Config::load_file(&path).unwrap();
        assert_eq!(stored.api_url, "http://from-file");
        assert_eq!(stored.log_level, "debug");
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();

        assert!(apply(&mut config, "nope", "x").is_err());
        assert!(apply(&mut config, "reconcile_updates", "maybe").is_err());
        assert!(apply(&mut config, "api_url", "").is_err());
    }
}
