//! Catalog CLI
//!
//! Command-line interface for the product catalog.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use catalog_core::{Config, HttpProductService, ProductStore};

mod commands;
mod output;
mod prompt;

use commands::product::{parse_assignment, ProductFields};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Catalog - browse and manage products on a remote product service")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Product service base URL (overrides config)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Config file to use instead of the default
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    #[command(alias = "ls")]
    List {
        /// Only show products whose title or description contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show product details
    Show {
        /// Product ID
        id: String,
    },
    /// Create a new product
    #[command(alias = "add")]
    Create {
        /// Product title
        #[arg(short = 'T', long)]
        title: String,
        /// Product description
        #[arg(short, long)]
        description: Option<String>,
        /// Image URL
        #[arg(short, long)]
        image: Option<String>,
        /// Price
        #[arg(short, long)]
        price: Option<f64>,
        /// Extra field (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Edit a product (interactive when no fields are given)
    Edit {
        /// Product ID
        id: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New image URL
        #[arg(short, long)]
        image: Option<String>,
        /// New price
        #[arg(short, long)]
        price: Option<f64>,
        /// Extra field (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Delete a product
    #[command(alias = "rm")]
    Delete {
        /// Product ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show service and store status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, reconcile_updates, log_level)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let mut config = Config::load_with_cli_override(cli.config_file.as_ref())
        .context("Failed to load configuration")?;
    init_logging(cli.verbose, &config.log_level);

    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    match cli.command {
        Commands::Config { command } => {
            handle_config_command(command, cli.config_file.as_ref(), &output)
        }
        command => {
            debug!(api_url = %config.api_url, "Using product service");
            let service = HttpProductService::new(config.api_url.clone())
                .context("Failed to create HTTP client")?;
            let store =
                ProductStore::new(service).with_update_reconciliation(config.update_reconciliation());
            handle_product_command(command, &store, &config, &output).await
        }
    }
}

async fn handle_product_command(
    command: Commands,
    store: &ProductStore<HttpProductService>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        Commands::List { filter } => commands::product::list(store, filter, output).await,
        Commands::Show { id } => commands::product::show(store, id, output).await,
        Commands::Create {
            title,
            description,
            image,
            price,
            set,
        } => {
            let fields = ProductFields {
                title: Some(title),
                description,
                image,
                price,
                extra: set,
            };
            commands::product::create(store, fields, output).await
        }
        Commands::Edit {
            id,
            title,
            description,
            image,
            price,
            set,
        } => {
            let fields = ProductFields {
                title,
                description,
                image,
                price,
                extra: set,
            };
            commands::product::edit(store, id, fields, output).await
        }
        Commands::Delete { id, yes } => commands::product::delete(store, id, yes, output).await,
        Commands::Status => commands::product::status(store, &config.api_url, output).await,
        Commands::Config { .. } => unreachable!(), // Handled in main
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log level for a `-v` count, falling back to the configured level
fn log_level(verbose: u8, configured: &str) -> &str {
    match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize stderr logging
///
/// RUST_LOG wins over the verbosity flag and the configured level.
fn init_logging(verbose: u8, configured: &str) {
    let level = log_level(verbose, configured);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("catalog_core={},catalog_cli={}", level, level))
    });

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0, "warn"), "warn");
        assert_eq!(log_level(1, "warn"), "info");
        assert_eq!(log_level(2, "warn"), "debug");
        assert_eq!(log_level(5, "warn"), "trace");
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "catalog",
            "add",
            "--title",
            "Mug",
            "--price",
            "9.5",
            "--set",
            "category=kitchen",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Create {
                title, price, set, ..
            } => {
                assert_eq!(title, "Mug");
                assert_eq!(price, Some(9.5));
                assert_eq!(set, vec![("category".to_string(), "kitchen".to_string())]);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_parse_delete_alias() {
        let cli = Cli::try_parse_from(["catalog", "rm", "7", "-y"]).unwrap();
        match cli.command {
            Commands::Delete { id, yes } => {
                assert_eq!(id, "7");
                assert!(yes);
            }
            _ => panic!("expected delete"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "catalog",
            "ls",
            "--filter",
            "jacket",
            "--api-url",
            "http://localhost:3000",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::List { filter: Some(ref f) } if f == "jacket"));
    }

    #[test]
    fn test_parse_rejects_bad_assignment() {
        let result = Cli::try_parse_from(["catalog", "edit", "3", "--set", "oops"]);
        assert!(result.is_err());
    }
}
