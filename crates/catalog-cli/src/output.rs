//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use catalog_core::{Product, StoreSnapshot};
use serde::Serialize;

/// Column widths of the product grid
const TITLE_WIDTH: usize = 40;
const DESCRIPTION_WIDTH: usize = 50;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single product (detail view)
    pub fn print_product(&self, product: &Product) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", product.id);
                println!("Title:       {}", product.title);
                println!("Price:       {}", format_price(product.price));
                if !product.image.is_empty() {
                    println!("Image:       {}", product.image);
                }
                for (key, value) in &product.extra {
                    let value = match value.as_str() {
                        Some(s) => s.to_string(),
                        None => value.to_string(),
                    };
                    println!("{:<12} {}", format!("{}:", key), value);
                }
                if !product.description.is_empty() {
                    println!();
                    println!("{}", product.description);
                }
            }
            OutputFormat::Json => print_json(product),
            OutputFormat::Quiet => {
                println!("{}", product.id);
            }
        }
    }

    /// Print a list of products as a grid
    pub fn print_products(&self, products: &[&Product]) {
        match self.format {
            OutputFormat::Human => {
                if products.is_empty() {
                    println!("No products found.");
                    return;
                }
                let id_width = products
                    .iter()
                    .map(|p| p.id.key().chars().count())
                    .max()
                    .unwrap_or(2)
                    .max(2);
                for product in products {
                    println!(
                        "{:>id_width$} | {:<title_width$} | {:>10} | {}",
                        product.id.key(),
                        fit(&product.title, TITLE_WIDTH),
                        format_price(product.price),
                        fit_line(&product.description, DESCRIPTION_WIDTH),
                        id_width = id_width,
                        title_width = TITLE_WIDTH,
                    );
                }
                println!("\n{} product(s)", products.len());
            }
            OutputFormat::Json => print_json(&products),
            OutputFormat::Quiet => {
                for product in products {
                    println!("{}", product.id);
                }
            }
        }
    }

    /// Print the store state summary
    pub fn print_status(&self, api_url: &str, snapshot: &StoreSnapshot) {
        match self.format {
            OutputFormat::Human => {
                println!("Catalog Status");
                println!("==============");
                println!();
                println!("Service:  {}", api_url);
                println!("Status:   {}", snapshot.status);
                println!("Error:    {}", if snapshot.error { "yes" } else { "no" });
                println!("Products: {}", snapshot.len());
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "api_url": api_url,
                        "status": snapshot.status,
                        "error": snapshot.error,
                        "count": snapshot.len(),
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", snapshot.status);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

/// Format a price with two decimals
fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Fit a string into `max_len` characters, adding "..." if cut
fn fit(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Fit the first line of a string into `max_len` characters
fn fit_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    fit(first_line, max_len)
}
