//! Product command handlers
//!
//! These are the catalog views: the grid, the detail view and the edit
//! form. All changes go through the store's operations.

use anyhow::{bail, Context, Result};

use catalog_core::{NewProduct, Product, ProductId, ProductPatch, ProductService, ProductStore};

use crate::output::Output;
use crate::prompt::{confirm, prompt_with_default};

/// Field values given on the command line for create/edit
#[derive(Debug, Default)]
pub struct ProductFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub extra: Vec<(String, String)>,
}

impl ProductFields {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.price.is_none()
            && self.extra.is_empty()
    }

    /// Build a create payload; title is required
    pub fn into_new_product(self) -> Result<NewProduct> {
        let Some(title) = self.title else {
            bail!("A product needs a title (--title)");
        };

        let mut product = NewProduct::new(title)
            .with_description(self.description.unwrap_or_default())
            .with_image(self.image.unwrap_or_default())
            .with_price(self.price.unwrap_or(0.0));
        for (key, value) in self.extra {
            if !product.set_extra(key.as_str(), value) {
                bail!("'{}' is a built-in field; use its own flag", key);
            }
        }
        Ok(product)
    }

    /// Build an update payload carrying only the given fields
    pub fn into_patch(self) -> Result<ProductPatch> {
        let mut patch = ProductPatch {
            title: self.title,
            description: self.description,
            image: self.image,
            price: self.price,
            ..ProductPatch::default()
        };
        for (key, value) in self.extra {
            if !patch.set_extra(key.as_str(), value) {
                bail!("'{}' is a built-in field; use its own flag", key);
            }
        }
        Ok(patch)
    }
}

/// Fetch the catalog and show it as a grid, optionally filtered
pub async fn list<S: ProductService>(
    store: &ProductStore<S>,
    filter: Option<String>,
    output: &Output,
) -> Result<()> {
    store
        .fetch_all()
        .await
        .context("Failed to fetch products")?;

    let snapshot = store.snapshot();
    let products = snapshot.filter(filter.as_deref().unwrap_or(""));
    output.print_products(&products);
    Ok(())
}

/// Show a single product
pub async fn show<S: ProductService>(
    store: &ProductStore<S>,
    id: String,
    output: &Output,
) -> Result<()> {
    let product = store
        .find_or_fetch(&id)
        .await
        .with_context(|| format!("Product not found: {}", id))?;

    output.print_product(&product);
    Ok(())
}

/// Create a new product
pub async fn create<S: ProductService>(
    store: &ProductStore<S>,
    fields: ProductFields,
    output: &Output,
) -> Result<()> {
    let new_product = fields.into_new_product()?;

    let product = store
        .create(&new_product)
        .await
        .context("Failed to create product")?;

    output.success(&format!("Created product: {}", product.id));
    output.print_product(&product);
    Ok(())
}

/// Edit a product
///
/// With field flags only those fields are sent. Without any, an
/// interactive form asks for title, description and image, and the whole
/// edited product is sent.
pub async fn edit<S: ProductService>(
    store: &ProductStore<S>,
    id: String,
    fields: ProductFields,
    output: &Output,
) -> Result<()> {
    let patch = if fields.is_empty() {
        if !output.should_prompt() {
            bail!("Nothing to update. Pass --title, --description, --image, --price or --set");
        }
        let current = store
            .find_or_fetch(&id)
            .await
            .with_context(|| format!("Product not found: {}", id))?;
        match edit_form(&current)? {
            Some(edited) => ProductPatch::from_product(&edited),
            None => {
                output.message("No changes.");
                return Ok(());
            }
        }
    } else {
        fields.into_patch()?
    };

    let product_id = ProductId::from_key(&id);
    let product = store
        .update(&product_id, &patch)
        .await
        .context("Failed to update product")?;

    output.success("Product updated");
    output.print_product(&product);
    Ok(())
}

/// Delete a product
pub async fn delete<S: ProductService>(
    store: &ProductStore<S>,
    id: String,
    yes: bool,
    output: &Output,
) -> Result<()> {
    if !yes && output.should_prompt() {
        match store.find_or_fetch(&id).await {
            Ok(product) => println!("Delete product: {} - {}", product.id, product.title),
            Err(_) => println!("Delete product: {}", id),
        }
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    let deleted = store
        .delete(&id)
        .await
        .context("Failed to delete product")?;

    output.success(&format!("Deleted product: {}", deleted));
    Ok(())
}

/// Fetch the catalog and report the store state
pub async fn status<S: ProductService>(
    store: &ProductStore<S>,
    api_url: &str,
    output: &Output,
) -> Result<()> {
    // The fetch outcome is part of what gets reported
    if let Err(e) = store.fetch_all().await {
        if !output.is_quiet() {
            eprintln!("⚠ Fetch failed: {}", e);
        }
    }

    output.print_status(api_url, &store.snapshot());
    Ok(())
}

/// Interactive edit form; returns None when nothing changed
fn edit_form(current: &Product) -> Result<Option<Product>> {
    println!("Editing product: {}", current.id);
    println!("Press Enter to keep current value, or type new value.\n");

    let mut edited = current.clone();
    if let Some(title) = prompt_with_default("Title", &current.title)? {
        edited.title = title;
    }
    if let Some(description) = prompt_with_default("Description", &current.description)? {
        edited.description = description;
    }
    if let Some(image) = prompt_with_default("Image URL", &current.image)? {
        edited.image = image;
    }

    if edited == *current {
        Ok(None)
    } else {
        Ok(Some(edited))
    }
}

/// Parse a `key=value` extension field
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
