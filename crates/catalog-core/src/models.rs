//! Data models for the product catalog
//!
//! Defines the `Product` entity as served by the remote product service,
//! plus the payloads used to create (`NewProduct`) and update
//! (`ProductPatch`) it.
//!
//! The service's product shape is open: beyond the required fields, any
//! other field is kept in an explicit `extra` map so it survives a
//! round trip through the store.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field names with a dedicated struct field. Extension keys may not use them.
pub const RESERVED_FIELDS: &[&str] = &["id", "title", "description", "image", "price"];

/// Extension fields not covered by the required product attributes
pub type ExtraFields = BTreeMap<String, Value>;

/// Product identifier assigned by the product service
///
/// The service normally sends a number, but string ids are tolerated.
/// Ids are compared by their string form, so `7` and `"7"` name the
/// same product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl ProductId {
    /// Parse an id typed by a user: digits become a numeric id
    pub fn from_key(key: &str) -> Self {
        match key.parse::<i64>() {
            Ok(n) if n.to_string() == key => ProductId::Number(n),
            _ => ProductId::Text(key.to_string()),
        }
    }

    /// The canonical string key of this id
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Check whether this id coerces to the given string key
    pub fn matches_key(&self, key: &str) -> bool {
        self.key() == key
    }

    /// Check whether two ids name the same product
    pub fn same_as(&self, other: &ProductId) -> bool {
        self.matches_key(&other.key())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(n: i64) -> Self {
        ProductId::Number(n)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId::Text(s.to_string())
    }
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Identifier assigned by the service
    pub id: ProductId,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Long-form description
    #[serde(default)]
    pub description: String,
    /// Image URL
    #[serde(default)]
    pub image: String,
    /// Unit price
    #[serde(default)]
    pub price: f64,
    /// Any other field the service sends
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Product {
    /// Create a product with the given id and title
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            image: String::new(),
            price: 0.0,
            extra: ExtraFields::new(),
        }
    }

    /// Get an extension field as a string, if present and string-valued
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Set a string extension field
    ///
    /// Returns false (and changes nothing) when `key` names a required field.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        insert_extra(&mut self.extra, key.into(), value.into())
    }
}

/// A product that has not been created yet (no id)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: f64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl NewProduct {
    /// Create a new product payload with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Set a string extension field (ignored for required field names)
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        insert_extra(&mut self.extra, key.into(), value.into())
    }

    /// Attach an id, producing the stored form of this product
    pub fn with_id(self, id: impl Into<ProductId>) -> Product {
        Product {
            id: id.into(),
            title: self.title,
            description: self.description,
            image: self.image,
            price: self.price,
            extra: self.extra,
        }
    }
}

/// Replacement values for an existing product
///
/// Only the fields that are set are sent to the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ProductPatch {
    /// Build a patch that carries every field of an edited product
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: Some(product.title.clone()),
            description: Some(product.description.clone()),
            image: Some(product.image.clone()),
            price: Some(product.price),
            extra: product.extra.clone(),
        }
    }

    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.price.is_none()
            && self.extra.is_empty()
    }

    /// Set a string extension field (ignored for required field names)
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        insert_extra(&mut self.extra, key.into(), value.into())
    }

    /// Apply this patch on top of an existing product
    pub fn apply_to(&self, product: &Product) -> Product {
        let mut updated = product.clone();
        if let Some(ref title) = self.title {
            updated.title = title.clone();
        }
        if let Some(ref description) = self.description {
            updated.description = description.clone();
        }
        if let Some(ref image) = self.image {
            updated.image = image.clone();
        }
        if let Some(price) = self.price {
            updated.price = price;
        }
        for (key, value) in &self.extra {
            updated.extra.insert(key.clone(), value.clone());
        }
        updated
    }
}

fn insert_extra(extra: &mut ExtraFields, key: String, value: String) -> bool {
    if RESERVED_FIELDS.contains(&key.as_str()) {
        return false;
    }
    extra.insert(key, Value::String(value));
    true
}
