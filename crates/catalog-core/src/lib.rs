//! Catalog Core Library
//!
//! This crate provides the core of the product catalog client: a
//! client-side store that mirrors a remote product service.
//!
//! # Architecture
//!
//! - **Product service**: REST endpoint that owns the products
//! - **Product store**: in-memory copy of the catalog plus the status of
//!   the last synchronization
//!
//! Views read snapshots of the store and call its operations; they never
//! mutate the state directly.
//!
//! # Quick Start
//!
//! ```text
//! let service = HttpProductService::new("https://fakestoreapi.com")?;
//! let store = ProductStore::new(service);
//!
//! store.fetch_all().await?;
//! store.create(&NewProduct::new("Mug").with_price(9.5)).await?;
//! store.delete("7").await?;
//!
//! let snapshot = store.snapshot();
//! ```
//!
//! # Modules
//!
//! - `store`: Product store (main entry point)
//! - `service`: Product service trait and HTTP implementation
//! - `models`: Product, NewProduct, ProductPatch and ProductId
//! - `error`: Service errors
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use models::{NewProduct, Product, ProductId, ProductPatch};
pub use service::{HttpProductService, ProductService};
pub use store::{ProductStore, RequestStatus, StoreSnapshot, UpdateReconciliation};
