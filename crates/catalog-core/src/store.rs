//! Product store
//!
//! The `ProductStore` owns the client-side copy of the catalog and the
//! status of the most recent synchronization with the product service.
//!
//! ## State
//!
//! - `items`: products in the order of the last successful fetch, with
//!   created products appended and deleted products removed
//! - `status`: idle, loading, succeeded or failed. Shared by all
//!   operations; the call that settles last wins
//! - `error`: set when a fetch fails. A later success does not clear it
//!
//! ## Usage
//!
//! ```ignore
//! let store = ProductStore::new(HttpProductService::new(url)?);
//! store.fetch_all().await?;
//! for product in store.snapshot().items { ... }
//! ```
//!
//! Every operation publishes a "started" and a "settled" snapshot to
//! subscribers. Only the store writes to its state.

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::models::{NewProduct, Product, ProductId, ProductPatch};
use crate::service::ProductService;

/// Status of the most recently started synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Nothing has been requested yet
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The last request to settle succeeded
    Succeeded,
    /// The last request to settle failed
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Loading => "loading",
            RequestStatus::Succeeded => "succeeded",
            RequestStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful update does to the stored collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateReconciliation {
    /// Track the update like create and delete: status transitions, and the
    /// stored product with the same id is replaced by the server's copy
    #[default]
    Replace,
    /// Call the service and hand the result back, without any state
    /// transition. Neither status nor items change
    Detached,
}

/// Read-only copy of the store state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub items: Vec<Product>,
    pub status: RequestStatus,
    pub error: bool,
}

impl StoreSnapshot {
    /// Find a product whose id coerces to `key`
    pub fn find(&self, key: &str) -> Option<&Product> {
        self.items.iter().find(|p| p.id.matches_key(key))
    }

    /// Products whose title or description contains `query` (case-insensitive)
    ///
    /// An empty query matches everything. Order is preserved.
    pub fn filter(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.title.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Client-side product store backed by a [`ProductService`]
pub struct ProductStore<S> {
    service: S,
    state: watch::Sender<StoreSnapshot>,
    updates: UpdateReconciliation,
}

impl<S: ProductService> ProductStore<S> {
    /// Create an empty store (status idle)
    pub fn new(service: S) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::default());
        Self {
            service,
            state,
            updates: UpdateReconciliation::default(),
        }
    }

    /// Choose how successful updates are reconciled
    pub fn with_update_reconciliation(mut self, updates: UpdateReconciliation) -> Self {
        self.updates = updates;
        self
    }

    /// The configured update reconciliation
    pub fn update_reconciliation(&self) -> UpdateReconciliation {
        self.updates
    }

    /// The underlying product service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    /// Current request status
    pub fn status(&self) -> RequestStatus {
        self.state.borrow().status
    }

    /// Subscribe to state changes
    ///
    /// The receiver sees every "started" and "settled" transition.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    /// Find a stored product whose id coerces to `key`
    pub fn find(&self, key: &str) -> Option<Product> {
        self.state.borrow().find(key).cloned()
    }

    // ==================== Synchronization ====================

    /// Fetch every product, replacing the stored collection
    ///
    /// On failure the collection is kept and the error flag is set.
    pub async fn fetch_all(&self) -> ApiResult<Vec<Product>> {
        self.start("fetch_all");

        match self.service.list().await {
            Ok(items) => {
                info!(count = items.len(), "Fetched products");
                let result = items.clone();
                self.state.send_modify(|s| {
                    s.items = items;
                    s.status = RequestStatus::Succeeded;
                });
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch products");
                self.state.send_modify(|s| {
                    s.status = RequestStatus::Failed;
                    s.error = true;
                });
                Err(e)
            }
        }
    }

    /// Create a product and append the server's copy
    ///
    /// If the server hands back an id that is already stored, the old entry
    /// is dropped so ids stay unique.
    pub async fn create(&self, product: &NewProduct) -> ApiResult<Product> {
        self.start("create");

        match self.service.create(product).await {
            Ok(created) => {
                info!(id = %created.id, "Created product");
                let result = created.clone();
                self.state.send_modify(|s| {
                    s.items.retain(|p| !p.id.same_as(&created.id));
                    s.items.push(created);
                    s.status = RequestStatus::Succeeded;
                });
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create product");
                self.fail();
                Err(e)
            }
        }
    }

    /// Update a product
    ///
    /// Under [`UpdateReconciliation::Replace`] the stored product with `id`
    /// is replaced by the server's copy (nothing happens if it is not
    /// stored), and any other entry carrying the returned id is dropped. Under [`UpdateReconciliation::Detached`] the state is left
    /// alone entirely.
    pub async fn update(&self, id: &ProductId, patch: &ProductPatch) -> ApiResult<Product> {
        if self.updates == UpdateReconciliation::Detached {
            debug!(%id, "Updating product (detached)");
            return self.service.update(id, patch).await;
        }

        self.start("update");

        match self.service.update(id, patch).await {
            Ok(updated) => {
                info!(%id, "Updated product");
                let result = updated.clone();
                self.state.send_modify(|s| {
                    if let Some(pos) = s.items.iter().position(|p| p.id.same_as(id)) {
                        let new_id = updated.id.clone();
                        s.items[pos] = updated;
                        // The server may answer with another stored id
                        let mut index = 0;
                        s.items.retain(|p| {
                            let keep = index == pos || !p.id.same_as(&new_id);
                            index += 1;
                            keep
                        });
                    }
                    s.status = RequestStatus::Succeeded;
                });
                Ok(result)
            }
            Err(e) => {
                warn!(%id, error = %e, "Failed to update product");
                self.fail();
                Err(e)
            }
        }
    }

    /// Delete a product by id key
    ///
    /// Every stored product whose id coerces to `key` is removed. Deleting
    /// an id that is not stored still succeeds if the service says so.
    pub async fn delete(&self, key: &str) -> ApiResult<String> {
        self.start("delete");

        match self.service.delete(key).await {
            Ok(()) => {
                info!(id = key, "Deleted product");
                self.state.send_modify(|s| {
                    s.items.retain(|p| !p.id.matches_key(key));
                    s.status = RequestStatus::Succeeded;
                });
                Ok(key.to_string())
            }
            Err(e) => {
                warn!(id = key, error = %e, "Failed to delete product");
                self.fail();
                Err(e)
            }
        }
    }

    /// Look up a product for the detail view
    ///
    /// Returns the stored copy when there is one, otherwise asks the
    /// service. Neither items nor status change.
    pub async fn find_or_fetch(&self, key: &str) -> ApiResult<Product> {
        if let Some(product) = self.find(key) {
            return Ok(product);
        }

        debug!(id = key, "Product not stored, fetching");
        self.service.get(key).await
    }

    fn start(&self, operation: &str) {
        debug!(operation, "Request started");
        self.state.send_modify(|s| s.status = RequestStatus::Loading);
    }

    fn fail(&self) {
        self.state.send_modify(|s| s.status = RequestStatus::Failed);
    }
}
