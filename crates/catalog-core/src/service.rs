//! Remote product service
//!
//! `ProductService` is the seam between the store and the REST endpoint.
//! `HttpProductService` talks to a fakestoreapi-compatible server:
//!
//! - `GET    /products`       list
//! - `GET    /products/{id}`  read
//! - `POST   /products`       create
//! - `PUT    /products/{id}`  update
//! - `DELETE /products/{id}`  delete
//!
//! Any transport failure, non-success status or undecodable body is
//! reported as an `ApiError`. There is no retry and no request timeout.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::models::{NewProduct, Product, ProductId, ProductPatch};

/// Operations offered by the remote product service
#[async_trait]
pub trait ProductService: Send + Sync {
    /// List every product
    async fn list(&self) -> ApiResult<Vec<Product>>;

    /// Get a single product by id key
    async fn get(&self, key: &str) -> ApiResult<Product>;

    /// Create a product; the service assigns its id
    async fn create(&self, product: &NewProduct) -> ApiResult<Product>;

    /// Replace fields of an existing product
    async fn update(&self, id: &ProductId, patch: &ProductPatch) -> ApiResult<Product>;

    /// Delete a product by id key
    async fn delete(&self, key: &str) -> ApiResult<()>;
}

/// HTTP implementation of [`ProductService`]
#[derive(Debug, Clone)]
pub struct HttpProductService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpProductService {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(http, base_url))
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}/products`
    fn collection_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    /// `{base_url}/products/{key}`, with the key as a single path segment
    fn item_url(&self, key: &str) -> String {
        format!("{}/{}", self.collection_url(), urlencoding::encode(key))
    }

    /// Map a non-success status to `ApiError::Server`
    async fn check(resp: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    /// Parse a successful response body
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> ApiResult<R> {
        let resp = Self::check(resp).await?;
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProductService for HttpProductService {
    async fn list(&self) -> ApiResult<Vec<Product>> {
        let url = self.collection_url();
        debug!(%url, "GET products");
        let resp = self.http.get(&url).send().await?;
        Self::parse(resp).await
    }

    async fn get(&self, key: &str) -> ApiResult<Product> {
        let url = self.item_url(key);
        debug!(%url, "GET product");
        let resp = self.http.get(&url).send().await?;
        Self::parse(resp).await
    }

    async fn create(&self, product: &NewProduct) -> ApiResult<Product> {
        let url = self.collection_url();
        debug!(%url, title = %product.title, "POST product");
        let resp = self.http.post(&url).json(product).send().await?;
        Self::parse(resp).await
    }

    async fn update(&self, id: &ProductId, patch: &ProductPatch) -> ApiResult<Product> {
        let url = self.item_url(&id.key());
        debug!(%url, "PUT product");
        let resp = self.http.put(&url).json(patch).send().await?;
        Self::parse(resp).await
    }

    async fn delete(&self, key: &str) -> ApiResult<()> {
        let url = self.item_url(key);
        debug!(%url, "DELETE product");
        let resp = self.http.delete(&url).send().await?;
        // The body is not required; success implies deletion
        Self::check(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_urls_trim_trailing_slash() {
        let service = HttpProductService::new("http://localhost:8080/").unwrap();
        assert_eq!(service.base_url(), "http://localhost:8080");
        assert_eq!(service.collection_url(), "http://localhost:8080/products");
        assert_eq!(service.item_url("7"), "http://localhost:8080/products/7");
    }

    #[test]
    fn test_item_url_escapes_key() {
        let service = HttpProductService::new("http://localhost:8080").unwrap();
        assert_eq!(
            service.item_url("1/../2"),
            "http://localhost:8080/products/1%2F..%2F2"
        );
        assert_eq!(
            service.item_url("a b?"),
            "http://localhost:8080/products/a%20b%3F"
        );
    }

    #[tokio::test]
    async fn test_delete_targets_escaped_key() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/products/1%2F..%2F2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/products/2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = HttpProductService::new(server.uri()).unwrap();
        service.delete("1/../2").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_products() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "One", "price": 1.5, "description": "", "image": "", "category": "a"},
                {"id": 2, "title": "Two", "price": 2, "description": "", "image": ""}
            ])))
            .mount(&server)
            .await;

        let service = HttpProductService::new(server.uri()).unwrap();
        let products = service.list().await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "One");
        assert_eq!(products[0].extra_str("category"), Some("a"));
        assert_eq!(products[1].id, ProductId::Number(2));
        assert_eq!(products[1].price, 2.0);
    }

    #[tokio::test]
    async fn test_get_product() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9, "title": "Nine"})))
            .mount(&server)
            .await;

        let service = HttpProductService::new(server.uri()).unwrap();
        let product = service.get("9").await.unwrap();
        assert_eq!(product.title, "Nine");
    }

    #[tokio::test]
    async fn test_create_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/products"))
            .and(body_json(json!({
                "title": "X",
                "description": "d",
                "image": "https://example.com/x.png",
                "price": 4.0
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 101,
                "title": "X",
                "description": "d",
                "image": "https://example.com/x.png",
                "price": 4.0
            })))
            .mount(&server)
            .await;

        let service = HttpProductService::new(server.uri()).unwrap();
        let new = NewProduct::new("X")
            .with_description("d")
            .with_image("https://example.com/x.png")
            .with_price(4.0);
        let created = service.create(&new).await.unwrap();
        assert_eq!(created.id, ProductId::Number(101));
    }

    #[tokio::test]
    async fn test_update_puts_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/products/3"))
            .and(body_json(json!({"title": "Renamed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3, "title": "Renamed"})))
            .mount(&server)
            .await;

        let service = HttpProductService::new(server.uri()).unwrap();
        let patch = ProductPatch {
            title: Some("Renamed".to_string()),
            ..ProductPatch::default()
        };
        let updated = service.update(&ProductId::Number(3), &patch).await.unwrap();
        assert_eq!(updated.title, "Renamed");
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/products/5"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let service = HttpProductService::new(server.uri()).unwrap();
        service.delete("5").await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let service = HttpProductService::new(server.uri()).unwrap();
        let err = service.list().await.unwrap_err();
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let service = HttpProductService::new(server.uri()).unwrap();
        let err = service.list().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on port 1
        let service = HttpProductService::new("http://127.0.0.1:1").unwrap();
        let err = service.list().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
