//! Product service error handling
//!
//! Every failed call to the product service is a single kind of failure
//! from the store's point of view. The variants only exist so callers can
//! show a useful message.

use thiserror::Error;

/// Errors returned by product service calls
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure (connection refused, DNS, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The response body did not match the expected product shape
    #[error("Invalid response from product service: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status code, when the service answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    /// Check if the service reported that the product does not exist
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Result type for product service calls
pub type ApiResult<T> = Result<T, ApiError>;
