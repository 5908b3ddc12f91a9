//! Typed client for the Tumbletop commerce API.
//!
//! # Architecture
//!
//! - The API is the source of truth. No local sync, every page load reads
//!   through this client.
//! - JSON over REST via `reqwest`, one method per endpoint.
//! - In-memory caching via `moka` for the public catalog (5 minute TTL).
//! - Credentials are never stored here. Authenticated calls take the bearer
//!   token as an argument so the session layer stays the only place that
//!   holds it.
//!
//! # Example
//!
//! ```rust,ignore
//! use tumbletop_storefront::shop::ShopClient;
//!
//! let shop = ShopClient::new(&config.shop)?;
//!
//! // Public catalog
//! let featured = shop.products(&ProductFilter::featured()).await?;
//!
//! // Authenticated calls pass the caller's token explicitly
//! let auth = shop.login(&credentials).await?;
//! let cart = shop.cart(&auth.access_token).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::ShopClient;
pub use types::*;

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum ShopError {
    /// HTTP transport failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request path did not form a valid URL against the base.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credential missing, expired, or revoked (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("API error ({status}): {detail}")]
    Api {
        /// Status the API returned.
        status: StatusCode,
        /// The `detail` field of the error body, or the status reason.
        detail: String,
    },
}

impl ShopError {
    /// Map a non-success status and optional error `detail` to a variant.
    pub(crate) fn from_status(status: StatusCode, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("no error details provided")
                .to_string()
        });

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(detail),
            StatusCode::NOT_FOUND => Self::NotFound(detail),
            _ => Self::Api { status, detail },
        }
    }
}
