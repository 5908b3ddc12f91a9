//! Commerce API client implementation.
//!
//! Plain JSON over REST with `reqwest` 0.13. Catalog reads are cached with
//! `moka` (5-minute TTL); account-scoped reads never are.

use std::sync::Arc;
use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use tumbletop_core::{AccessToken, ProductId};
use url::Url;

use crate::config::ShopConfig;
use crate::shop::ShopError;
use crate::shop::cache::{CacheKey, CacheValue};
use crate::shop::types::{
    Ack, AuthResponse, Cart, CartAdd, Category, Credentials, Order, OrderDraft, Product,
    ProductFilter, Registration, User, Wishlist,
};

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Upper bound on cached catalog entries.
const CACHE_CAPACITY: u64 = 1_000;

// =============================================================================
// ShopClient
// =============================================================================

/// Client for the Tumbletop commerce API.
///
/// Cheap to clone; all clones share one HTTP connection pool and one catalog
/// cache. Authenticated endpoints take the caller's token per call rather
/// than holding one.
#[derive(Clone)]
pub struct ShopClient {
    inner: Arc<ShopClientInner>,
}

struct ShopClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: moka::future::Cache<CacheKey, CacheValue>,
}

impl ShopClient {
    /// Create a new commerce API client.
    #[must_use]
    pub fn new(config: &ShopConfig) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("failed to build HTTP client with timeout, using defaults: {e}");
                reqwest::Client::new()
            });

        Self {
            inner: Arc::new(ShopClientInner {
                client,
                base_url: config.api_base_url.clone(),
                cache,
            }),
        }
    }

    /// Resolve an absolute endpoint URL for an API path.
    fn endpoint(&self, path: &str) -> Result<Url, ShopError> {
        self.inner.base_url.join(path).map_err(Into::into)
    }

    /// Attach a bearer credential to a request.
    fn bearer(request: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        request.bearer_auth(token.expose())
    }

    /// Send a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ShopError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            // Error bodies carry a {"detail": ...} envelope
            let detail = serde_json::from_str::<crate::shop::types::ApiErrorBody>(&response_text)
                .ok()
                .map(|body| body.detail);
            if detail.is_none() {
                tracing::error!(
                    status = %status,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "commerce API returned non-success status without error detail"
                );
            }
            return Err(ShopError::from_status(status, detail));
        }

        match serde_json::from_str(&response_text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse commerce API response"
                );
                Err(ShopError::Parse(e))
            }
        }
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered or the API
    /// request fails.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ShopError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/api/auth/register")?)
            .json(registration);
        self.execute(request).await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Unauthorized` on a bad email or password.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ShopError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/api/auth/login")?)
            .json(credentials);
        self.execute(request).await
    }

    /// Fetch the account a token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Unauthorized` when the token is expired or
    /// revoked.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: &AccessToken) -> Result<User, ShopError> {
        let request = Self::bearer(self.inner.client.get(self.endpoint("/api/auth/me")?), token);
        self.execute(request).await
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List products, optionally filtered by category or featured flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ShopError> {
        let cache_key = CacheKey::Products(filter.clone());

        // Check cache
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut request = self.inner.client.get(self.endpoint("/api/products")?);
        if let Some(category) = &filter.category {
            request = request.query(&[("category", category)]);
        }
        if filter.featured {
            request = request.query(&[("featured", "true")]);
        }

        let products: Vec<Product> = self.execute(request).await?;

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` for an unknown ID.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: &ProductId) -> Result<Product, ShopError> {
        let cache_key = CacheKey::Product(product_id.as_str().to_string());

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let request = self
            .inner
            .client
            .get(self.endpoint(&format!("/api/products/{product_id}"))?);
        let product: Product = self.execute(request).await?;

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List browsing categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ShopError> {
        // Check cache
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let request = self.inner.client.get(self.endpoint("/api/categories")?);
        let categories: Vec<Category> = self.execute(request).await?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Fetch the caller's cart with product documents populated.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &AccessToken) -> Result<Cart, ShopError> {
        let request = Self::bearer(self.inner.client.get(self.endpoint("/api/cart")?), token);
        self.execute(request).await
    }

    /// Add units of a product to the caller's cart.
    ///
    /// The API folds repeated adds into one line per product.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` for an unknown product, or
    /// `ShopError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        token: &AccessToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), ShopError> {
        let body = CartAdd {
            product_id: product_id.clone(),
            quantity,
        };
        let request = Self::bearer(
            self.inner.client.post(self.endpoint("/api/cart")?),
            token,
        )
        .json(&body);
        let _: Ack = self.execute(request).await?;
        Ok(())
    }

    /// Set the quantity of one cart line.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id, quantity))]
    pub async fn update_cart_quantity(
        &self,
        token: &AccessToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), ShopError> {
        // Quantity rides in the query string on this endpoint
        let request = Self::bearer(
            self.inner
                .client
                .put(self.endpoint(&format!("/api/cart/{product_id}"))?)
                .query(&[("quantity", quantity)]),
            token,
        );
        let _: Ack = self.execute(request).await?;
        Ok(())
    }

    /// Remove one line from the caller's cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        token: &AccessToken,
        product_id: &ProductId,
    ) -> Result<(), ShopError> {
        let request = Self::bearer(
            self.inner
                .client
                .delete(self.endpoint(&format!("/api/cart/{product_id}"))?),
            token,
        );
        let _: Ack = self.execute(request).await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// Fetch the caller's wishlist with product documents populated.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn wishlist(&self, token: &AccessToken) -> Result<Wishlist, ShopError> {
        let request = Self::bearer(self.inner.client.get(self.endpoint("/api/wishlist")?), token);
        self.execute(request).await
    }

    /// Save a product to the caller's wishlist. Saving twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` for an unknown product, or
    /// `ShopError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        token: &AccessToken,
        product_id: &ProductId,
    ) -> Result<(), ShopError> {
        let request = Self::bearer(
            self.inner
                .client
                .post(self.endpoint(&format!("/api/wishlist/{product_id}"))?),
            token,
        );
        let _: Ack = self.execute(request).await?;
        Ok(())
    }

    /// Drop a product from the caller's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        token: &AccessToken,
        product_id: &ProductId,
    ) -> Result<(), ShopError> {
        let request = Self::bearer(
            self.inner
                .client
                .delete(self.endpoint(&format!("/api/wishlist/{product_id}"))?),
            token,
        );
        let _: Ack = self.execute(request).await?;
        Ok(())
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// List the caller's orders.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, token: &AccessToken) -> Result<Vec<Order>, ShopError> {
        let request = Self::bearer(self.inner.client.get(self.endpoint("/api/orders")?), token);
        self.execute(request).await
    }

    /// Place an order. The server prices it, stores it as pending, and
    /// clears the caller's cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token, draft), fields(lines = draft.items.len()))]
    pub async fn create_order(
        &self,
        token: &AccessToken,
        draft: &OrderDraft,
    ) -> Result<Order, ShopError> {
        let request = Self::bearer(
            self.inner.client.post(self.endpoint("/api/orders")?),
            token,
        )
        .json(draft);
        self.execute(request).await
    }
}
