//! Cart mutations and the cached badge count.
//!
//! The header badge renders from a count cached in the session so pages
//! never block on the cart endpoint. This service is the only writer of
//! that cached value: every mutation goes through here and re-derives the
//! count from a fresh cart read afterwards.

use tower_sessions::Session;

use tumbletop_core::{AccessToken, ProductId};

use crate::models::session::keys;
use crate::services::session::read_epoch;
use crate::shop::{Cart, ShopClient, ShopError};

/// Request-scoped handle over the caller's cart.
#[derive(Clone)]
pub struct CartSync {
    session: Session,
    shop: ShopClient,
}

impl CartSync {
    /// Create a handle over one request's session.
    #[must_use]
    pub const fn new(session: Session, shop: ShopClient) -> Self {
        Self { session, shop }
    }

    /// The cached badge count. Zero for fresh and anonymous sessions.
    pub async fn count(&self) -> u32 {
        self.session
            .get::<u32>(keys::CART_COUNT)
            .await
            .ok()
            .flatten()
            .unwrap_or(0)
    }

    /// Fetch the cart and recompute the cached count from it.
    ///
    /// The count is the sum of line quantities, not the number of lines.
    /// The write is fenced by the auth epoch: if the identity changed
    /// while the fetch was in flight, the stale count is dropped instead
    /// of overwriting state that belongs to the new identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart fetch fails. The cached count is left
    /// untouched in that case.
    pub async fn snapshot(&self, token: &AccessToken) -> Result<Cart, ShopError> {
        let epoch_at_start = read_epoch(&self.session).await;
        let cart = self.shop.cart(token).await?;
        self.store_count(cart.total_quantity(), epoch_at_start).await;
        Ok(cart)
    }

    /// Recompute the badge count, falling back to the cached value.
    ///
    /// Used after mutations and by the badge fragment. A failed fetch is
    /// logged and the previous count kept; a momentarily stale badge beats
    /// a broken page.
    pub async fn refresh(&self, token: &AccessToken) -> u32 {
        match self.snapshot(token).await {
            Ok(cart) => cart.total_quantity(),
            Err(e) => {
                tracing::warn!("cart count refresh failed, keeping previous value: {e}");
                self.count().await
            }
        }
    }

    /// Add units of a product and return the refreshed badge count.
    ///
    /// Adding a product already in the cart grows its line rather than
    /// creating a second one; the API folds that for us.
    ///
    /// # Errors
    ///
    /// Returns an error if the add itself fails. A failure refreshing the
    /// count afterwards is swallowed by [`Self::refresh`].
    pub async fn add_item(
        &self,
        token: &AccessToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<u32, ShopError> {
        self.shop.add_to_cart(token, product_id, quantity).await?;
        Ok(self.refresh(token).await)
    }

    /// Set one line's quantity and return the resulting cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the update or the follow-up cart read fails.
    pub async fn set_quantity(
        &self,
        token: &AccessToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, ShopError> {
        self.shop
            .update_cart_quantity(token, product_id, quantity)
            .await?;
        self.snapshot(token).await
    }

    /// Remove one line and return the resulting cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal or the follow-up cart read fails.
    pub async fn remove_item(
        &self,
        token: &AccessToken,
        product_id: &ProductId,
    ) -> Result<Cart, ShopError> {
        self.shop.remove_from_cart(token, product_id).await?;
        self.snapshot(token).await
    }

    /// Write a freshly computed count unless the identity moved on.
    async fn store_count(&self, count: u32, epoch_at_start: u64) {
        if read_epoch(&self.session).await == epoch_at_start {
            if let Err(e) = self.session.insert(keys::CART_COUNT, &count).await {
                tracing::warn!("failed to cache cart count: {e}");
            }
        } else {
            tracing::debug!("cart count fetched under a previous identity, discarding");
        }
    }
}
