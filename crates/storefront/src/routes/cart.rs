//! Cart route handlers.
//!
//! The cart page is gated; its mutations are htmx fragments that return
//! either the refreshed item list or the refreshed badge, plus an
//! `HX-Trigger: cart-updated` header so the badge elsewhere on the page
//! re-fetches itself. All mutations go through [`CartSync`] so the cached
//! badge count is re-derived in one place.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;
use tumbletop_core::ProductId;

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::RequireUser;
use crate::services::CartSync;
use crate::shop::types::{Cart, CartItem};

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let (name, image, price) = item.product.as_ref().map_or_else(
            || ("(unavailable)".to_string(), String::new(), String::new()),
            |p| (p.name.clone(), p.image.clone(), p.price.to_string()),
        );

        Self {
            product_id: item.product_id.as_str().to_string(),
            name,
            image,
            price,
            quantity: item.quantity,
            line_total: item.line_total().to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    /// Shipping is free, so this always equals the subtotal.
    pub total: String,
    pub count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            subtotal: subtotal.to_string(),
            total: subtotal.to_string(),
            count: cart.total_quantity(),
        }
    }
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            total: "$0.00".to_string(),
            count: 0,
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub load_failed: bool,
    pub notice: Option<String>,
}

/// Cart items fragment template (for htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Failure acknowledgment for fragment mutations.
///
/// Non-2xx responses are not swapped into the DOM by htmx, so the visible
/// cart state stays exactly as it was.
fn mutation_failed(what: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Html(format!("<span class=\"error\">{what}</span>")),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Query parameters for the cart page.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub notice: Option<String>,
}

/// Display the cart page.
#[instrument(skip(cart_sync, authed))]
pub async fn show(
    RequireUser(authed): RequireUser,
    cart_sync: CartSync,
    axum::extract::Query(query): axum::extract::Query<CartQuery>,
) -> impl IntoResponse {
    match cart_sync.snapshot(&authed.token).await {
        Ok(cart) => CartShowTemplate {
            cart: CartView::from(&cart),
            load_failed: false,
            notice: query.notice,
        },
        Err(e) => {
            tracing::error!("Failed to fetch cart: {e}");
            CartShowTemplate {
                cart: CartView::empty(),
                load_failed: true,
                notice: query.notice,
            }
        }
    }
}

/// Add units of a product to the cart (htmx).
///
/// Returns the refreshed badge so the button's target updates, and fires
/// `cart-updated` for any other badge on the page.
#[instrument(skip(cart_sync, authed), fields(product_id = %form.product_id))]
pub async fn add(
    RequireUser(authed): RequireUser,
    cart_sync: CartSync,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let product_id = ProductId::from(form.product_id);
    let quantity = form.quantity.unwrap_or(1).max(1);

    match cart_sync.add_item(&authed.token, &product_id, quantity).await {
        Ok(count) => {
            add_breadcrumb(
                "cart",
                "Added product to cart",
                Some(&[("product_id", product_id.as_str())]),
            );
            (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartCountTemplate { count },
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            mutation_failed("Could not add to cart")
        }
    }
}

/// Set one line's quantity (htmx).
///
/// A quantity below 1 is ignored without touching the API; the minus
/// button bottoms out at one and removal has its own control.
#[instrument(skip(cart_sync, authed), fields(product_id = %form.product_id, quantity = form.quantity))]
pub async fn update(
    RequireUser(authed): RequireUser,
    cart_sync: CartSync,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    if form.quantity < 1 {
        tracing::debug!("ignoring quantity update below 1");
        return StatusCode::NO_CONTENT.into_response();
    }

    let product_id = ProductId::from(form.product_id);

    match cart_sync
        .set_quantity(&authed.token, &product_id, form.quantity)
        .await
    {
        Ok(cart) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from(&cart),
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update cart quantity: {e}");
            mutation_failed("Could not update quantity")
        }
    }
}

/// Remove one line from the cart (htmx).
#[instrument(skip(cart_sync, authed), fields(product_id = %form.product_id))]
pub async fn remove(
    RequireUser(authed): RequireUser,
    cart_sync: CartSync,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let product_id = ProductId::from(form.product_id);

    match cart_sync.remove_item(&authed.token, &product_id).await {
        Ok(cart) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from(&cart),
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to remove from cart: {e}");
            mutation_failed("Could not remove item")
        }
    }
}

/// Cart count badge fragment (htmx).
///
/// Served from the cached count; never hits the API. Anonymous and fresh
/// sessions read zero.
#[instrument(skip(cart_sync))]
pub async fn count(cart_sync: CartSync) -> impl IntoResponse {
    CartCountTemplate {
        count: cart_sync.count().await,
    }
}
