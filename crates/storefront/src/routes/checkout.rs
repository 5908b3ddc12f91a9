//! Checkout route handlers.
//!
//! A plain form flow: the page shows the shipping form next to an order
//! summary, the submit places the order. An empty cart never reaches the
//! orders endpoint; it bounces back to the cart page with a notice before
//! any request is issued.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireUser;
use crate::routes::cart::CartView;
use crate::services::CartSync;
use crate::shop::types::{Cart, OrderDraft, OrderItem, ShippingAddress};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Shipping form data. Every field is required; validation happens
/// server-side so the guard holds without JavaScript.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingForm {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
}

impl ShippingForm {
    /// Whether every field has a non-blank value.
    fn is_complete(&self) -> bool {
        [
            &self.name,
            &self.address,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.phone,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

impl From<ShippingForm> for ShippingAddress {
    fn from(form: ShippingForm) -> Self {
        Self {
            name: form.name,
            address: form.address,
            city: form.city,
            state: form.state,
            zip_code: form.zip_code,
            phone: form.phone,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub form: ShippingForm,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Order lines copied from the cart, skipping any line whose product has
/// left the catalog since it was added.
fn order_items(cart: &Cart) -> Vec<OrderItem> {
    cart.items
        .iter()
        .filter_map(|item| {
            item.product.as_ref().map(|product| OrderItem {
                product_id: item.product_id.clone(),
                name: product.name.clone(),
                price: product.price,
                quantity: item.quantity,
            })
        })
        .collect()
}

/// Display the checkout page.
///
/// An empty (or unreadable) cart redirects back to the cart page; there is
/// nothing to check out.
#[instrument(skip(cart_sync, authed))]
pub async fn show(RequireUser(authed): RequireUser, cart_sync: CartSync) -> Response {
    match cart_sync.snapshot(&authed.token).await {
        Ok(cart) if cart.is_empty() => {
            Redirect::to("/cart?notice=Your%20cart%20is%20empty").into_response()
        }
        Ok(cart) => CheckoutTemplate {
            cart: CartView::from(&cart),
            form: ShippingForm::default(),
            error: None,
        }
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch cart for checkout: {e}");
            Redirect::to("/cart?notice=Could%20not%20load%20your%20cart").into_response()
        }
    }
}

/// Place the order.
///
/// On success the API clears the cart itself; the badge count is refreshed
/// here and the visitor lands on their order history. On failure the form
/// re-renders with the values preserved and nothing is mutated locally.
#[instrument(skip(state, cart_sync, authed, form))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireUser(authed): RequireUser,
    cart_sync: CartSync,
    Form(form): Form<ShippingForm>,
) -> Response {
    let cart = match cart_sync.snapshot(&authed.token).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!("Failed to fetch cart before placing order: {e}");
            return Redirect::to("/cart?notice=Could%20not%20load%20your%20cart").into_response();
        }
    };

    // Client-side guard: an empty cart never produces an order request.
    if cart.is_empty() {
        return Redirect::to("/cart?notice=Your%20cart%20is%20empty").into_response();
    }

    if !form.is_complete() {
        return CheckoutTemplate {
            cart: CartView::from(&cart),
            form,
            error: Some("Please fill in all fields".to_string()),
        }
        .into_response();
    }

    let draft = OrderDraft {
        items: order_items(&cart),
        shipping_address: form.clone().into(),
    };

    match state.shop().create_order(&authed.token, &draft).await {
        Ok(order) => {
            tracing::info!(order_id = %order.id, "Order placed");
            crate::error::add_breadcrumb(
                "order",
                "Placed order",
                Some(&[("order_id", order.id.as_str())]),
            );
            // The server emptied the cart; bring the badge down with it.
            cart_sync.refresh(&authed.token).await;
            Redirect::to("/account?notice=Order%20placed%20successfully").into_response()
        }
        Err(e) => {
            tracing::error!("Failed to place order: {e}");
            CheckoutTemplate {
                cart: CartView::from(&cart),
                form,
                error: Some("Failed to place order. Please try again.".to_string()),
            }
            .into_response()
        }
    }
}
