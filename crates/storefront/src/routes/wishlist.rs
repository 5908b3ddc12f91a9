//! Wishlist route handlers.
//!
//! Saved products render with the shared product card. Add and remove are
//! plain form posts that bounce back with a notice; saving a product twice
//! is a no-op on the API side.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;
use tumbletop_core::ProductId;

use crate::filters;
use crate::middleware::RequireUser;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

// =============================================================================
// Form / Query Types
// =============================================================================

/// Wishlist mutation form data, shared by add and remove.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: String,
}

/// Query parameters for the wishlist page.
#[derive(Debug, Deserialize)]
pub struct WishlistQuery {
    pub notice: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub products: Vec<ProductCardView>,
    pub load_failed: bool,
    pub notice: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the wishlist page.
#[instrument(skip(state, authed))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(authed): RequireUser,
    Query(query): Query<WishlistQuery>,
) -> impl IntoResponse {
    match state.shop().wishlist(&authed.token).await {
        Ok(wishlist) => WishlistTemplate {
            products: wishlist.products.iter().map(ProductCardView::from).collect(),
            load_failed: false,
            notice: query.notice,
        },
        Err(e) => {
            tracing::error!("Failed to fetch wishlist: {e}");
            WishlistTemplate {
                products: Vec::new(),
                load_failed: true,
                notice: query.notice,
            }
        }
    }
}

/// Save a product to the wishlist, then return to its detail page.
#[instrument(skip(state, authed), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(authed): RequireUser,
    Form(form): Form<WishlistForm>,
) -> Response {
    let product_id = ProductId::from(form.product_id);

    match state.shop().add_to_wishlist(&authed.token, &product_id).await {
        Ok(()) => Redirect::to(&format!(
            "/products/{product_id}?notice=Added%20to%20wishlist"
        ))
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to add to wishlist: {e}");
            Redirect::to(&format!(
                "/products/{product_id}?notice=Could%20not%20add%20to%20wishlist"
            ))
            .into_response()
        }
    }
}

/// Drop a product from the wishlist, then re-render the list.
#[instrument(skip(state, authed), fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(authed): RequireUser,
    Form(form): Form<WishlistForm>,
) -> Response {
    let product_id = ProductId::from(form.product_id);

    match state
        .shop()
        .remove_from_wishlist(&authed.token, &product_id)
        .await
    {
        Ok(()) => Redirect::to("/wishlist?notice=Removed%20from%20wishlist").into_response(),
        Err(e) => {
            tracing::error!("Failed to remove from wishlist: {e}");
            Redirect::to("/wishlist?notice=Could%20not%20remove%20item").into_response()
        }
    }
}
