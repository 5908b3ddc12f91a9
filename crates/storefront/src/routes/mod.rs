//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog (public)
//! GET  /products               - Product listing (?category= filter)
//! GET  /products/{id}          - Product detail
//!
//! # Cart (requires auth; mutations are htmx fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (public; cached, 0 when anonymous)
//! GET  /nav/session            - Header identity fragment (greeting + sign out, or sign-in link)
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Shipping form + order summary
//! POST /checkout               - Place order
//!
//! # Wishlist (requires auth)
//! GET  /wishlist               - Saved products
//! POST /wishlist/add           - Save a product
//! POST /wishlist/remove        - Drop a product
//!
//! # Account (requires auth)
//! GET  /account                - Order history
//!
//! # Auth (rate limited)
//! GET  /auth                   - Sign in / create account (?mode=register)
//! POST /auth/login             - Login action
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, fragment_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
///
/// The credential endpoints carry the strict per-IP rate limit.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::page))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
///
/// Fragment endpoints get the relaxed limiter sized for click bursts.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .layer(fragment_rate_limiter())
}

/// Create the header fragment routes router.
///
/// Self-loading nav fragments fire on every page load, so they share the
/// relaxed limiter with the cart badge rather than the strict auth one.
pub fn nav_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(auth::nav_session))
        .layer(fragment_rate_limiter())
}

/// Create the main application router with all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/add", post(wishlist::add))
        .route("/wishlist/remove", post(wishlist::remove))
        .route("/account", get(account::orders))
        .nest("/cart", cart_routes())
        .nest("/nav", nav_routes())
        .nest("/auth", auth_routes())
}
