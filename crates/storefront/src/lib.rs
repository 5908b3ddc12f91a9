//! Tumbletop storefront library.
//!
//! The storefront is a server-rendered front for an external commerce API:
//! it holds each visitor's bearer credential in their session, resolves
//! identity per request, caches a cart badge count, and renders every page
//! from fresh API reads. Exposed as a library so the end-to-end tests can
//! drive the real router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shop;
pub mod state;

use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the commerce API.
async fn health() -> &'static str {
    "ok"
}

/// Build the full application router: pages, fragments, static assets,
/// session layer, and security headers.
///
/// Sentry layers are added by the binary; tests run the router without
/// them.
pub fn build_router(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(&state.config().static_dir))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
