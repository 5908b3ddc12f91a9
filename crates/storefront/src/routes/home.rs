//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::routes::products::{CategoryView, ProductCardView};
use crate::shop::types::ProductFilter;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Featured products for the carousel strip.
    pub featured: Vec<ProductCardView>,
    /// Category tiles under the hero.
    pub categories: Vec<CategoryView>,
}

/// Display the home page.
///
/// Either section failing renders as empty rather than erroring the whole
/// page; the hero and navigation still work.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let featured_filter = ProductFilter::featured();
    let (featured, categories) = tokio::join!(
        state.shop().products(&featured_filter),
        state.shop().categories()
    );

    let featured = featured.map_or_else(
        |e| {
            tracing::error!("Failed to fetch featured products: {e}");
            Vec::new()
        },
        |products| products.iter().map(ProductCardView::from).collect(),
    );

    let categories = categories.map_or_else(
        |e| {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        },
        |categories| categories.iter().map(CategoryView::from).collect(),
    );

    HomeTemplate {
        featured,
        categories,
    }
}
