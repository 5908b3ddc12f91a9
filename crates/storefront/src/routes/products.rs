//! Catalog route handlers: product listing and product detail.
//!
//! Both pages are public. Listing failures render an inline error state
//! instead of a 5xx so the shop stays browsable around a flaky API; an
//! unknown product id redirects back to the listing with a notice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;
use tumbletop_core::ProductId;

use crate::error;
use crate::filters;
use crate::shop::ShopError;
use crate::shop::types::{Category, Product, ProductFilter};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Product display data for grid cards. Shared with the home and wishlist
/// pages, which render the same card.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: String,
    pub category: String,
    pub in_stock: bool,
    pub featured: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_str().to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            image: product.image.clone(),
            category: product.category.clone(),
            in_stock: product.in_stock(),
            featured: product.featured,
        }
    }
}

/// Category display data for the filter chip row and home page tiles.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub image: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            image: category.image.clone(),
        }
    }
}

/// Full product display data for the detail page.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub stock: u32,
    pub image: String,
    pub featured: bool,
    pub age_range: Option<String>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_str().to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            stock: product.stock,
            image: product.image.clone(),
            featured: product.featured,
            age_range: product.age_range.clone(),
        }
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the listing page.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    /// Category name to filter by.
    pub category: Option<String>,
    /// One-shot acknowledgment banner text.
    pub notice: Option<String>,
}

/// Query parameters for the detail page.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub notice: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
    pub active_category: Option<String>,
    pub load_failed: bool,
    pub notice: Option<String>,
}

impl ProductsTemplate {
    /// Whether a category chip matches the active filter.
    fn is_active(&self, name: &str) -> bool {
        self.active_category.as_deref() == Some(name)
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub notice: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product listing, optionally filtered by category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let filter = query
        .category
        .as_deref()
        .map_or_else(ProductFilter::default, ProductFilter::category);

    // The grid and the chip row are independent reads; fetch them together.
    let (products, categories) =
        tokio::join!(state.shop().products(&filter), state.shop().categories());

    let categories = categories.map_or_else(
        |e| {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        },
        |categories| categories.iter().map(CategoryView::from).collect(),
    );

    let (products, load_failed) = match products {
        Ok(products) => (products.iter().map(ProductCardView::from).collect(), false),
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            (Vec::new(), true)
        }
    };

    ProductsTemplate {
        products,
        categories,
        active_category: query.category,
        load_failed,
        notice: query.notice,
    }
}

/// Display a single product.
///
/// An unknown id bounces back to the listing; any other failure is a real
/// error and surfaces as one.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> error::Result<Response> {
    let product_id = ProductId::from(id);

    match state.shop().product(&product_id).await {
        Ok(product) => Ok(ProductShowTemplate {
            product: ProductDetailView::from(&product),
            notice: query.notice,
        }
        .into_response()),
        Err(ShopError::NotFound(_)) => {
            tracing::debug!("product {product_id} not in catalog");
            Ok(Redirect::to("/products?notice=Product%20not%20found").into_response())
        }
        Err(e) => Err(e.into()),
    }
}
