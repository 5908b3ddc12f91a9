//! Order history route handler.
//!
//! The account page is the landing spot after checkout; it lists the
//! visitor's orders newest-first with status, lines, and shipping details.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireUser;
use crate::shop::types::{Order, OrderItem};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Order line display data.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            line_total: item.line_total().to_string(),
        }
    }
}

/// Order display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub status: String,
    pub status_label: String,
    pub placed_on: String,
    pub total: String,
    pub items: Vec<OrderItemView>,
    pub recipient: String,
    pub destination: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_str().to_string(),
            // Lowercase label doubles as the badge's CSS class suffix.
            status: order.status.label().to_lowercase(),
            status_label: order.status.label().to_string(),
            placed_on: order.created_at.format("%B %-d, %Y").to_string(),
            total: order.total.to_string(),
            items: order.items.iter().map(OrderItemView::from).collect(),
            recipient: order.shipping_address.name.clone(),
            destination: format!(
                "{}, {} {}",
                order.shipping_address.city,
                order.shipping_address.state,
                order.shipping_address.zip_code
            ),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Query parameters for the account page.
#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub notice: Option<String>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub user_name: String,
    pub orders: Vec<OrderView>,
    pub load_failed: bool,
    pub notice: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the order history page.
#[instrument(skip(state, authed))]
pub async fn orders(
    State(state): State<AppState>,
    RequireUser(authed): RequireUser,
    Query(query): Query<AccountQuery>,
) -> impl IntoResponse {
    let (orders, load_failed) = match state.shop().orders(&authed.token).await {
        Ok(orders) => (orders.iter().map(OrderView::from).collect(), false),
        Err(e) => {
            tracing::error!("Failed to fetch orders: {e}");
            (Vec::new(), true)
        }
    };

    OrdersTemplate {
        user_name: authed.user.name.clone(),
        orders,
        load_failed,
        notice: query.notice,
    }
}
