//! Domain types for the Tumbletop commerce API.
//!
//! These mirror the JSON documents the backend serves. Identifiers, prices,
//! and credentials use the strong types from `tumbletop_core` so they cannot
//! be mixed up once they cross into the rest of the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tumbletop_core::{AccessToken, CategoryId, Email, OrderId, OrderStatus, Price, ProductId, UserId};

// =============================================================================
// Auth Types
// =============================================================================

/// A customer account as the API reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Account ID.
    pub id: UserId,
    /// Login email.
    pub email: Email,
    /// Display name shown in the storefront header.
    pub name: String,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// Response from login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent authenticated calls.
    pub access_token: AccessToken,
    /// Always `"bearer"`.
    pub token_type: String,
    /// The account the token belongs to.
    pub user: User,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Plaintext password, sent over TLS only.
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Serialize)]
pub struct Registration {
    /// Login email.
    pub email: String,
    /// Plaintext password, sent over TLS only.
    pub password: String,
    /// Display name.
    pub name: String,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A toy in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Category name (categories are keyed by name in product documents).
    pub category: String,
    /// Units in stock.
    pub stock: u32,
    /// Primary image URL.
    pub image: String,
    /// Whether the product appears in the featured carousel.
    #[serde(default)]
    pub featured: bool,
    /// Suggested age range, e.g. `"3-5 years"`.
    #[serde(default)]
    pub age_range: Option<String>,
    /// When the product was added to the catalog.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether at least one unit can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A browsing category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name, also the filter key for product queries.
    pub name: String,
    /// Banner image URL.
    pub image: String,
}

/// Catalog query filter.
///
/// Doubles as the cache key for product list lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    /// Restrict to a category by name.
    pub category: Option<String>,
    /// Restrict to featured products.
    pub featured: bool,
}

impl ProductFilter {
    /// Filter for the featured carousel on the home page.
    #[must_use]
    pub const fn featured() -> Self {
        Self {
            category: None,
            featured: true,
        }
    }

    /// Filter by category name.
    #[must_use]
    pub fn category(name: impl Into<String>) -> Self {
        Self {
            category: Some(name.into()),
            featured: false,
        }
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// A single cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Units of that product.
    pub quantity: u32,
    /// Full product document, populated on cart reads.
    #[serde(default)]
    pub product: Option<Product>,
}

impl CartItem {
    /// Price for the whole line, `$0.00` when the product is unpopulated.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product
            .as_ref()
            .map_or(Price::ZERO, |p| p.price.line_total(self.quantity))
    }
}

/// The server-side cart for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Owning account.
    pub user_id: UserId,
    /// Cart lines, newest last.
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Total units across all lines. This is the number the badge shows.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Body for `POST /api/cart`.
#[derive(Debug, Serialize)]
pub struct CartAdd {
    /// Product to add.
    pub product_id: ProductId,
    /// Units to add on top of any existing line.
    pub quantity: u32,
}

// =============================================================================
// Wishlist Types
// =============================================================================

/// The wishlist for one account, with product documents populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wishlist {
    /// Owning account.
    pub user_id: UserId,
    /// Saved product IDs in insertion order.
    #[serde(default)]
    pub items: Vec<ProductId>,
    /// Product documents for `items`, minus any that left the catalog.
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Wishlist {
    /// Whether a product is already saved.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|id| id == product_id)
    }
}

// =============================================================================
// Order Types
// =============================================================================

/// A line on a placed order. Prices are frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Unit price at order time.
    pub price: Price,
    /// Units ordered.
    pub quantity: u32,
}

impl OrderItem {
    /// Price for the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.quantity)
    }
}

/// Shipping details collected at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Postal code. The API spells this `zipCode`.
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    /// Contact phone number.
    pub phone: String,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Account that placed the order.
    pub user_id: UserId,
    /// Order lines.
    pub items: Vec<OrderItem>,
    /// Grand total as the server computed it.
    pub total: Price,
    /// Fulfilment status.
    pub status: OrderStatus,
    /// Payment reference once the order is paid.
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Where the order ships.
    pub shipping_address: ShippingAddress,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// Body for `POST /api/orders`.
///
/// The server recomputes the total and clears the cart itself.
#[derive(Debug, Serialize)]
pub struct OrderDraft {
    /// Lines copied from the cart at checkout time.
    pub items: Vec<OrderItem>,
    /// Shipping details from the checkout form.
    pub shipping_address: ShippingAddress,
}

// =============================================================================
// Envelope Types
// =============================================================================

///`{"message": ...}` acknowledgement returned by mutations.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    /// Human-readable confirmation.
    pub message: String,
}

/// `{"detail": ...}` body the API attaches to error statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable cause.
    pub detail: String,
}
