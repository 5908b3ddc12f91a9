//! Shared test harness: an in-process mock of the commerce API plus a
//! running storefront wired to it.
//!
//! The mock keeps carts, wishlists, and orders in memory and counts hits
//! per endpoint so tests can assert which backend calls a flow did (and
//! did not) make. Each test spawns its own backend and storefront pair on
//! ephemeral ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};
use tumbletop_storefront::config::{ShopConfig, StorefrontConfig};
use tumbletop_storefront::state::AppState;

// =============================================================================
// Mock Backend State
// =============================================================================

#[derive(Clone)]
struct MockUser {
    id: String,
    email: String,
    password: String,
    name: String,
}

#[derive(Clone)]
struct MockProduct {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: f64,
    category: &'static str,
    stock: u32,
    featured: bool,
}

/// Per-endpoint hit counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hits {
    /// `GET /api/auth/me`
    pub me: usize,
    /// `GET /api/cart`
    pub cart_reads: usize,
    /// `POST /api/cart`, `PUT/DELETE /api/cart/{id}`
    pub cart_writes: usize,
    /// `POST /api/orders`
    pub order_posts: usize,
}

struct BackendState {
    users: Vec<MockUser>,
    /// token -> user id
    tokens: HashMap<String, String>,
    /// user id -> (product id, quantity), insertion order
    carts: HashMap<String, Vec<(String, u32)>>,
    /// user id -> product ids
    wishlists: HashMap<String, Vec<String>>,
    /// user id -> order documents
    orders: HashMap<String, Vec<Value>>,
    products: Vec<MockProduct>,
    next_token: u32,
    next_order: u32,
    fail_cart_writes: bool,
    hits: Hits,
}

impl BackendState {
    fn seeded() -> Self {
        Self {
            users: vec![MockUser {
                id: "u-1".to_string(),
                email: "ada@example.com".to_string(),
                password: "train123".to_string(),
                name: "Ada Lovelace".to_string(),
            }],
            tokens: HashMap::new(),
            carts: HashMap::new(),
            wishlists: HashMap::new(),
            orders: HashMap::new(),
            products: vec![
                MockProduct {
                    id: "p-1",
                    name: "Wooden Train",
                    description: "A classic push-along wooden train.",
                    price: 10.00,
                    category: "Vehicles",
                    stock: 8,
                    featured: true,
                },
                MockProduct {
                    id: "p-2",
                    name: "Plush Octopus",
                    description: "Eight soft arms to hug with.",
                    price: 5.50,
                    category: "Plush",
                    stock: 15,
                    featured: false,
                },
            ],
            next_token: 0,
            next_order: 0,
            fail_cart_writes: false,
            hits: Hits::default(),
        }
    }

    fn issue_token(&mut self, user_id: &str) -> String {
        self.next_token += 1;
        let token = format!("tok-{}", self.next_token);
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }

    fn user_for_token(&self, headers: &HeaderMap) -> Option<MockUser> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))?;
        let user_id = self.tokens.get(token)?;
        self.users.iter().find(|u| &u.id == user_id).cloned()
    }

    fn product(&self, id: &str) -> Option<MockProduct> {
        self.products.iter().find(|p| p.id == id).cloned()
    }
}

fn product_json(p: &MockProduct) -> Value {
    json!({
        "id": p.id,
        "name": p.name,
        "description": p.description,
        "price": p.price,
        "category": p.category,
        "stock": p.stock,
        "image": format!("https://cdn.example.com/{}.jpg", p.id),
        "featured": p.featured,
        "age_range": "3-5 years",
        "created_at": "2025-01-01T00:00:00+00:00",
    })
}

fn user_json(u: &MockUser) -> Value {
    json!({
        "id": u.id,
        "email": u.email,
        "name": u.name,
        "created_at": "2025-01-01T00:00:00+00:00",
    })
}

fn auth_json(u: &MockUser, token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "user": user_json(u),
    })
}

fn cart_json(state: &BackendState, user_id: &str) -> Value {
    let items: Vec<Value> = state
        .carts
        .get(user_id)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|(product_id, quantity)| {
            json!({
                "product_id": product_id,
                "quantity": quantity,
                "product": state.product(product_id).as_ref().map(product_json),
            })
        })
        .collect();
    json!({
        "user_id": user_id,
        "items": items,
        "updated_at": "2025-06-01T00:00:00+00:00",
    })
}

fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

fn ack(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "message": message })))
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> std::sync::MutexGuard<'_, BackendState> {
    state.lock().unwrap()
}

// =============================================================================
// Mock Backend Handlers
// =============================================================================

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if s.users.iter().any(|u| u.email == email) {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let user = MockUser {
        id: format!("u-{}", s.users.len() + 1),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        name: body["name"].as_str().unwrap_or_default().to_string(),
    };
    s.users.push(user.clone());
    let token = s.issue_token(&user.id);
    (StatusCode::OK, Json(auth_json(&user, &token)))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let Some(user) = s
        .users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned()
    else {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    };
    let token = s.issue_token(&user.id);
    (StatusCode::OK, Json(auth_json(&user, &token)))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    s.hits.me += 1;
    match s.user_for_token(&headers) {
        Some(user) => (StatusCode::OK, Json(user_json(&user))),
        None => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn products(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let s = lock(&state);
    let category = query.get("category");
    let featured = query.get("featured").is_some_and(|v| v == "true");
    let listed: Vec<Value> = s
        .products
        .iter()
        .filter(|p| category.is_none_or(|c| p.category == c.as_str()))
        .filter(|p| !featured || p.featured)
        .map(product_json)
        .collect();
    Json(Value::Array(listed))
}

async fn product_by_id(
    State(state): State<Shared>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let s = lock(&state);
    match s.product(&id) {
        Some(p) => (StatusCode::OK, Json(product_json(&p))),
        None => detail(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn categories(State(state): State<Shared>) -> Json<Value> {
    let s = lock(&state);
    let mut names: Vec<&str> = s.products.iter().map(|p| p.category).collect();
    names.dedup();
    let listed: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "id": format!("c-{}", i + 1),
                "name": name,
                "image": format!("https://cdn.example.com/cat-{}.jpg", i + 1),
            })
        })
        .collect();
    Json(Value::Array(listed))
}

async fn cart_get(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    s.hits.cart_reads += 1;
    match s.user_for_token(&headers) {
        Some(user) => (StatusCode::OK, Json(cart_json(&s, &user.id))),
        None => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn cart_add(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    s.hits.cart_writes += 1;
    if s.fail_cart_writes {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Cart service unavailable");
    }
    let Some(user) = s.user_for_token(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    let product_id = body["product_id"].as_str().unwrap_or_default().to_string();
    if s.product(&product_id).is_none() {
        return detail(StatusCode::NOT_FOUND, "Product not found");
    }
    let quantity = u32::try_from(body["quantity"].as_u64().unwrap_or(1)).unwrap_or(1);
    let lines = s.carts.entry(user.id).or_default();
    if let Some(line) = lines.iter_mut().find(|(id, _)| *id == product_id) {
        line.1 += quantity;
    } else {
        lines.push((product_id, quantity));
    }
    ack("Item added to cart")
}

async fn cart_update(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    s.hits.cart_writes += 1;
    if s.fail_cart_writes {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Cart service unavailable");
    }
    let Some(user) = s.user_for_token(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    let quantity: u32 = query
        .get("quantity")
        .and_then(|q| q.parse().ok())
        .unwrap_or(1);
    let lines = s.carts.entry(user.id).or_default();
    if let Some(line) = lines.iter_mut().find(|(id, _)| *id == product_id) {
        line.1 = quantity;
        ack("Cart updated")
    } else {
        detail(StatusCode::NOT_FOUND, "Item not in cart")
    }
}

async fn cart_remove(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    s.hits.cart_writes += 1;
    if s.fail_cart_writes {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Cart service unavailable");
    }
    let Some(user) = s.user_for_token(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    let lines = s.carts.entry(user.id).or_default();
    lines.retain(|(id, _)| *id != product_id);
    ack("Item removed from cart")
}

async fn wishlist_get(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let s = lock(&state);
    let Some(user) = s.user_for_token(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    let items = s
        .wishlists
        .get(&user.id)
        .cloned()
        .unwrap_or_default();
    let products: Vec<Value> = items
        .iter()
        .filter_map(|id| s.product(id))
        .map(|p| product_json(&p))
        .collect();
    (
        StatusCode::OK,
        Json(json!({ "user_id": user.id, "items": items, "products": products })),
    )
}

async fn wishlist_add(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    let Some(user) = s.user_for_token(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    if s.product(&product_id).is_none() {
        return detail(StatusCode::NOT_FOUND, "Product not found");
    }
    let saved = s.wishlists.entry(user.id).or_default();
    if !saved.contains(&product_id) {
        saved.push(product_id);
    }
    ack("Added to wishlist")
}

async fn wishlist_remove(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    let Some(user) = s.user_for_token(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    s.wishlists.entry(user.id).or_default().retain(|id| *id != product_id);
    ack("Removed from wishlist")
}

async fn orders_get(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let s = lock(&state);
    let Some(user) = s.user_for_token(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    let listed = s.orders.get(&user.id).cloned().unwrap_or_default();
    (StatusCode::OK, Json(Value::Array(listed)))
}

async fn orders_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut s = lock(&state);
    s.hits.order_posts += 1;
    let Some(user) = s.user_for_token(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };

    let items = body["items"].as_array().cloned().unwrap_or_default();
    let total: f64 = items
        .iter()
        .map(|item| {
            item["price"].as_f64().unwrap_or(0.0) * item["quantity"].as_f64().unwrap_or(0.0)
        })
        .sum();

    s.next_order += 1;
    let order = json!({
        "id": format!("o-{}", s.next_order),
        "user_id": user.id,
        "items": items,
        "total": total,
        "status": "pending",
        "payment_id": null,
        "shipping_address": body["shipping_address"],
        "created_at": "2025-06-02T00:00:00+00:00",
    });
    s.orders.entry(user.id.clone()).or_default().push(order.clone());
    // Placing an order empties the cart server-side.
    s.carts.remove(&user.id);
    (StatusCode::OK, Json(order))
}

// =============================================================================
// Backend Handle
// =============================================================================

/// Handle over a running mock commerce API.
#[derive(Clone)]
pub struct Backend {
    state: Shared,
    pub addr: SocketAddr,
}

impl Backend {
    async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState::seeded()));

        let router = Router::new()
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/products", get(products))
            .route("/api/products/{id}", get(product_by_id))
            .route("/api/categories", get(categories))
            .route("/api/cart", get(cart_get).post(cart_add))
            .route(
                "/api/cart/{product_id}",
                axum::routing::put(cart_update).delete(cart_remove),
            )
            .route("/api/wishlist", get(wishlist_get))
            .route(
                "/api/wishlist/{product_id}",
                post(wishlist_add).delete(wishlist_remove),
            )
            .route("/api/orders", get(orders_get).post(orders_post))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { state, addr }
    }

    /// Snapshot of the per-endpoint hit counters.
    pub fn hits(&self) -> Hits {
        lock(&self.state).hits
    }

    /// Invalidate every issued token, as a backend restart or token expiry
    /// would.
    pub fn revoke_all_tokens(&self) {
        lock(&self.state).tokens.clear();
    }

    /// Make every cart write fail with a 500 until turned off again.
    pub fn set_fail_cart_writes(&self, fail: bool) {
        lock(&self.state).fail_cart_writes = fail;
    }
}

// =============================================================================
// TestApp
// =============================================================================

/// A storefront under test: the real router served over a local socket,
/// talking to its own mock backend, driven by a cookie-keeping client.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub backend: Backend,
}

impl TestApp {
    /// Boot a backend and a storefront wired to it.
    pub async fn spawn() -> Self {
        let backend = Backend::spawn().await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").into(),
            shop: ShopConfig {
                api_base_url: format!("http://{}", backend.addr).parse().unwrap(),
                timeout: std::time::Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let app = tumbletop_storefront::build_router(AppState::new(config));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Redirects are asserted on, not followed; the cookie store keeps
        // the session across requests.
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base_url: format!("http://{addr}"),
            client,
            backend,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Sign in as the seeded account and assert it worked.
    pub async fn sign_in(&self) -> reqwest::Response {
        let response = self
            .post_form(
                "/auth/login",
                &[("email", "ada@example.com"), ("password", "train123")],
            )
            .await;
        assert_eq!(response.status(), 303, "login should redirect home");
        response
    }

    /// Add units of a product through the storefront and assert success.
    pub async fn add_to_cart(&self, product_id: &str, quantity: u32) {
        let quantity = quantity.to_string();
        let response = self
            .post_form(
                "/cart/add",
                &[("product_id", product_id), ("quantity", &quantity)],
            )
            .await;
        assert_eq!(response.status(), 200, "add to cart should succeed");
    }
}

/// Extract the badge number from a cart count fragment.
pub fn badge_count(fragment: &str) -> u32 {
    let after = fragment
        .split("hx-swap=\"outerHTML\">")
        .nth(1)
        .expect("fragment should contain badge markup");
    let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().expect("badge should contain a number")
}
