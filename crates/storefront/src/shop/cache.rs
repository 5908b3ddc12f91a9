//! Cache types for catalog responses.
//!
//! Only the public catalog is cached. Carts, wishlists, and orders are
//! per-account state and always read fresh.

use crate::shop::types::{Category, Product, ProductFilter};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products(ProductFilter),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
}
