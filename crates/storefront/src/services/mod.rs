//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `session` - Credential storage and per-request identity resolution
//! - `cart` - Cart mutations and the cached badge count
//!
//! Both are thin request-scoped handles, constructed by extractors in
//! `crate::middleware::auth` and safe to build as many times per request
//! as needed. They share state only through the session itself.

pub mod cart;
pub mod session;

pub use cart::CartSync;
pub use session::SessionStore;
