//! Tumbletop Core - Shared types library.
//!
//! This crate provides common types used across all Tumbletop components:
//! - `storefront` - Public-facing toy store
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no sessions,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails,
//!   credentials, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
