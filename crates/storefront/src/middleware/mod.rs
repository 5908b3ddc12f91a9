//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)
//! 4. Security headers (CSP, isolation, no-store)
//! 5. Rate limiting (governor, auth and fragment routes only)

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
pub mod session;

pub use auth::{AuthRejection, OptionalUser, RequireUser};
pub use rate_limit::{auth_rate_limiter, fragment_rate_limiter};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
