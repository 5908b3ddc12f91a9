//! Session-related types.
//!
//! Only three values ever live in the session: the API credential, the
//! cached cart badge count, and the auth epoch that fences the two
//! together. Identity is re-fetched from the API on every request, never
//! stored.

use serde::{Deserialize, Serialize};

use tumbletop_core::{AccessToken, Email, UserId};

use crate::shop::types::User;

/// The signed-in account as pages see it.
///
/// Rebuilt from `GET /api/auth/me` on each request, so a rename or email
/// change shows up on the next page load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account ID.
    pub id: UserId,
    /// Display name for the header greeting.
    pub name: String,
    /// Account email.
    pub email: Email,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// A resolved identity together with the credential that proved it.
///
/// Handlers that call authenticated endpoints take the token from here,
/// so a call can never run under a different identity than the page it
/// renders for.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    /// The account.
    pub user: CurrentUser,
    /// The bearer token the account was resolved with.
    pub token: AccessToken,
}

/// What the session said about the visitor on this request.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No credential, or the stored one was rejected and discarded.
    Anonymous,
    /// Stored credential verified against the API this request.
    Authenticated(AuthedUser),
}

impl SessionState {
    /// The authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&AuthedUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(authed) => Some(authed),
        }
    }
}

/// Session keys for authentication and cart data.
pub mod keys {
    /// Key for the stored API bearer token.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Key for the cached cart badge count.
    pub const CART_COUNT: &str = "cart_count";

    /// Key for the auth epoch. Bumped on every login, logout, and
    /// credential rejection so cart counts fetched under an older
    /// identity can be recognized and dropped.
    pub const AUTH_EPOCH: &str = "auth_epoch";
}
