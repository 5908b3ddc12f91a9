//! Credential storage and per-request identity resolution.
//!
//! The session is the only durable home of the API bearer token, and this
//! service is the only code that writes it. Everything else receives the
//! token by value from a resolved [`SessionState`] and passes it to
//! [`ShopClient`] calls explicitly.

use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;

use tumbletop_core::AccessToken;

use crate::models::session::{AuthedUser, CurrentUser, SessionState, keys};
use crate::shop::{AuthResponse, ShopClient};

/// Read the auth epoch, defaulting to zero for fresh sessions.
pub(crate) async fn read_epoch(session: &Session) -> u64 {
    session
        .get::<u64>(keys::AUTH_EPOCH)
        .await
        .ok()
        .flatten()
        .unwrap_or(0)
}

/// Advance the auth epoch by one.
///
/// Every identity transition moves the epoch forward, never back, so a
/// cart count fetched before the transition can be told apart from one
/// fetched after it.
pub(crate) async fn bump_epoch(session: &Session) -> Result<(), SessionError> {
    let next = read_epoch(session).await + 1;
    session.insert(keys::AUTH_EPOCH, next).await
}

/// Request-scoped handle over the session's credential slot.
#[derive(Clone)]
pub struct SessionStore {
    session: Session,
    shop: ShopClient,
}

impl SessionStore {
    /// Create a store over one request's session.
    #[must_use]
    pub const fn new(session: Session, shop: ShopClient) -> Self {
        Self { session, shop }
    }

    /// Establish who the visitor is.
    ///
    /// No stored token means anonymous, with no identity request issued.
    /// A stored token is verified against `GET /api/auth/me`; any failure
    /// discards the token and the visitor continues anonymously. Pages
    /// never see an error from this, only one of the two states.
    pub async fn resolve(&self) -> SessionState {
        let token: Option<AccessToken> = self
            .session
            .get(keys::ACCESS_TOKEN)
            .await
            .ok()
            .flatten();

        let Some(token) = token else {
            return SessionState::Anonymous;
        };

        match self.shop.current_user(&token).await {
            Ok(user) => SessionState::Authenticated(AuthedUser {
                user: CurrentUser::from(user),
                token,
            }),
            Err(e) => {
                tracing::debug!("stored credential failed verification, dropping it: {e}");
                self.discard_credential().await;
                SessionState::Anonymous
            }
        }
    }

    /// Store the credential from a successful login or registration.
    ///
    /// Rotates the session ID, saves the token, and advances the auth
    /// epoch so any cart count still in flight for the previous identity
    /// gets dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write. Login must
    /// not appear to succeed without a saved credential.
    pub async fn login(&self, auth: AuthResponse) -> Result<AuthedUser, SessionError> {
        self.session.cycle_id().await?;
        self.session
            .insert(keys::ACCESS_TOKEN, &auth.access_token)
            .await?;
        bump_epoch(&self.session).await?;

        Ok(AuthedUser {
            user: CurrentUser::from(auth.user),
            token: auth.access_token,
        })
    }

    /// Drop the credential and reset cart state.
    ///
    /// The badge count goes straight to zero rather than waiting for a
    /// refresh, and the epoch advances so in-flight refreshes for the old
    /// identity can't resurrect it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.session
            .remove::<AccessToken>(keys::ACCESS_TOKEN)
            .await?;
        self.session.insert(keys::CART_COUNT, &0_u32).await?;
        bump_epoch(&self.session).await?;
        self.session.cycle_id().await?;
        Ok(())
    }

    /// Best-effort cleanup after a stored token failed verification.
    ///
    /// Failures are logged and swallowed; the caller is already on the
    /// anonymous path and a leftover bad token just repeats this dance on
    /// the next request.
    async fn discard_credential(&self) {
        if let Err(e) = self
            .session
            .remove::<AccessToken>(keys::ACCESS_TOKEN)
            .await
        {
            tracing::warn!("failed to remove rejected credential from session: {e}");
        }
        if let Err(e) = self.session.insert(keys::CART_COUNT, &0_u32).await {
            tracing::warn!("failed to reset cart count in session: {e}");
        }
        if let Err(e) = bump_epoch(&self.session).await {
            tracing::warn!("failed to advance auth epoch: {e}");
        }
    }
}
