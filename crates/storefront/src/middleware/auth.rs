//! Authentication extractors and service wiring.
//!
//! Handlers never build [`SessionStore`] or [`CartSync`] themselves; they
//! take them as extractor arguments and the impls here assemble them from
//! the session and the shared [`ShopClient`]. That keeps construction in
//! one place and makes handlers trivial to exercise through the router.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::session::{AuthedUser, SessionState};
use crate::services::{CartSync, SessionStore};
use crate::state::AppState;

/// Extractor that requires a signed-in visitor.
///
/// Resolves the stored credential against the API. Anonymous visitors are
/// redirected to the sign-in page; htmx fragment requests instead get a
/// 401 with an `HX-Redirect` header so the browser navigates as a whole
/// rather than splicing the sign-in page into the DOM.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(
///     RequireUser(authed): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", authed.user.name)
/// }
/// ```
pub struct RequireUser(pub AuthedUser);

/// Extractor that resolves the visitor without requiring sign-in.
///
/// # Example
///
/// ```rust,ignore
/// async fn home(
///     OptionalUser(visitor): OptionalUser,
/// ) -> impl IntoResponse {
///     match visitor.user() {
///         Some(authed) => format!("Hello, {}!", authed.user.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalUser(pub SessionState);

/// Rejection for requests that cannot proceed without authentication.
pub enum AuthRejection {
    /// Redirect to the sign-in page (full page loads).
    RedirectToLogin,
    /// 401 plus `HX-Redirect` (htmx fragment requests).
    FragmentUnauthorized,
    /// The session layer is missing from the middleware stack.
    MissingSessionLayer,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth").into_response(),
            Self::FragmentUnauthorized => {
                (StatusCode::UNAUTHORIZED, [("HX-Redirect", "/auth")]).into_response()
            }
            Self::MissingSessionLayer => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Pick the rejection shape that matches how the request was made.
fn unauthenticated_rejection(parts: &Parts) -> AuthRejection {
    if parts.headers.contains_key("hx-request") {
        AuthRejection::FragmentUnauthorized
    } else {
        AuthRejection::RedirectToLogin
    }
}

/// Pull the session out of the request extensions.
fn session_from(parts: &Parts) -> Result<Session, AuthRejection> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(AuthRejection::MissingSessionLayer)
}

impl FromRequestParts<AppState> for SessionStore {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session_from(parts)?;
        Ok(Self::new(session, state.shop().clone()))
    }
}

impl FromRequestParts<AppState> for CartSync {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session_from(parts)?;
        Ok(Self::new(session, state.shop().clone()))
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let store = SessionStore::from_request_parts(parts, state).await?;

        match store.resolve().await {
            SessionState::Authenticated(authed) => Ok(Self(authed)),
            SessionState::Anonymous => Err(unauthenticated_rejection(parts)),
        }
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let visitor = match parts.extensions.get::<Session>() {
            Some(session) => {
                SessionStore::new(session.clone(), state.shop().clone())
                    .resolve()
                    .await
            }
            None => SessionState::Anonymous,
        };

        Ok(Self(visitor))
    }
}
