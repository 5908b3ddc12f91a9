//! Authentication route handlers.
//!
//! One page, two modes: sign in and create account, toggled by a link.
//! Both successful outcomes run the same session login transition, refresh
//! the cart badge for the new identity, and land on the home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::services::{CartSync, SessionStore};
use crate::shop::types::{AuthResponse, Credentials, Registration};
use crate::shop::ShopError;
use crate::state::AppState;

// =============================================================================
// Form / Query Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Query parameters for the auth page.
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    /// `register` switches the page to account-creation mode.
    pub mode: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Auth page template, shared by both modes.
#[derive(Template, WebTemplate)]
#[template(path = "auth/show.html")]
pub struct AuthTemplate {
    pub register_mode: bool,
    pub error: Option<String>,
    /// Preserved form values on a failed submit.
    pub email: String,
    pub name: String,
}

impl AuthTemplate {
    fn fresh(register_mode: bool) -> Self {
        Self {
            register_mode,
            error: None,
            email: String::new(),
            name: String::new(),
        }
    }
}

/// Header identity fragment template (for htmx).
///
/// Swapped into the nav on every page load, so the header greets the
/// signed-in account and carries the sign-out control, or falls back to
/// the sign-in link.
#[derive(Template, WebTemplate)]
#[template(path = "partials/nav_session.html")]
pub struct NavSessionTemplate {
    pub user_name: Option<String>,
}

/// Pick a message the form can show for a failed credential call.
///
/// The API's `detail` strings ("Invalid email or password", "Email already
/// registered") are written for end users; transport-level failures get a
/// generic line instead.
fn auth_error_message(error: &ShopError) -> String {
    match error {
        ShopError::Unauthorized(detail) | ShopError::Api { detail, .. } => detail.clone(),
        _ => "Authentication failed. Please try again.".to_string(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the auth page. Signed-in visitors have nothing to do here and
/// go home instead.
#[instrument(skip(visitor))]
pub async fn page(
    OptionalUser(visitor): OptionalUser,
    Query(query): Query<AuthQuery>,
) -> Response {
    if visitor.user().is_some() {
        return Redirect::to("/").into_response();
    }

    let register_mode = query.mode.as_deref() == Some("register");
    AuthTemplate::fresh(register_mode).into_response()
}

/// Shared tail of login and registration: store the credential, tag Sentry
/// with the account, refresh the badge for the new identity, go home.
async fn establish_session(
    session: &SessionStore,
    cart_sync: &CartSync,
    auth: AuthResponse,
) -> Response {
    match session.login(auth).await {
        Ok(authed) => {
            set_sentry_user(&authed.user.id, Some(authed.user.email.as_str()));
            cart_sync.refresh(&authed.token).await;
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::error!("Failed to persist credential in session: {e}");
            AuthTemplate {
                register_mode: false,
                error: Some("Could not start your session. Please try again.".to_string()),
                email: String::new(),
                name: String::new(),
            }
            .into_response()
        }
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, cart_sync, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: SessionStore,
    cart_sync: CartSync,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = Credentials {
        email: form.email.clone(),
        password: form.password,
    };

    match state.shop().login(&credentials).await {
        Ok(auth) => establish_session(&session, &cart_sync, auth).await,
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            AuthTemplate {
                register_mode: false,
                error: Some(auth_error_message(&e)),
                email: form.email,
                name: String::new(),
            }
            .into_response()
        }
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, cart_sync, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: SessionStore,
    cart_sync: CartSync,
    Form(form): Form<RegisterForm>,
) -> Response {
    let registration = Registration {
        name: form.name.clone(),
        email: form.email.clone(),
        password: form.password,
    };

    match state.shop().register(&registration).await {
        Ok(auth) => establish_session(&session, &cart_sync, auth).await,
        Err(e) => {
            tracing::warn!("Registration failed: {e}");
            AuthTemplate {
                register_mode: true,
                error: Some(auth_error_message(&e)),
                email: form.email,
                name: form.name,
            }
            .into_response()
        }
    }
}

/// Header identity fragment (htmx).
///
/// Served from the resolved session, same self-loading pattern as the
/// cart badge.
#[instrument(skip(visitor))]
pub async fn nav_session(OptionalUser(visitor): OptionalUser) -> impl IntoResponse {
    NavSessionTemplate {
        user_name: visitor.user().map(|authed| authed.user.name.clone()),
    }
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: SessionStore) -> Response {
    if let Err(e) = session.logout().await {
        tracing::error!("Failed to clear session on logout: {e}");
    }
    clear_sentry_user();
    Redirect::to("/").into_response()
}
