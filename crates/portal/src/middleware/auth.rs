//! Authentication extractors.
//!
//! Route guards over the process session. The portal holds one session, so
//! gating is a read of [`SessionManager::current_user`] rather than a
//! per-request cookie lookup.
//!
//! [`SessionManager::current_user`]: crate::session::SessionManager::current_user

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::models::UserProfile;
use crate::state::AppState;

/// Extractor that requires a logged-in operator.
///
/// If nobody is logged in, redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub UserProfile);

/// Extractor that requires a logged-in admin.
///
/// Logged-out requests go to the login page; logged-in non-admins are sent
/// back to the landing page.
pub struct RequireAdmin(pub UserProfile);

/// Rejection for the auth extractors.
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// Redirect to the landing page (authenticated but not allowed).
    RedirectHome,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::RedirectHome => Redirect::to("/").into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        app.session()
            .current_user()
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let user = app
            .session()
            .current_user()
            .ok_or(AuthRejection::RedirectToLogin)?;

        if user.is_admin() {
            Ok(Self(user))
        } else {
            Err(AuthRejection::RedirectHome)
        }
    }
}

/// Extractor that optionally gets the current operator.
///
/// Unlike `RequireAuth`, this never rejects; used by pages with auth-aware
/// chrome (navbar links, greetings).
pub struct OptionalAuth(pub Option<UserProfile>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        Ok(Self(app.session().current_user()))
    }
}
