//! Authentication route handlers.
//!
//! Login proxies the backend's `POST /login`; the backend answers with the
//! operator profile and sets its credential cookie on the client's jar, and
//! the session manager takes it from there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;

use gavelpoint_core::Email;

use crate::backend::BackendError;
use crate::filters;
use crate::models::UserProfile;
use crate::routes::MessageQuery;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<UserProfile>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the login page.
///
/// An already-logged-in operator is sent to the listing instead.
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Response {
    if state.session().current_user().is_some() {
        return Redirect::to("/auctions").into_response();
    }

    LoginTemplate {
        user: None,
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let email_input = form.email.trim();
    let password = form.password.trim();
    if email_input.is_empty() || password.is_empty() {
        return Redirect::to("/login?error=Please+fill+all+fields!").into_response();
    }

    let Ok(email) = Email::parse(email_input) else {
        return Redirect::to("/login?error=Invalid+email+or+password").into_response();
    };
    let password = SecretString::from(password.to_string());

    match state.backend().login(&email, &password).await {
        Ok(profile) => {
            state.session().login(profile);
            Redirect::to("/auctions").into_response()
        }
        Err(BackendError::Unauthorized { .. }) => {
            Redirect::to("/login?error=Invalid+email+or+password").into_response()
        }
        Err(BackendError::Validation { .. }) => {
            Redirect::to("/login?error=Fill+all+fields").into_response()
        }
        Err(e) if e.is_connectivity() => {
            tracing::warn!(error = %e, "login failed: backend unreachable");
            Redirect::to("/login?error=Network+error.+Please+check+your+connection.")
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "login failed");
            Redirect::to("/login?error=Something+went+wrong").into_response()
        }
    }
}

/// Handle logout.
///
/// Asks the backend to expire its credential cookie (best effort), clears
/// the process session, and returns to the landing page.
pub async fn logout(State(state): State<AppState>) -> Redirect {
    if let Err(e) = state.backend().logout().await {
        tracing::warn!(error = %e, "backend logout failed; clearing session anyway");
    }
    state.session().logout();
    Redirect::to("/")
}
