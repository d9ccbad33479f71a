//! User management route handlers (admin dashboard).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use gavelpoint_core::UserId;

use crate::backend::BackendError;
use crate::backend::types::{NewUser, UserRecord, UserUpdate};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::UserProfile;
use crate::routes::MessageQuery;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Create-user form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub dob: String,
    pub password: String,
}

/// Edit-user form data.
#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub name: String,
    pub email: String,
    pub dob: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// User table template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/users.html")]
pub struct UsersTemplate {
    pub user: Option<UserProfile>,
    pub admin_name: String,
    pub users: Vec<UserRecord>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Edit-user form template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/edit_user.html")]
pub struct EditUserTemplate {
    pub user: Option<UserProfile>,
    pub admin_name: String,
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    /// Normalized `YYYY-MM-DD` for the date input.
    pub dob: String,
    pub error: Option<String>,
}

/// Create-user form template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/register.html")]
pub struct RegisterTemplate {
    pub user: Option<UserProfile>,
    pub admin_name: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the user table.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Result<UsersTemplate> {
    let (users, error) = match state.backend().users().await {
        Ok(users) => (users, query.error),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch users");
            (Vec::new(), Some("Failed to fetch users!".to_string()))
        }
    };

    Ok(UsersTemplate {
        admin_name: admin.name.clone(),
        user: Some(admin),
        users,
        error,
        success: query.success,
    })
}

/// Display the edit form, pre-filled from the backend.
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Response> {
    let id = UserId::new(id);
    let record = match state.backend().user(id).await {
        Ok(record) => record,
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(BackendError::NotFound { .. }) => {
            return Ok(Redirect::to("/dashboard/users?error=User+not+found").into_response());
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch user");
            return Ok(
                Redirect::to("/dashboard/users?error=Something+went+wrong!").into_response(),
            );
        }
    };

    Ok(EditUserTemplate {
        admin_name: admin.name.clone(),
        user: Some(admin),
        user_id: id,
        name: record.username,
        email: record.email,
        dob: dob_input_value(record.dob.as_deref()),
        error: None,
    }
    .into_response())
}

/// Handle the edit form submission.
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
    Form(form): Form<EditForm>,
) -> Result<Redirect> {
    let update = UserUpdate {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        dob: form.dob.trim().to_string(),
        password: form.password,
    };

    match state.backend().update_user(UserId::new(id), &update).await {
        Ok(()) => Ok(Redirect::to(
            "/dashboard/users?success=User+edited+successfully!",
        )),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(BackendError::Validation { message }) => Ok(redirect_with_error(
            &format!("/dashboard/users/{id}/edit"),
            &message,
        )),
        Err(e) => {
            tracing::warn!(error = %e, "failed to update user");
            Ok(redirect_with_error(
                &format!("/dashboard/users/{id}/edit"),
                "Something went wrong!",
            ))
        }
    }
}

/// Handle a delete action.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Redirect> {
    match state.backend().delete_user(UserId::new(id)).await {
        Ok(()) => Ok(Redirect::to(
            "/dashboard/users?success=User+deleted+successfully!",
        )),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to delete user");
            Ok(redirect_with_error("/dashboard/users", "Something went wrong!"))
        }
    }
}

/// Display the create-user form.
pub async fn register_page(
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> RegisterTemplate {
    RegisterTemplate {
        admin_name: admin.name.clone(),
        user: Some(admin),
        error: query.error,
        success: query.success,
    }
}

/// Handle the create-user form submission.
pub async fn register(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect> {
    let new_user = NewUser {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        dob: form.dob.trim().to_string(),
        password: form.password,
    };

    match state.backend().register(&new_user).await {
        Ok(()) => Ok(Redirect::to(
            "/dashboard/register?success=User+created+successfully!",
        )),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(BackendError::Validation { message }) => {
            Ok(redirect_with_error("/dashboard/register", &message))
        }
        Err(e) if e.is_connectivity() => Ok(redirect_with_error(
            "/dashboard/register",
            "Network error. Please check your connection.",
        )),
        Err(e) => {
            tracing::warn!(error = %e, "failed to create user");
            Ok(redirect_with_error("/dashboard/register", "Something went wrong!"))
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Normalize whatever dob string the backend sent into the `YYYY-MM-DD` a
/// date input expects; unparseable values leave the input blank.
fn dob_input_value(dob: Option<&str>) -> String {
    dob.and_then(crate::filters::parse_flexible_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn redirect_with_error(path: &str, message: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", message)
        .finish();
    Redirect::to(&format!("{path}?{query}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dob_input_value_normalizes_backend_formats() {
        assert_eq!(
            dob_input_value(Some("Thu, 10 Jan 2002 00:00:00 GMT")),
            "2002-01-10"
        );
        assert_eq!(dob_input_value(Some("2002-01-10")), "2002-01-10");
        assert_eq!(dob_input_value(Some("unknown")), "");
        assert_eq!(dob_input_value(None), "");
    }
}
