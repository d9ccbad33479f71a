//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding. Route handlers return `Result<T, AppError>`; most backend
//! trouble is rendered inline by the views themselves, so what reaches this
//! layer is either an authorization rejection (which turns into a redirect to
//! the login page) or a genuine failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::backend::BackendError;

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The session is already cleared by the client's 401 interceptor;
        // finishing the job here means sending the operator back to login.
        if let Self::Backend(err) = &self
            && err.is_unauthorized()
        {
            return Redirect::to("/login?error=Session+expired.+Please+log+in+again.")
                .into_response();
        }

        // Capture server-class errors to Sentry
        if matches!(
            self,
            Self::Internal(_)
                | Self::Backend(
                    BackendError::Api { .. } | BackendError::Parse(_) | BackendError::Payload(_)
                )
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Backend(err) => match err {
                BackendError::Validation { .. } => StatusCode::BAD_REQUEST,
                BackendError::NotFound { .. } => StatusCode::NOT_FOUND,
                BackendError::Http(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Backend(err) => match err {
                BackendError::Validation { message } | BackendError::NotFound { message } => {
                    message.clone()
                }
                BackendError::Http(_) => {
                    "Could not reach the auction service. Please check your connection."
                        .to_string()
                }
                _ => "Something went wrong".to_string(),
            },
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("user 9".to_string());
        assert_eq!(err.to_string(), "Not found: user 9");

        let err = AppError::BadRequest("invalid date".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid date");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Validation {
                message: "bad".to_string()
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unauthorized_redirects_to_login() {
        let err = AppError::Backend(BackendError::Unauthorized {
            message: "expired".to_string(),
        });
        let response = err.into_response();
        assert!(response.status().is_redirection());
        let location = response
            .headers()
            .get(axum::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(location.starts_with("/login"));
    }
}
