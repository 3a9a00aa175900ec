//! Custom error types for the catalog service

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{
    middleware::LOGIN_PATH,
    password::CredentialError,
    repositories::StoreError,
    session::SessionError,
    validation::FieldErrors,
    views::{self, Chrome},
};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Incorrect email or password.";

/// Failure of a catalog or auth operation
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad, missing or malformed field
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Unknown game id
    #[error("Game {0} not found")]
    NotFound(i64),

    /// Username or email already registered
    #[error("Account already exists")]
    Conflict(FieldErrors),

    /// No session, or an expired one
    #[error("Unauthorized")]
    Unauthorized,

    /// Login failed, whatever the cause
    #[error("Incorrect email or password.")]
    InvalidCredentials,

    /// Store or session backend failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict { field } => Self::Conflict(FieldErrors::single(
                field,
                match field {
                    "email" => "Email already registered",
                    _ => "Username already taken",
                },
            )),
            StoreError::Database(e) => Self::StoreUnavailable(e.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        Self::StoreUnavailable(error.to_string())
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Type alias for service results
pub type AppResult<T> = Result<T, AppError>;

/// JSON rendering of an [`AppError`]
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self(error.into())
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self(AppError::Validation(errors))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, json!(errors)),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, json!("Game not found")),
            AppError::Conflict(errors) => (StatusCode::CONFLICT, json!(errors)),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, json!("Authentication required.")),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, json!(INVALID_CREDENTIALS_MESSAGE))
            }
            e @ (AppError::StoreUnavailable(_) | AppError::Credential(_)) => {
                error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!("Internal server error"),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// HTML rendering of an [`AppError`] for the web UI
///
/// Handlers that can re-render a form do so themselves; this covers the rest.
#[derive(Debug)]
pub struct WebError(pub AppError);

impl From<AppError> for WebError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, title, message) = match self.0 {
            AppError::Unauthorized => return Redirect::to(LOGIN_PATH).into_response(),
            AppError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "Not found",
                format!("No game found with ID {id}."),
            ),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid request",
                "The submitted data is not valid.".to_string(),
            ),
            AppError::Conflict(_) => (
                StatusCode::CONFLICT,
                "Conflict",
                "That account already exists.".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Log in",
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ),
            e @ (AppError::StoreUnavailable(_) | AppError::Credential(_)) => {
                error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                    "The request could not be completed. Please try again later.".to_string(),
                )
            }
        };

        (
            status,
            Html(views::error_page(Chrome::default(), title, &message)),
        )
            .into_response()
    }
}

/// Type alias for web handler results
pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::DatabaseError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                AppError::Validation(FieldErrors::single("price", "Not a valid number.")),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::NotFound(1), StatusCode::NOT_FOUND),
            (
                AppError::Conflict(FieldErrors::single("email", "Email already registered")),
                StatusCode::CONFLICT,
            ),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                AppError::StoreUnavailable("connection refused".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError(error).into_response().status(), status);
        }
    }

    #[test]
    fn test_web_errors() {
        let response = WebError(AppError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], LOGIN_PATH);

        let response = WebError(AppError::NotFound(9)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = WebError(AppError::StoreUnavailable("down".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_conflict_maps_to_field_message() {
        let error = AppError::from(StoreError::Conflict { field: "email" });
        match error {
            AppError::Conflict(errors) => {
                assert_eq!(errors.first("email"), Some("Email already registered"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_database_failure_is_store_unavailable() {
        let error = AppError::from(StoreError::Database(DatabaseError::Migration(
            "boom".to_string(),
        )));
        assert!(matches!(error, AppError::StoreUnavailable(_)));
    }
}
