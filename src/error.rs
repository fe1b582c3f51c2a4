use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::{ERR_INVALID_BODY, ERR_INVALID_PATH, ERR_INVALID_QUERY};

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Link not found")]
    LinkNotFound,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl AppError {
    /// True when the underlying storage error is a UNIQUE constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
            AppError::Migration(ref e) => {
                tracing::error!("Migration error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
            AppError::PasswordHash(ref e) => {
                tracing::error!("Password hash error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            AppError::UsernameTaken => (StatusCode::CONFLICT, "Username already taken"),
            AppError::EmailTaken => (StatusCode::CONFLICT, "Email already registered"),
            AppError::LinkNotFound => (StatusCode::NOT_FOUND, "Link not found"),
            AppError::ProfileNotFound => (StatusCode::NOT_FOUND, "Profile not found"),
            AppError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "Too many requests"),
        };

        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), message = error_message, "error response");
        }

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

// Extractor rejections become JSON 400s instead of axum's plain-text bodies

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::InvalidInput(ERR_INVALID_BODY.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Rejected query string: {}", rejection.body_text());
        AppError::InvalidInput(ERR_INVALID_QUERY.to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path parameter: {}", rejection.body_text());
        AppError::InvalidInput(ERR_INVALID_PATH.to_string())
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
