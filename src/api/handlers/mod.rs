pub mod health;
pub use self::health::health;

pub mod auth;
pub use self::auth::{login, register};

pub mod accounts;
pub use self::accounts::list_accounts;

// common error taxonomy for the handlers
use crate::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Flow-level outcomes mapped to HTTP responses.
///
/// Messages are deliberately generic: login failures are undifferentiated
/// and internal failures never leak store error detail.
#[derive(Debug)]
pub enum ApiError {
    /// Unknown email or wrong password; intentionally the same response.
    InvalidCredentials,
    DuplicateEmail,
    DuplicateUsername,
    Internal(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate("email") => Self::DuplicateEmail,
            StoreError::Duplicate(_) => Self::DuplicateUsername,
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password"),
            Self::DuplicateEmail => (StatusCode::BAD_REQUEST, "Email already exists"),
            Self::DuplicateUsername => (StatusCode::BAD_REQUEST, "Username already exists"),
            Self::Internal(error) => {
                error!("Store operation failed: {error}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
