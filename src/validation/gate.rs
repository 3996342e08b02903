//! Request-intercepting validation gate.
//!
//! Wraps a compiled [`Schema`] into an axum middleware: invalid payloads are
//! answered with a 400 before any handler runs, valid ones are passed on
//! with the body untouched.

use crate::validation::schema::{FieldError, Schema};
use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::debug;

// Auth payloads are a handful of short strings.
const BODY_LIMIT: usize = 64 * 1024;

/// Validate the request body against the schema carried as state.
///
/// The body is buffered, checked, and handed downstream byte for byte, so
/// handlers keep extracting `Json<T>` as usual.
pub async fn gate(
    State(schema): State<&'static Schema>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            debug!("Failed to read request body: {error}");
            return validation_failed(vec![FieldError {
                field: "root".to_string(),
                message: "must be a readable JSON body".to_string(),
                value: None,
            }]);
        }
    };

    let payload: Value = match serde_json::from_slice(&bytes) {
        Ok(payload) => payload,
        Err(error) => {
            debug!("Request body is not valid JSON: {error}");
            return validation_failed(vec![FieldError {
                field: "root".to_string(),
                message: "must be valid JSON".to_string(),
                value: None,
            }]);
        }
    };

    if let Err(errors) = schema.validate(&payload) {
        debug!("Payload failed validation with {} error(s)", errors.len());
        return validation_failed(errors);
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn validation_failed(errors: Vec<FieldError>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "message": "Validation failed",
            "errors": errors,
        })),
    )
        .into_response()
}
