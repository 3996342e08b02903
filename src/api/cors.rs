//! Cross-origin allow-list.
//!
//! The membership test is a pure function of `(origin, allow-list)`; the
//! tower-http layer is only the glue around it. Requests without an `Origin`
//! header are not cross-origin and always pass.

use axum::http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
    request::Parts,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Split a comma-separated `ALLOWED_ORIGINS` value into its entries.
#[must_use]
pub fn parse_allowed_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Exact-match membership test against the configured allow-list.
#[must_use]
pub fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|entry| entry == origin)
}

/// Build the CORS layer: any origin when no list is configured, exact
/// allow-list membership otherwise.
#[must_use]
pub fn layer(allowed_origins: Option<Vec<String>>) -> CorsLayer {
    let allow_origin = match allowed_origins {
        None => AllowOrigin::from(Any),
        Some(allowed) => AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .is_ok_and(|origin| origin_allowed(origin, &allowed))
        }),
    };

    CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(allow_origin)
}
