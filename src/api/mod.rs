use crate::{
    store::{self, AccountStore},
    validation::{gate, schemas},
};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::LazyLock;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use utoipa::OpenApi;

pub mod cors;
pub(crate) mod handlers;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

use crate::api::handlers::{
    accounts,
    accounts::__path_list_accounts,
    auth,
    auth::{__path_login, __path_register},
    health,
    health::__path_health,
};

#[derive(OpenApi)]
#[openapi(
    paths(health, login, register, list_accounts),
    components(schemas(
        health::Health,
        auth::LoginRequest,
        auth::RegisterRequest,
        accounts::AccountResponse
    )),
    tags(
        (name = "conti", description = "Account management API")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router around an [`AccountStore`].
///
/// The auth routes sit behind their validation gates; the listing route
/// calls the store directly.
#[must_use]
pub fn router(store: AccountStore) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello from conti!" }))
        .route(
            "/api/auth/register",
            post(handlers::register)
                // other methods are unrouted, not 405
                .fallback(method_not_found)
                .route_layer(from_fn_with_state(
                    LazyLock::force(&schemas::REGISTER),
                    gate,
                )),
        )
        .route(
            "/api/auth/login",
            post(handlers::login)
                .fallback(method_not_found)
                .route_layer(from_fn_with_state(LazyLock::force(&schemas::LOGIN), gate)),
        )
        .route("/api/account", get(handlers::list_accounts))
        .route("/health", get(handlers::health).options(handlers::health))
        .layer(Extension(store))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, allowed_origins: Option<Vec<String>>) -> Result<()> {
    // Connect to the document store and back the uniqueness invariants
    let database = store::connect(&dsn).await?;

    let accounts = AccountStore::new(&database);

    accounts
        .ensure_indexes()
        .await
        .context("Failed to create account indexes")?;

    let cors = cors::layer(allowed_origins);

    let app = router(accounts).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

async fn method_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
