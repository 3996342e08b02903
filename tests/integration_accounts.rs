//! Integration tests for the account service.
//!
//! These tests exercise the full router (validation gate, auth flows,
//! listing) and the store layer against a real MongoDB. Point
//! `CONTI_TEST_MONGODB_URI` at a running instance, e.g.
//! `mongodb://localhost:27017`; when the variable is unset the tests skip
//! cleanly. Each test works in its own throwaway database.

use anyhow::{Context, Result};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header::CONTENT_TYPE},
};
use conti::{
    api,
    store::{AccountStore, AccountUpdate, NewAccount, password},
};
use mongodb::{Client, Database, bson::oid::ObjectId};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::sleep;
use tower::ServiceExt;

const TEST_DSN_VAR: &str = "CONTI_TEST_MONGODB_URI";

struct TestContext {
    database: Database,
    store: AccountStore,
}

impl TestContext {
    /// Connect to the test MongoDB and set up an isolated database.
    /// Returns `None` (so callers can skip) when no instance is configured.
    async fn new(label: &str) -> Result<Option<Self>> {
        let Ok(dsn) = std::env::var(TEST_DSN_VAR) else {
            eprintln!("Skipping integration test: {TEST_DSN_VAR} not set");
            return Ok(None);
        };

        let client = Client::with_uri_str(&dsn)
            .await
            .context("failed to connect test client")?;
        let database = client.database(&format!("conti_test_{label}_{}", ObjectId::new().to_hex()));

        let store = AccountStore::new(&database);
        store
            .ensure_indexes()
            .await
            .context("failed to create indexes")?;

        Ok(Some(Self { database, store }))
    }

    fn app(&self) -> Router {
        api::router(self.store.clone())
    }

    async fn teardown(self) -> Result<()> {
        self.database.drop().await.context("failed to drop test db")
    }
}

fn post_json(path: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

async fn body_json(response: Response<Body>) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .context("failed to read response body")?;
    serde_json::from_slice(&bytes).context("response body is not JSON")
}

#[tokio::test]
async fn register_login_scenario() -> Result<()> {
    let Some(ctx) = TestContext::new("auth").await? else {
        return Ok(());
    };

    // Register
    let response = ctx
        .app()
        .oneshot(post_json(
            "/api/auth/register",
            &json!({"email": "a@x.com", "password": "Ab1defg", "username": "abc"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await?["message"], "Register successful");

    // Stored password is a hash the library still matches
    let account = ctx
        .store
        .find_by_email("a@x.com")
        .await?
        .context("account not stored")?;
    assert_ne!(account.password, "Ab1defg");
    assert!(password::verify(SecretString::from("Ab1defg"), account.password.clone()).await?);

    // Same email, different username
    let response = ctx
        .app()
        .oneshot(post_json(
            "/api/auth/register",
            &json!({"email": "a@x.com", "password": "Ab1defg", "username": "other"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await?["message"], "Email already exists");

    // Correct credentials
    let response = ctx
        .app()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "a@x.com", "password": "Ab1defg"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["message"], "Login successful");

    // Wrong password and unknown email must be indistinguishable
    let wrong_password = ctx
        .app()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "a@x.com", "password": "wrong1"}),
        ))
        .await?;
    let unknown_email = ctx
        .app()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "nobody@x.com", "password": "wrong1"}),
        ))
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(wrong_password).await?,
        body_json(unknown_email).await?
    );

    ctx.teardown().await
}

#[tokio::test]
async fn duplicate_username_race_is_a_conflict_not_a_500() -> Result<()> {
    let Some(ctx) = TestContext::new("race").await? else {
        return Ok(());
    };

    // Different emails, same username: slips past the email pre-check and
    // lands on the unique index.
    let response = ctx
        .app()
        .oneshot(post_json(
            "/api/auth/register",
            &json!({"email": "a@x.com", "password": "Ab1defg", "username": "abc"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app()
        .oneshot(post_json(
            "/api/auth/register",
            &json!({"email": "b@x.com", "password": "Ab1defg", "username": "abc"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await?["message"],
        "Username already exists"
    );

    ctx.teardown().await
}

#[tokio::test]
async fn listing_pages_newest_first() -> Result<()> {
    let Some(ctx) = TestContext::new("list").await? else {
        return Ok(());
    };

    let mut emails = Vec::new();
    for index in 0..15 {
        let email = format!("user{index}@x.com");
        ctx.store
            .create(NewAccount {
                username: format!("user{index}"),
                email: email.clone(),
                password: SecretString::from("Ab1defg"),
            })
            .await?;
        emails.push(email);
        // keep createdAt strictly increasing (millisecond precision)
        sleep(Duration::from_millis(5)).await;
    }

    let response = ctx.app().oneshot(get("/api/account?page=1&limit=10")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let first_page = body_json(response).await?;
    let first_page = first_page.as_array().context("expected an array")?;
    assert_eq!(first_page.len(), 10);
    // newest first, no password field in any entry
    assert_eq!(first_page[0]["email"], "user14@x.com");
    assert!(first_page.iter().all(|entry| entry.get("password").is_none()));

    // page 2 skips the 10 newest, leaving the 5 oldest
    let response = ctx.app().oneshot(get("/api/account?page=2&limit=10")).await?;
    let second_page = body_json(response).await?;
    let second_page = second_page.as_array().context("expected an array")?;
    assert_eq!(second_page.len(), 5);
    let listed: Vec<&str> = second_page
        .iter()
        .filter_map(|entry| entry["email"].as_str())
        .collect();
    assert_eq!(
        listed,
        vec![
            "user4@x.com",
            "user3@x.com",
            "user2@x.com",
            "user1@x.com",
            "user0@x.com"
        ]
    );

    // defaults: page=1, limit=10
    let response = ctx.app().oneshot(get("/api/account")).await?;
    let default_page = body_json(response).await?;
    assert_eq!(default_page.as_array().context("expected an array")?.len(), 10);

    ctx.teardown().await
}

#[tokio::test]
async fn delete_then_fetch_returns_none() -> Result<()> {
    let Some(ctx) = TestContext::new("delete").await? else {
        return Ok(());
    };

    let account = ctx
        .store
        .create(NewAccount {
            username: "gone".to_string(),
            email: "gone@x.com".to_string(),
            password: SecretString::from("Ab1defg"),
        })
        .await?;
    let id = account.id.context("created account has no id")?;

    let deleted = ctx.store.delete(id).await?;
    assert!(deleted.is_some());

    assert!(ctx.store.find_by_id(id).await?.is_none());
    assert!(ctx.store.delete(id).await?.is_none());

    ctx.teardown().await
}

#[tokio::test]
async fn update_rehashes_a_changed_password() -> Result<()> {
    let Some(ctx) = TestContext::new("update").await? else {
        return Ok(());
    };

    let account = ctx
        .store
        .create(NewAccount {
            username: "abc".to_string(),
            email: "a@x.com".to_string(),
            password: SecretString::from("Ab1defg"),
        })
        .await?;
    let id = account.id.context("created account has no id")?;

    let updated = ctx
        .store
        .update(
            id,
            AccountUpdate {
                username: "abc".to_string(),
                email: "a@x.com".to_string(),
                password: Some(SecretString::from("Cd2efgh")),
            },
        )
        .await?
        .context("account vanished during update")?;

    assert_ne!(updated.password, "Cd2efgh");
    assert!(password::verify(SecretString::from("Cd2efgh"), updated.password.clone()).await?);
    assert!(!password::verify(SecretString::from("Ab1defg"), updated.password.clone()).await?);
    assert_eq!(updated.created_at, account.created_at);

    // omitting the password keeps the stored hash
    let unchanged = ctx
        .store
        .update(
            id,
            AccountUpdate {
                username: "renamed".to_string(),
                email: "a@x.com".to_string(),
                password: None,
            },
        )
        .await?
        .context("account vanished during update")?;

    assert_eq!(unchanged.password, updated.password);
    assert_eq!(unchanged.username, "renamed");

    ctx.teardown().await
}

#[tokio::test]
async fn find_by_username_matches_exactly() -> Result<()> {
    let Some(ctx) = TestContext::new("username").await? else {
        return Ok(());
    };

    ctx.store
        .create(NewAccount {
            username: "exact_name".to_string(),
            email: "exact@x.com".to_string(),
            password: SecretString::from("Ab1defg"),
        })
        .await?;

    assert!(ctx.store.find_by_username("exact_name").await?.is_some());
    assert!(ctx.store.find_by_username("exact").await?.is_none());

    ctx.teardown().await
}

#[tokio::test]
async fn root_greets_in_plaintext() -> Result<()> {
    let Some(ctx) = TestContext::new("root").await? else {
        return Ok(());
    };

    let response = ctx.app().oneshot(get("/")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"Hello from conti!");

    // only POST is routed on the auth paths
    let response = ctx.app().oneshot(get("/api/auth/login")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.teardown().await
}
