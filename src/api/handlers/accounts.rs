//! Paginated account listing.

use crate::{
    api::handlers::ApiError,
    store::{Account, AccountStore},
};
use axum::{
    Json,
    extract::{Extension, Query},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: i64 = 10;
// The original service accepted any limit; an unbounded read of the
// credential collection is not worth keeping.
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    page: Option<u64>,
    limit: Option<i64>,
}

/// Account as returned by the API: no password hash, ever.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: account.username,
            email: account.email,
            created_at: account
                .created_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
            updated_at: account
                .updated_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
        }
    }
}

#[utoipa::path(
    get,
    path= "/api/account",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size, capped at 100"),
    ),
    responses (
        (status = 200, description = "Accounts ordered by creation time descending", body = [AccountResponse]),
        (status = 500, description = "Store failure"),
    ),
    tag= "accounts"
)]
#[instrument(skip(store))]
pub async fn list_accounts(
    store: Extension<AccountStore>,
    Query(params): Query<ListParams>,
) -> Response {
    let page = params.page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    match store.list(page, limit).await {
        Ok(accounts) => {
            let accounts: Vec<AccountResponse> =
                accounts.into_iter().map(AccountResponse::from).collect();

            Json(accounts).into_response()
        }
        Err(error) => ApiError::Internal(error).into_response(),
    }
}
