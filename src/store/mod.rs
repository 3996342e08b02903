//! Credential store access.
//!
//! One MongoDB collection of account documents. This module owns the
//! connection bootstrap; [`accounts`] owns persistence and the hashing step,
//! [`password`] wraps the bcrypt primitives.

use anyhow::{Context, Result};
use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tracing::info;

pub mod accounts;
pub mod password;

pub use accounts::{Account, AccountStore, AccountUpdate, NewAccount};

// Used when the connection string carries no database path.
const DEFAULT_DATABASE: &str = "conti";

/// Errors surfaced by the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write; the field names which one.
    #[error("duplicate {0}")]
    Duplicate(&'static str),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
}

/// Connect to the document store and verify the connection with a ping.
///
/// Failure is returned to the caller; the process entry point decides
/// whether to abort.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server does
/// not answer the ping.
pub async fn connect(dsn: &str) -> Result<Database> {
    let options = ClientOptions::parse(dsn)
        .await
        .context("Invalid MongoDB connection string")?;

    let client = Client::with_options(options).context("Failed to build MongoDB client")?;

    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

    database
        .run_command(doc! { "ping": 1 })
        .await
        .context("Failed to connect to document store")?;

    info!("Connected to document store, database {}", database.name());

    Ok(database)
}
