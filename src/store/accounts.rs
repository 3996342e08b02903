//! Account persistence.
//!
//! [`AccountStore`] exclusively owns the `accounts` collection and the
//! hashing step: plaintext passwords come in as [`SecretString`] and only
//! the bcrypt hash is ever written. Uniqueness of `email` and `username` is
//! backed by unique indexes.

use crate::store::{StoreError, password};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{DateTime, doc, oid::ObjectId},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;

const COLLECTION: &str = "accounts";

/// Stored account document. `password` is always the bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime,
}

/// Input for account creation; the password is still plaintext here and
/// never leaves the store layer in that form.
#[derive(Debug)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

/// Full-document replacement for an existing account.
///
/// A supplied password is re-hashed before it is written; `None` keeps the
/// stored hash. `createdAt` is immutable and never part of an update.
#[derive(Debug)]
pub struct AccountUpdate {
    pub username: String,
    pub email: String,
    pub password: Option<SecretString>,
}

#[derive(Debug, Clone)]
pub struct AccountStore {
    collection: Collection<Account>,
}

impl AccountStore {
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }

    /// Create the unique indexes backing the `email`/`username` invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if index creation fails.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        for field in ["email", "username"] {
            let index = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();

            self.collection.create_index(index).await?;
        }

        Ok(())
    }

    /// Hash the plaintext password, then persist the account, as one
    /// explicit ordered step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when a unique index rejects the
    /// write, or another [`StoreError`] on hashing/store failure.
    pub async fn create(&self, new: NewAccount) -> Result<Account, StoreError> {
        let hashed = password::hash(new.password).await?;

        let now = DateTime::now();
        let mut account = Account {
            id: None,
            username: new.username,
            email: new.email,
            password: hashed,
            created_at: now,
            updated_at: now,
        };

        let result = self
            .collection
            .insert_one(&account)
            .await
            .map_err(classify_write_error)?;

        account.id = result.inserted_id.as_object_id();

        debug!("Created account {}", account.email);

        Ok(account)
    }

    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .collection
            .find_one(doc! { "username": username })
            .await?)
    }

    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<Account>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// Replace an account by id, returning the updated document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when the new `email`/`username`
    /// collides, or another [`StoreError`] on hashing/store failure.
    pub async fn update(
        &self,
        id: ObjectId,
        update: AccountUpdate,
    ) -> Result<Option<Account>, StoreError> {
        let mut set = doc! {
            "username": update.username,
            "email": update.email,
            "updatedAt": DateTime::now(),
        };

        if let Some(plaintext) = update.password {
            set.insert("password", password::hash(plaintext).await?);
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(classify_write_error)?;

        Ok(updated)
    }

    /// Delete an account permanently, returning the removed document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn delete(&self, id: ObjectId) -> Result<Option<Account>, StoreError> {
        Ok(self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?)
    }

    /// Page through accounts, newest first.
    ///
    /// Skips `(page - 1) * limit` documents and returns at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn list(&self, page: u64, limit: i64) -> Result<Vec<Account>, StoreError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .skip(list_offset(page, limit))
            .limit(limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    /// Liveness check used by the health handler.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not answer the ping.
    pub async fn ping(&self) -> Result<(), StoreError> {
        // Estimated count is a cheap server round trip on the collection.
        self.collection.estimated_document_count().await?;

        Ok(())
    }
}

fn list_offset(page: u64, limit: i64) -> u64 {
    let limit = u64::try_from(limit).unwrap_or(0);
    page.saturating_sub(1).saturating_mul(limit)
}

/// Map a duplicate-key write failure (code 11000) to the offending field so
/// a registration race surfaces as a conflict instead of a generic failure.
fn classify_write_error(error: mongodb::error::Error) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = &*error.kind {
        if write_error.code == 11000 {
            if write_error.message.contains("email") {
                return StoreError::Duplicate("email");
            }
            if write_error.message.contains("username") {
                return StoreError::Duplicate("username");
            }
        }
    }

    StoreError::Database(error)
}
