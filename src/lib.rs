//! # Conti (Account Management Service)
//!
//! `conti` is a small account-management service: user registration, login,
//! and a paginated account listing backed by a MongoDB collection.
//!
//! ## Accounts
//!
//! A single `accounts` collection holds the documents. `email` and
//! `username` are unique (backed by unique indexes); the stored `password`
//! is always a bcrypt hash with a per-record salt, never the plaintext.
//!
//! ## Validation
//!
//! Auth payloads are checked by a declarative schema gate before any flow
//! logic runs: undeclared fields are rejected, and failures come back as
//! `400 {"message": "Validation failed", "errors": [...]}` with one entry
//! per offending field.
//!
//! ## Authentication
//!
//! Login deliberately does not distinguish "unknown email" from "wrong
//! password"; both answer `401 {"message": "Invalid email or password"}` to
//! prevent account enumeration.

pub mod api;
pub mod cli;
pub mod store;
pub mod validation;
