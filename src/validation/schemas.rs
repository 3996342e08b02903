//! Compiled request schemas for the auth routes.
//!
//! Compilation happens once, on first use, so per-request validation is a
//! pure function of the payload.

use crate::validation::schema::{Field, Schema};
use std::sync::LazyLock;

/// `POST /api/auth/login` payload.
pub static LOGIN: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field(Field::string("email").required().min_length(1).email())
        .field(Field::string("password").required().min_length(6))
});

/// `POST /api/auth/register` payload.
///
/// The password charset is restricted and must mix cases and digits. The
/// checks are split into separate patterns (the regex crate has no
/// look-ahead), each with its own diagnostic.
pub static REGISTER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field(Field::string("email").required().min_length(1).email())
        .field(
            Field::string("password")
                .required()
                .min_length(6)
                .pattern(
                    r"^[a-zA-Z\d@$!%*?&]+$",
                    "must contain only letters, digits and @$!%*?&",
                )
                .pattern(r"[a-z]", "must contain at least one lowercase letter")
                .pattern(r"[A-Z]", "must contain at least one uppercase letter")
                .pattern(r"\d", "must contain at least one digit"),
        )
        .field(
            Field::string("username")
                .required()
                .min_length(3)
                .max_length(30)
                .pattern(
                    r"^[a-zA-Z0-9_]+$",
                    "must contain only alphanumeric characters and underscores",
                ),
        )
});
