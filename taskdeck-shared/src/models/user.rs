/// User model
///
/// Users own every other entity. They are created on registration, have
/// `last_login` stamped on each successful login, and are never
/// soft-deleted. Deleting a user cascades to their tasks, categories, and
/// reminders.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     user_id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(100) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     full_name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user account
///
/// The password hash is never serialized, so a `User` can be handed to the
/// response encoder as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    #[serde(rename = "user_id")]
    #[sqlx(rename = "user_id")]
    pub id: i64,

    /// Login name, unique across all users
    pub username: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash in PHC string format
    #[serde(skip)]
    pub password_hash: String,

    /// Display name
    pub full_name: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login: Option<DateTime<Utc>>,
}

/// Input for creating a new user
///
/// Carries the already-hashed password; plaintext never reaches storage.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
}

/// Replacement values for a user's mutable profile fields
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
}
