/// User model
///
/// Users are the identities the access layer authorizes. Ownership of
/// categories, priorities and tasks is recorded by username, so the username
/// never changes after creation.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     is_staff BOOLEAN NOT NULL DEFAULT FALSE,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::Role;
use crate::auth::ownership::Owned;

/// User account
///
/// Passwords are stored as Argon2id hashes and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name, unique and immutable
    pub username: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Staff users see and manage every resource
    pub is_staff: bool,

    /// Deactivated users cannot authenticate
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Role derived from the staff flag
    pub fn role(&self) -> Role {
        Role::from_staff_flag(self.is_staff)
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub is_staff: bool,
}

/// Partial update for a user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New password hash
    pub password_hash: Option<String>,

    pub is_staff: Option<bool>,

    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// Whether the update touches anything besides the password
    pub fn changes_privileges(&self) -> bool {
        self.is_staff.is_some() || self.is_active.is_some()
    }

    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(is_staff) = self.is_staff {
            user.is_staff = is_staff;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        user.updated_at = now;
    }
}

/// A user owns their own account; deactivation plays the role of deletion
impl Owned for User {
    const KIND: &'static str = "User";

    fn owner(&self) -> &str {
        &self.username
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}
