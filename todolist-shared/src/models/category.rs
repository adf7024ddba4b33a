/// Category model
///
/// Categories group tasks. Each category belongs to the user who created it
/// (or to the configured system owner for seeded rows).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     created_by VARCHAR(150) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ,
///     deleted BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{soft_delete::impl_soft_delete, Resource};
use crate::auth::ownership::Owned;
use crate::query::ScopeFilter;

/// Category of tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID
    pub id: i64,

    /// Display name
    pub name: String,

    /// Free-form description (may be empty)
    pub description: String,

    /// Username of the owner, set server-side at creation
    pub created_by: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Set together with `deleted`
    pub deleted_at: Option<DateTime<Utc>>,

    pub deleted: bool,
}

/// Input for creating a category
///
/// There is deliberately no `created_by` here: the store receives the owner
/// separately from the authenticated identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: String,
}

/// Partial update for a category
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateCategory {
    /// Applies the supplied fields to `category`
    pub fn apply(self, category: &mut Category, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(description) = self.description {
            category.description = description;
        }
        category.updated_at = now;
    }
}

impl_soft_delete!(Category);

impl Owned for Category {
    const KIND: &'static str = "Category";

    fn owner(&self) -> &str {
        &self.created_by
    }

    fn is_active(&self) -> bool {
        !self.deleted
    }
}

impl Resource for Category {
    type Create = CreateCategory;
    type Changes = UpdateCategory;
    type Filter = ScopeFilter;

    const STAFF_LISTS_DELETED: bool = false;

    fn id(&self) -> i64 {
        self.id
    }
}
