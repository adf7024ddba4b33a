/// Priority model
///
/// Same lifecycle and ownership rules as categories, without a description.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE priorities (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(50) NOT NULL,
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

/// Task priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Priority {
    pub id: i64,
    pub name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted: bool,
}

/// Input for creating a priority
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePriority {
    pub name: String,
}

/// Partial update for a priority
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePriority {
    pub name: Option<String>,
}

impl UpdatePriority {
    pub fn apply(self, priority: &mut Priority, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            priority.name = name;
        }
        priority.updated_at = now;
    }
}

impl_soft_delete!(Priority);

impl Owned for Priority {
    const KIND: &'static str = "Priority";

    fn owner(&self) -> &str {
        &self.created_by
    }

    fn is_active(&self) -> bool {
        !self.deleted
    }
}

impl Resource for Priority {
    type Create = CreatePriority;
    type Changes = UpdatePriority;
    type Filter = ScopeFilter;

    const STAFF_LISTS_DELETED: bool = false;

    fn id(&self) -> i64 {
        self.id
    }
}
