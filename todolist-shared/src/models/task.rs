/// Task model
///
/// A task is owned by the user who created it and references one category
/// and one priority.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     created_by VARCHAR(150) NOT NULL,
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status VARCHAR(20) NOT NULL DEFAULT 'Pending',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     completed_at TIMESTAMPTZ,
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ,
///     deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     category_id BIGINT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
///     priority_id BIGINT NOT NULL REFERENCES priorities(id) ON DELETE CASCADE
/// );
/// ```
///
/// # Completion
///
/// `completed_at` is stamped only by an update that supplies
/// `completed = true`. Every other update clears it, and creation never sets
/// it.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use todolist_shared::models::task::{TaskChanges, UpdateTask};
///
/// let now = Utc::now();
/// let changes = TaskChanges::new(UpdateTask { completed: Some(true), ..Default::default() }, now);
/// assert_eq!(changes.completed_at, Some(now));
///
/// let changes = TaskChanges::new(UpdateTask { title: Some("x".into()), ..Default::default() }, now);
/// assert_eq!(changes.completed_at, None);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{soft_delete::impl_soft_delete, Resource};
use crate::auth::ownership::Owned;
use crate::query::TaskFilter;

/// Status given to tasks created without one
pub const DEFAULT_STATUS: &str = "Pending";

/// Task owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Username of the owner, set server-side at creation
    pub created_by: String,

    pub title: String,

    pub description: String,

    /// Free-text workflow status, "Pending" by default
    pub status: String,

    pub completed: bool,

    pub created_at: DateTime<Utc>,

    /// When the last completing update happened
    pub completed_at: Option<DateTime<Utc>>,

    pub updated_at: DateTime<Utc>,

    pub deleted_at: Option<DateTime<Utc>>,

    pub deleted: bool,

    /// Referenced category
    #[serde(rename = "category")]
    pub category_id: i64,

    /// Referenced priority
    #[serde(rename = "priority")]
    pub priority_id: i64,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,

    pub description: String,

    #[serde(default = "default_status")]
    pub status: String,

    pub completed: bool,

    pub category_id: i64,

    pub priority_id: i64,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// Client-supplied partial update for a task
///
/// Omitted (`None`) fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<i64>,
    pub priority_id: Option<i64>,
}

/// Update as written to the store
///
/// Wraps the client fields and the derived `completed_at`, which is always
/// written.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub fields: UpdateTask,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskChanges {
    /// Derives the stored changes from a client update made at `now`
    pub fn new(fields: UpdateTask, now: DateTime<Utc>) -> Self {
        let completed_at = match fields.completed {
            Some(true) => Some(now),
            _ => None,
        };

        Self {
            fields,
            completed_at,
        }
    }

    /// Applies the changes to `task`
    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        let fields = self.fields;
        if let Some(title) = fields.title {
            task.title = title;
        }
        if let Some(description) = fields.description {
            task.description = description;
        }
        if let Some(status) = fields.status {
            task.status = status;
        }
        if let Some(completed) = fields.completed {
            task.completed = completed;
        }
        if let Some(category_id) = fields.category_id {
            task.category_id = category_id;
        }
        if let Some(priority_id) = fields.priority_id {
            task.priority_id = priority_id;
        }
        task.completed_at = self.completed_at;
        task.updated_at = now;
    }
}

impl_soft_delete!(Task);

impl Owned for Task {
    const KIND: &'static str = "Task";

    fn owner(&self) -> &str {
        &self.created_by
    }

    fn is_active(&self) -> bool {
        !self.deleted
    }
}

impl Resource for Task {
    type Create = CreateTask;
    type Changes = TaskChanges;
    type Filter = TaskFilter;

    // Staff task listings include soft-deleted rows
    const STAFF_LISTS_DELETED: bool = true;

    fn id(&self) -> i64 {
        self.id
    }
}
