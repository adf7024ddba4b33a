/// Filter predicates and the task query router
///
/// Filters are plain values composed from the fields the access layer cares
/// about: owner, deleted flag, status, category and priority. They know
/// nothing about the storage engine. The in-memory store evaluates them with
/// [`Matches`]; the PostgreSQL store translates them into a `WHERE` clause.
///
/// # Example
///
/// ```
/// use todolist_shared::query::{ScopeFilter, TaskCriteria};
///
/// let scope = ScopeFilter::owned_active("alice");
/// let filter = TaskCriteria::Status("Done".to_string()).into_filter(scope);
///
/// assert_eq!(filter.scope.created_by.as_deref(), Some("alice"));
/// assert_eq!(filter.scope.deleted, Some(false));
/// assert_eq!(filter.status.as_deref(), Some("Done"));
/// ```

use tracing::debug;

use crate::auth::{authorization::list_scope, middleware::AuthContext, ownership::Owned};
use crate::models::task::Task;
use crate::store::{Repository, StoreResult};

/// Predicate evaluated against a single record
pub trait Matches<E> {
    fn matches(&self, record: &E) -> bool;
}

/// Visibility scope: owner and deleted-state constraints
///
/// `None` means "no constraint" for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    /// Only rows created by this username
    pub created_by: Option<String>,

    /// Only rows whose deleted flag equals this value
    pub deleted: Option<bool>,
}

impl ScopeFilter {
    /// Every row, deleted or not
    pub fn everything() -> Self {
        Self::default()
    }

    /// Rows that are not soft-deleted, whoever owns them
    pub fn active() -> Self {
        Self {
            created_by: None,
            deleted: Some(false),
        }
    }

    /// Rows owned by `username` that are not soft-deleted
    pub fn owned_active(username: impl Into<String>) -> Self {
        Self {
            created_by: Some(username.into()),
            deleted: Some(false),
        }
    }
}

impl<E: Owned> Matches<E> for ScopeFilter {
    fn matches(&self, record: &E) -> bool {
        if let Some(ref owner) = self.created_by {
            if record.owner() != owner {
                return false;
            }
        }
        if let Some(deleted) = self.deleted {
            if record.is_active() == deleted {
                return false;
            }
        }
        true
    }
}

/// Task filter: a visibility scope plus optional field matches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub scope: ScopeFilter,

    /// Exact status match
    pub status: Option<String>,

    pub category_id: Option<i64>,

    pub priority_id: Option<i64>,
}

impl From<ScopeFilter> for TaskFilter {
    fn from(scope: ScopeFilter) -> Self {
        Self {
            scope,
            ..Default::default()
        }
    }
}

impl Matches<Task> for TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        self.scope.matches(task)
            && self.status.as_ref().map_or(true, |s| &task.status == s)
            && self.category_id.map_or(true, |id| task.category_id == id)
            && self.priority_id.map_or(true, |id| task.priority_id == id)
    }
}

/// What a task listing is narrowed by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCriteria {
    /// Plain list
    All,

    /// Exact status string
    Status(String),

    /// Category ID
    Category(i64),

    /// Priority ID
    Priority(i64),
}

impl TaskCriteria {
    /// Combines the criteria with a visibility scope
    pub fn into_filter(self, scope: ScopeFilter) -> TaskFilter {
        let mut filter = TaskFilter::from(scope);
        match self {
            TaskCriteria::All => {}
            TaskCriteria::Status(status) => filter.status = Some(status),
            TaskCriteria::Category(id) => filter.category_id = Some(id),
            TaskCriteria::Priority(id) => filter.priority_id = Some(id),
        }
        filter
    }
}

/// Lists the tasks visible to `auth` that satisfy `criteria`
///
/// Visibility follows the listing rule for every criterion: staff see all
/// tasks (soft-deleted included), everyone else only their own active tasks.
/// Results come back in creation order.
pub async fn filter_tasks(
    tasks: &dyn Repository<Task>,
    auth: &AuthContext,
    criteria: TaskCriteria,
) -> StoreResult<Vec<Task>> {
    let filter = criteria.into_filter(list_scope::<Task>(auth));
    debug!(username = %auth.username, ?filter, "Filtering tasks");

    tasks.filter(&filter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::DEFAULT_STATUS;
    use chrono::Utc;

    fn task(id: i64, owner: &str, deleted: bool) -> Task {
        let now = Utc::now();
        Task {
            id,
            created_by: owner.to_string(),
            title: format!("task {}", id),
            description: String::new(),
            status: DEFAULT_STATUS.to_string(),
            completed: false,
            created_at: now,
            completed_at: None,
            updated_at: now,
            deleted_at: deleted.then_some(now),
            deleted,
            category_id: 10,
            priority_id: 20,
        }
    }

    #[test]
    fn test_everything_matches_deleted_rows() {
        let filter = ScopeFilter::everything();
        assert!(filter.matches(&task(1, "alice", false)));
        assert!(filter.matches(&task(2, "bob", true)));
    }

    #[test]
    fn test_owned_active_requires_owner_and_not_deleted() {
        let filter = ScopeFilter::owned_active("alice");
        assert!(filter.matches(&task(1, "alice", false)));
        assert!(!filter.matches(&task(2, "alice", true)));
        assert!(!filter.matches(&task(3, "bob", false)));
    }

    #[test]
    fn test_active_ignores_owner() {
        let filter = ScopeFilter::active();
        assert!(filter.matches(&task(1, "bob", false)));
        assert!(!filter.matches(&task(2, "bob", true)));
    }

    #[test]
    fn test_task_filter_field_matches() {
        let mut done = task(1, "alice", false);
        done.status = "Done".to_string();

        let by_status = TaskCriteria::Status("Done".to_string()).into_filter(ScopeFilter::everything());
        assert!(by_status.matches(&done));
        assert!(!by_status.matches(&task(2, "alice", false)));

        let by_category = TaskCriteria::Category(10).into_filter(ScopeFilter::everything());
        assert!(by_category.matches(&done));
        let by_other_category = TaskCriteria::Category(11).into_filter(ScopeFilter::everything());
        assert!(!by_other_category.matches(&done));

        let by_priority = TaskCriteria::Priority(20).into_filter(ScopeFilter::owned_active("bob"));
        assert!(!by_priority.matches(&done), "scope still applies");
    }

    #[test]
    fn test_status_match_is_exact() {
        let filter = TaskCriteria::Status("pending".to_string()).into_filter(ScopeFilter::everything());
        assert!(!filter.matches(&task(1, "alice", false)));
    }
}
