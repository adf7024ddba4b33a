/// Domain models
///
/// This module contains the records managed by the Entity Store.
///
/// # Models
///
/// - `category`: Task categories, owned and soft-deletable
/// - `priority`: Task priorities, owned and soft-deletable
/// - `task`: Tasks referencing one category and one priority
/// - `user`: User accounts (identity, staff flag, active flag)
/// - `soft_delete`: Deleted flag + timestamp lifecycle policy
///
/// # Example
///
/// ```no_run
/// use todolist_shared::models::category::CreateCategory;
/// use todolist_shared::store::{memory::MemoryStore, EntityStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
///
/// let category = store
///     .categories()
///     .create(
///         "alice",
///         CreateCategory {
///             name: "Work".to_string(),
///             description: String::new(),
///         },
///     )
///     .await?;
/// assert_eq!(category.created_by, "alice");
/// # Ok(())
/// # }
/// ```

pub mod category;
pub mod priority;
pub mod soft_delete;
pub mod task;
pub mod user;

use std::fmt::Debug;

use crate::auth::ownership::Owned;
use crate::query::{Matches, ScopeFilter};
use soft_delete::SoftDelete;

/// Owned, soft-deletable record managed through a generic repository
///
/// Implemented by [`category::Category`], [`priority::Priority`] and
/// [`task::Task`].
pub trait Resource: Owned + SoftDelete + Clone + Debug + Send + Sync + 'static {
    /// Creation input (never carries the owner)
    type Create: Send + Sync + 'static;

    /// Partial update as applied by the store
    type Changes: Send + Sync + 'static;

    /// Filter predicate understood by both store backends
    type Filter: Matches<Self> + From<ScopeFilter> + Debug + Send + Sync + 'static;

    /// Whether the staff listing includes soft-deleted rows
    const STAFF_LISTS_DELETED: bool;

    /// Store-assigned ID
    fn id(&self) -> i64;
}
