/// Soft-delete lifecycle shared by categories, priorities and tasks
///
/// A soft-deleted row stays in storage with `deleted = true` and a
/// `deleted_at` timestamp. The two fields always move together:
///
/// ```text
/// deleted = false  <=>  deleted_at IS NULL
/// deleted = true   <=>  deleted_at IS NOT NULL
/// ```
///
/// There is no way back: a soft-deleted row is never re-activated. Permanent
/// removal (hard delete) is a store operation reserved for staff.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use todolist_shared::models::soft_delete::{soft_delete, SoftDelete};
/// use todolist_shared::models::priority::Priority;
///
/// let mut priority = Priority {
///     id: 1,
///     name: "High".to_string(),
///     created_by: "alice".to_string(),
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
///     deleted_at: None,
///     deleted: false,
/// };
///
/// assert!(soft_delete(&mut priority, Utc::now()));
/// assert!(priority.is_deleted());
/// assert!(priority.deleted_at().is_some());
/// ```

use chrono::{DateTime, Utc};

/// Records that carry the deleted flag and timestamp
pub trait SoftDelete {
    /// Whether the row has been soft-deleted
    fn is_deleted(&self) -> bool;

    /// When the row was soft-deleted
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Writes both lifecycle fields and bumps `updated_at`
    ///
    /// Use [`soft_delete`] instead of calling this directly.
    fn set_deleted(&mut self, at: DateTime<Utc>);
}

/// Soft-deletes a record
///
/// Returns `false` and leaves the record untouched when it is already
/// deleted, so `deleted_at` keeps the time of the first deletion.
pub fn soft_delete<E: SoftDelete>(entity: &mut E, at: DateTime<Utc>) -> bool {
    if entity.is_deleted() {
        return false;
    }

    entity.set_deleted(at);
    debug_assert!(is_consistent(entity));
    true
}

/// Checks the flag/timestamp invariant
pub fn is_consistent<E: SoftDelete>(entity: &E) -> bool {
    entity.is_deleted() == entity.deleted_at().is_some()
}

/// Implements [`SoftDelete`] for a struct with `deleted`, `deleted_at` and
/// `updated_at` fields.
macro_rules! impl_soft_delete {
    ($ty:ty) => {
        impl $crate::models::soft_delete::SoftDelete for $ty {
            fn is_deleted(&self) -> bool {
                self.deleted
            }

            fn deleted_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
                self.deleted_at
            }

            fn set_deleted(&mut self, at: chrono::DateTime<chrono::Utc>) {
                self.deleted = true;
                self.deleted_at = Some(at);
                self.updated_at = at;
            }
        }
    };
}

pub(crate) use impl_soft_delete;
