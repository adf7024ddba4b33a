/// Access-control gate
///
/// Every row-level operation on a category, priority, task or user passes
/// through [`authorize`] before the store is touched.
///
/// # Permission Model
///
/// Access depends on two facts: the caller's [`Role`] and whether the caller
/// owns the row.
///
/// 1. **Staff**: may retrieve, update and delete anything, deleted or not.
///    Staff deletes are permanent.
/// 2. **Non-staff**: only their own rows that are not soft-deleted. A
///    soft-deleted row answers `NotFound` before ownership is considered.
///    Retrieving a foreign row is `NotFound`; mutating one is `Forbidden`.
///    Non-staff deletes are soft deletes.
///
/// Listings are not authorized row by row; [`list_scope`] produces the
/// filter that restricts what the store returns.
///
/// # Example
///
/// ```
/// use todolist_shared::auth::authorization::{authorize, Disposal, Operation};
/// use todolist_shared::auth::middleware::{AuthContext, Role};
/// use todolist_shared::models::priority::Priority;
/// use chrono::Utc;
///
/// let priority = Priority {
///     id: 1,
///     name: "High".to_string(),
///     created_by: "alice".to_string(),
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
///     deleted_at: None,
///     deleted: false,
/// };
///
/// let alice = AuthContext::new(1, "alice", Role::NonStaff);
/// let grant = authorize(&alice, Operation::Delete, &priority).unwrap();
/// assert_eq!(grant.disposal(), Disposal::SoftDelete);
///
/// let bob = AuthContext::new(2, "bob", Role::NonStaff);
/// assert!(authorize(&bob, Operation::Retrieve, &priority).is_err());
/// ```

use std::fmt;

use tracing::{debug, warn};

use super::middleware::{AuthContext, Role};
use super::ownership::{owns, Owned};
use crate::models::Resource;
use crate::query::ScopeFilter;

/// Row-level operations checked by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Retrieve,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Retrieve => "retrieve",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Row is absent or hidden from the caller
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Row is visible but the caller may not perform the operation
    #[error("Not authorized to {operation} this {kind}")]
    Forbidden {
        kind: &'static str,
        operation: Operation,
    },

    /// Operation reserved for staff
    #[error("Only staff may {0}")]
    StaffOnly(&'static str),
}

/// Why an operation was allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Caller is staff
    Staff,

    /// Caller owns the row and it is active
    Owner,
}

/// How a granted delete is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal {
    /// Row is removed permanently
    HardDelete,

    /// Row is flagged deleted and retained
    SoftDelete,
}

impl Grant {
    pub fn disposal(self) -> Disposal {
        match self {
            Grant::Staff => Disposal::HardDelete,
            Grant::Owner => Disposal::SoftDelete,
        }
    }
}

/// Decides whether `auth` may perform `operation` on `resource`
///
/// # Errors
///
/// Only non-staff callers are ever denied:
///
/// - `NotFound` if the row is soft-deleted (any operation) or owned by
///   someone else (retrieve)
/// - `Forbidden` if an active row owned by someone else is updated or deleted
pub fn authorize<R: Owned>(
    auth: &AuthContext,
    operation: Operation,
    resource: &R,
) -> Result<Grant, AuthzError> {
    match auth.role {
        Role::Staff => Ok(Grant::Staff),
        Role::NonStaff => {
            if !resource.is_active() {
                debug!(username = %auth.username, kind = R::KIND, %operation, "Row is deleted");
                return Err(AuthzError::NotFound(R::KIND));
            }

            if owns(auth, resource) {
                return Ok(Grant::Owner);
            }

            match operation {
                Operation::Retrieve => Err(AuthzError::NotFound(R::KIND)),
                Operation::Update | Operation::Delete => {
                    warn!(
                        username = %auth.username,
                        owner = %resource.owner(),
                        kind = R::KIND,
                        %operation,
                        "Denied operation on foreign row"
                    );
                    Err(AuthzError::Forbidden {
                        kind: R::KIND,
                        operation,
                    })
                }
            }
        }
    }
}

/// Visibility scope for listing `E`
///
/// Staff see every row, or every active row for types whose listing hides
/// soft-deleted rows. Everyone else sees their own active rows.
pub fn list_scope<E: Resource>(auth: &AuthContext) -> ScopeFilter {
    match auth.role {
        Role::Staff if E::STAFF_LISTS_DELETED => ScopeFilter::everything(),
        Role::Staff => ScopeFilter::active(),
        Role::NonStaff => ScopeFilter::owned_active(auth.username.clone()),
    }
}

/// Checks that the caller is staff
///
/// # Errors
///
/// Returns `AuthzError::StaffOnly` naming `action` otherwise.
pub fn require_staff(auth: &AuthContext, action: &'static str) -> Result<(), AuthzError> {
    match auth.role {
        Role::Staff => Ok(()),
        Role::NonStaff => {
            warn!(username = %auth.username, action, "Staff-only action denied");
            Err(AuthzError::StaffOnly(action))
        }
    }
}
