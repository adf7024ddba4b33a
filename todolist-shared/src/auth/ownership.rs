/// Ownership resolution
///
/// Rows record their owner by username. [`Owned`] exposes the owner and the
/// active state of a row; [`validate_reference`] checks that a category or
/// priority referenced by a task write is usable by the caller.

use tracing::debug;

use super::authorization::AuthzError;
use super::middleware::{AuthContext, Role};
use crate::models::Resource;
use crate::service::{ServiceError, ServiceResult};
use crate::store::Repository;

/// Record with an owner and an active/deleted state
pub trait Owned {
    /// Name used in error messages ("Task", "Category", ...)
    const KIND: &'static str;

    /// Username of the owner
    fn owner(&self) -> &str;

    /// `false` once the row is soft-deleted (or the user deactivated)
    fn is_active(&self) -> bool;
}

/// Whether `auth` owns `resource`
pub fn owns<R: Owned + ?Sized>(auth: &AuthContext, resource: &R) -> bool {
    resource.owner() == auth.username
}

/// Validates a reference to an `E` row held in field `field`
///
/// - Non-staff callers must own the row and it must not be soft-deleted.
///   Anything else is reported as `NotFound`, so other users' rows stay
///   invisible.
/// - Staff callers only need the row to exist.
///
/// # Errors
///
/// - `ServiceError::Authz(NotFound)` for a non-staff caller
/// - `ServiceError::Invalid` naming `field` for a staff caller
/// - `ServiceError::Store` if the lookup fails
pub async fn validate_reference<E: Resource>(
    repo: &dyn Repository<E>,
    auth: &AuthContext,
    field: &'static str,
    id: i64,
) -> ServiceResult<()> {
    let row = repo.get(id).await?;

    match auth.role {
        Role::Staff => match row {
            Some(_) => Ok(()),
            None => Err(ServiceError::Invalid {
                field,
                message: format!("Invalid pk \"{}\" - object does not exist.", id),
            }),
        },
        Role::NonStaff => match row {
            Some(row) if owns(auth, &row) && row.is_active() => Ok(()),
            _ => {
                debug!(username = %auth.username, kind = E::KIND, id, "Reference not usable");
                Err(AuthzError::NotFound(E::KIND).into())
            }
        },
    }
}
