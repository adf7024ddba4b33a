/// Generic operations for owned, soft-deletable resources
///
/// Categories and priorities go through these functions unchanged; task
/// writes add reference validation on top (see [`super::tasks`]).
///
/// # Example
///
/// ```no_run
/// use todolist_shared::auth::middleware::{AuthContext, Role};
/// use todolist_shared::models::priority::CreatePriority;
/// use todolist_shared::service::resources;
/// use todolist_shared::store::{memory::MemoryStore, EntityStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let alice = AuthContext::new(1, "alice", Role::NonStaff);
///
/// let high = resources::create(
///     store.priorities(),
///     &alice,
///     CreatePriority { name: "High".to_string() },
/// )
/// .await?;
/// let mine = resources::list(store.priorities(), &alice).await?;
/// assert_eq!(mine, vec![high]);
/// # Ok(())
/// # }
/// ```

use chrono::Utc;
use tracing::{debug, info};

use super::ServiceResult;
use crate::auth::authorization::{authorize, list_scope, AuthzError, Disposal, Grant, Operation};
use crate::auth::middleware::AuthContext;
use crate::models::Resource;
use crate::store::Repository;

/// Rows of `E` visible to `auth`, in creation order
pub async fn list<E: Resource>(repo: &dyn Repository<E>, auth: &AuthContext) -> ServiceResult<Vec<E>> {
    let filter: E::Filter = list_scope::<E>(auth).into();
    let rows = repo.filter(&filter).await?;

    debug!(kind = E::KIND, username = %auth.username, count = rows.len(), "Listed rows");
    Ok(rows)
}

/// Loads row `id` and runs the gate for `operation`
///
/// A missing row is `NotFound`, exactly like a hidden one.
pub async fn fetch_authorized<E: Resource>(
    repo: &dyn Repository<E>,
    auth: &AuthContext,
    operation: Operation,
    id: i64,
) -> ServiceResult<(E, Grant)> {
    let row = repo.get(id).await?.ok_or(AuthzError::NotFound(E::KIND))?;
    let grant = authorize(auth, operation, &row)?;
    Ok((row, grant))
}

pub async fn retrieve<E: Resource>(
    repo: &dyn Repository<E>,
    auth: &AuthContext,
    id: i64,
) -> ServiceResult<E> {
    let (row, _) = fetch_authorized(repo, auth, Operation::Retrieve, id).await?;
    Ok(row)
}

/// Creates a row owned by the caller
pub async fn create<E: Resource>(
    repo: &dyn Repository<E>,
    auth: &AuthContext,
    input: E::Create,
) -> ServiceResult<E> {
    let row = repo.create(&auth.username, input).await?;

    info!(kind = E::KIND, id = row.id(), created_by = %auth.username, "Created row");
    Ok(row)
}

/// Applies a partial update after the gate allows it
pub async fn update<E: Resource>(
    repo: &dyn Repository<E>,
    auth: &AuthContext,
    id: i64,
    changes: E::Changes,
) -> ServiceResult<E> {
    fetch_authorized(repo, auth, Operation::Update, id).await?;
    apply_update(repo, auth, id, changes).await
}

/// Writes an update the caller has already been authorized for
pub(crate) async fn apply_update<E: Resource>(
    repo: &dyn Repository<E>,
    auth: &AuthContext,
    id: i64,
    changes: E::Changes,
) -> ServiceResult<E> {
    let row = repo
        .update(id, changes)
        .await?
        .ok_or(AuthzError::NotFound(E::KIND))?;

    info!(kind = E::KIND, id, username = %auth.username, "Updated row");
    Ok(row)
}

/// Deletes row `id`: permanently for staff, softly for the owner
///
/// Returns how the row was disposed of. A soft delete that loses a race
/// with another delete reports `NotFound`.
pub async fn destroy<E: Resource>(
    repo: &dyn Repository<E>,
    auth: &AuthContext,
    id: i64,
) -> ServiceResult<Disposal> {
    let (_, grant) = fetch_authorized(repo, auth, Operation::Delete, id).await?;
    let disposal = grant.disposal();

    let done = match disposal {
        Disposal::HardDelete => repo.hard_delete(id).await?,
        Disposal::SoftDelete => repo.soft_delete(id, Utc::now()).await?.is_some(),
    };
    if !done {
        return Err(AuthzError::NotFound(E::KIND).into());
    }

    info!(kind = E::KIND, id, username = %auth.username, ?disposal, "Deleted row");
    Ok(disposal)
}
