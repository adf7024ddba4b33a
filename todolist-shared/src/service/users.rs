/// Account management
///
/// Listing and creating accounts is reserved for staff. Retrieve, update and
/// delete go through the access-control gate with the account itself as the
/// owned row: users may read and change their own account, and deactivation
/// plays the part of soft deletion.
///
/// Non-staff users may change only their own password. The username never
/// changes.

use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, require_staff, AuthzError, Disposal, Operation};
use crate::auth::middleware::AuthContext;
use crate::auth::ownership::Owned;
use crate::auth::password::{hash_password, validate_password_strength};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::store::EntityStore;

/// Input for creating an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,

    /// Plaintext password, hashed before storage
    pub password: String,

    pub is_staff: bool,
}

/// Requested account changes
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    /// New plaintext password
    pub password: Option<String>,

    pub is_staff: Option<bool>,

    pub is_active: Option<bool>,
}

fn hash_new_password(password: &str) -> ServiceResult<String> {
    validate_password_strength(password).map_err(|message| ServiceError::Invalid {
        field: "password",
        message,
    })?;
    Ok(hash_password(password)?)
}

async fn fetch_user(
    store: &dyn EntityStore,
    auth: &AuthContext,
    operation: Operation,
    id: i64,
) -> ServiceResult<(User, Disposal)> {
    let user = store
        .users()
        .get(id)
        .await?
        .ok_or(AuthzError::NotFound(User::KIND))?;
    let grant = authorize(auth, operation, &user)?;
    Ok((user, grant.disposal()))
}

/// Every account, active or not (staff only)
pub async fn list_users(store: &dyn EntityStore, auth: &AuthContext) -> ServiceResult<Vec<User>> {
    require_staff(auth, "list users")?;
    Ok(store.users().list().await?)
}

/// Creates an account (staff only)
///
/// # Errors
///
/// - `StaffOnly` for non-staff callers
/// - `Invalid` if the password fails the strength rule
/// - `Store(Conflict)` if the username is taken
pub async fn create_user(
    store: &dyn EntityStore,
    auth: &AuthContext,
    account: NewAccount,
) -> ServiceResult<User> {
    require_staff(auth, "create users")?;
    let password_hash = hash_new_password(&account.password)?;

    let user = store
        .users()
        .create(CreateUser {
            username: account.username,
            password_hash,
            is_staff: account.is_staff,
        })
        .await?;

    info!(user_id = user.id, username = %user.username, is_staff = user.is_staff, created_by = %auth.username, "User created");
    Ok(user)
}

pub async fn retrieve_user(store: &dyn EntityStore, auth: &AuthContext, id: i64) -> ServiceResult<User> {
    let (user, _) = fetch_user(store, auth, Operation::Retrieve, id).await?;
    Ok(user)
}

/// Updates an account
///
/// # Errors
///
/// - `StaffOnly` if a non-staff caller changes `is_staff` or `is_active`
/// - `Invalid` if the new password fails the strength rule
pub async fn update_user(
    store: &dyn EntityStore,
    auth: &AuthContext,
    id: i64,
    changes: AccountChanges,
) -> ServiceResult<User> {
    fetch_user(store, auth, Operation::Update, id).await?;

    if changes.is_staff.is_some() || changes.is_active.is_some() {
        require_staff(auth, "change account privileges")?;
    }

    let password_hash = changes
        .password
        .as_deref()
        .map(hash_new_password)
        .transpose()?;

    let user = store
        .users()
        .update(
            id,
            UpdateUser {
                password_hash,
                is_staff: changes.is_staff,
                is_active: changes.is_active,
            },
        )
        .await?
        .ok_or(AuthzError::NotFound(User::KIND))?;

    info!(user_id = id, updated_by = %auth.username, "User updated");
    Ok(user)
}

/// Removes an account (staff) or deactivates the caller's own account
pub async fn destroy_user(
    store: &dyn EntityStore,
    auth: &AuthContext,
    id: i64,
) -> ServiceResult<Disposal> {
    let (_, disposal) = fetch_user(store, auth, Operation::Delete, id).await?;

    let done = match disposal {
        Disposal::HardDelete => store.users().hard_delete(id).await?,
        Disposal::SoftDelete => store.users().deactivate(id).await?.is_some(),
    };
    if !done {
        return Err(AuthzError::NotFound(User::KIND).into());
    }

    info!(user_id = id, deleted_by = %auth.username, ?disposal, "User deleted");
    Ok(disposal)
}
