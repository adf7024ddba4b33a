/// User account endpoints
///
/// Listing and creating accounts is staff-only. A non-staff user can read,
/// change the password of, and deactivate only their own account.

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use todolist_shared::auth::middleware::AuthContext;
use todolist_shared::models::user::User;
use todolist_shared::service::users::{self, AccountChanges, NewAccount};
use validator::Validate;

/// Create user request (staff only)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    /// Checked against the password strength rule
    pub password: String,

    #[serde(default)]
    pub is_staff: bool,
}

/// Update user request
///
/// `is_staff` and `is_active` may only be changed by staff.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<User>>> {
    let rows = users::list_users(state.store(), &auth).await?;
    Ok(Json(rows))
}

/// Creates an account
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not staff
/// - `409 Conflict`: Username already taken
/// - `422 Unprocessable Entity`: Invalid username or weak password
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let account = NewAccount {
        username: req.username,
        password: req.password,
        is_staff: req.is_staff,
    };
    let user = users::create_user(state.store(), &auth, account).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn retrieve_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = users::retrieve_user(state.store(), &auth, id).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let changes = AccountChanges {
        password: req.password,
        is_staff: req.is_staff,
        is_active: req.is_active,
    };
    let user = users::update_user(state.store(), &auth, id, changes).await?;
    Ok(Json(user))
}

/// Deletes an account (staff) or deactivates the caller's own
pub async fn destroy_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    users::destroy_user(state.store(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
