/// Priority endpoints
///
/// Same access rules as categories.

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use todolist_shared::auth::middleware::AuthContext;
use todolist_shared::models::priority::{CreatePriority, Priority, UpdatePriority};
use todolist_shared::service::resources;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePriorityRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePriorityRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,
}

pub async fn list_priorities(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Priority>>> {
    let rows = resources::list(state.store().priorities(), &auth).await?;
    Ok(Json(rows))
}

pub async fn create_priority(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreatePriorityRequest>,
) -> ApiResult<(StatusCode, Json<Priority>)> {
    req.validate()?;

    let priority = resources::create(
        state.store().priorities(),
        &auth,
        CreatePriority { name: req.name },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(priority)))
}

pub async fn retrieve_priority(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Priority>> {
    let priority = resources::retrieve(state.store().priorities(), &auth, id).await?;
    Ok(Json(priority))
}

pub async fn update_priority(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdatePriorityRequest>,
) -> ApiResult<Json<Priority>> {
    req.validate()?;

    let priority = resources::update(
        state.store().priorities(),
        &auth,
        id,
        UpdatePriority { name: req.name },
    )
    .await?;
    Ok(Json(priority))
}

pub async fn destroy_priority(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    resources::destroy(state.store().priorities(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
