/// Category endpoints
///
/// Categories are owned rows: non-staff users see and change only their own,
/// and their deletes are soft. Deleting a category as staff removes its
/// tasks too.

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use todolist_shared::auth::middleware::AuthContext;
use todolist_shared::models::category::{Category, CreateCategory, UpdateCategory};
use todolist_shared::service::resources;
use validator::Validate;

/// Create category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// Update category request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Category>>> {
    let rows = resources::list(state.store().categories(), &auth).await?;
    Ok(Json(rows))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    req.validate()?;

    let input = CreateCategory {
        name: req.name,
        description: req.description,
    };
    let category = resources::create(state.store().categories(), &auth, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn retrieve_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Category>> {
    let category = resources::retrieve(state.store().categories(), &auth, id).await?;
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Json<Category>> {
    req.validate()?;

    let changes = UpdateCategory {
        name: req.name,
        description: req.description,
    };
    let category = resources::update(state.store().categories(), &auth, id, changes).await?;
    Ok(Json(category))
}

pub async fn destroy_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    resources::destroy(state.store().categories(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
