/// Task endpoints
///
/// - `GET /v1/tasks`: List visible tasks
/// - `POST /v1/tasks`: Create a task
/// - `GET /v1/tasks/:id`: Retrieve a task
/// - `PATCH /v1/tasks/:id`: Partially update a task
/// - `DELETE /v1/tasks/:id`: Delete a task (soft for owners, hard for staff)
/// - `GET /v1/tasks/status/:status`: Tasks with an exact status
/// - `GET /v1/tasks/category/:id`: Tasks in a category
/// - `GET /v1/tasks/priority/:id`: Tasks with a priority
///
/// All routes require a bearer token. Non-staff users only ever see their
/// own active tasks; staff see everything, soft-deleted rows included.

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use todolist_shared::auth::middleware::AuthContext;
use todolist_shared::models::task::{CreateTask, Task, UpdateTask, DEFAULT_STATUS};
use todolist_shared::query::TaskCriteria;
use todolist_shared::service::tasks;
use validator::Validate;

/// Create task request
///
/// ```json
/// { "title": "Write report", "category": 1, "priority": 3 }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_status")]
    #[validate(length(min = 1, max = 20, message = "Status must be 1-20 characters"))]
    pub status: String,

    #[serde(default)]
    pub completed: bool,

    /// Category ID
    pub category: i64,

    /// Priority ID
    pub priority: i64,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl From<CreateTaskRequest> for CreateTask {
    fn from(req: CreateTaskRequest) -> Self {
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            completed: req.completed,
            category_id: req.category,
            priority_id: req.priority,
        }
    }
}

/// Partial update request; omitted fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(length(min = 1, max = 20, message = "Status must be 1-20 characters"))]
    pub status: Option<String>,

    pub completed: Option<bool>,

    pub category: Option<i64>,

    pub priority: Option<i64>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            completed: req.completed,
            category_id: req.category,
            priority_id: req.priority,
        }
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let rows = tasks::list_tasks(state.store(), &auth, TaskCriteria::All).await?;
    Ok(Json(rows))
}

/// Creates a task owned by the caller
///
/// # Errors
///
/// - `404 Not Found`: A non-staff caller referenced a category or priority
///   they cannot see
/// - `422 Unprocessable Entity`: Invalid fields, or a staff caller referenced
///   a row that does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let task = tasks::create_task(state.store(), &auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn retrieve_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = tasks::retrieve_task(state.store(), &auth, id).await?;
    Ok(Json(task))
}

/// Partially updates a task
///
/// # Errors
///
/// - `403 Forbidden`: The task belongs to someone else
/// - `404 Not Found`: Missing, or soft-deleted for a non-staff caller
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = tasks::update_task(state.store(), &auth, id, req.into()).await?;
    Ok(Json(task))
}

/// Deletes a task
///
/// The owner's delete only flags the row; a staff delete removes it. Either
/// way the response is `204 No Content`.
pub async fn destroy_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    tasks::destroy_task(state.store(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn tasks_by_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(status): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let rows = tasks::list_tasks(state.store(), &auth, TaskCriteria::Status(status)).await?;
    Ok(Json(rows))
}

pub async fn tasks_by_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(category_id): Path<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    let rows = tasks::list_tasks(state.store(), &auth, TaskCriteria::Category(category_id)).await?;
    Ok(Json(rows))
}

pub async fn tasks_by_priority(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(priority_id): Path<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    let rows = tasks::list_tasks(state.store(), &auth, TaskCriteria::Priority(priority_id)).await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateTaskRequest =
            serde_json::from_str(r#"{"title":"Write report","category":1,"priority":2}"#).unwrap();

        assert_eq!(req.status, "Pending");
        assert!(!req.completed);
        assert!(req.description.is_empty());
        assert!(req.validate().is_ok());

        let input = CreateTask::from(req);
        assert_eq!(input.category_id, 1);
        assert_eq!(input.priority_id, 2);
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateTaskRequest {
            title: String::new(),
            description: String::new(),
            status: "x".repeat(21),
            completed: false,
            category: 1,
            priority: 1,
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("status"));
    }

    #[test]
    fn test_update_request_is_partial() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert!(req.validate().is_ok());

        let fields = UpdateTask::from(req);
        assert_eq!(fields.completed, Some(true));
        assert!(fields.title.is_none());
        assert!(fields.category_id.is_none());

        let req = UpdateTaskRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
