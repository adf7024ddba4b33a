/// Task operations
///
/// Task writes validate the referenced category and priority with the
/// ownership resolver before anything is stored. Reads and deletes are the
/// generic resource operations.

use chrono::Utc;

use super::resources::{self, apply_update, fetch_authorized};
use super::ServiceResult;
use crate::auth::authorization::{Disposal, Operation};
use crate::auth::middleware::AuthContext;
use crate::auth::ownership::validate_reference;
use crate::models::task::{CreateTask, Task, TaskChanges, UpdateTask};
use crate::query::{filter_tasks, TaskCriteria};
use crate::store::EntityStore;

/// Tasks visible to `auth`, narrowed by `criteria`
pub async fn list_tasks(
    store: &dyn EntityStore,
    auth: &AuthContext,
    criteria: TaskCriteria,
) -> ServiceResult<Vec<Task>> {
    Ok(filter_tasks(store.tasks(), auth, criteria).await?)
}

pub async fn retrieve_task(store: &dyn EntityStore, auth: &AuthContext, id: i64) -> ServiceResult<Task> {
    resources::retrieve(store.tasks(), auth, id).await
}

/// Creates a task owned by the caller
///
/// # Errors
///
/// - `NotFound` if a non-staff caller references a category or priority
///   they do not own, or one that is soft-deleted; nothing is written
/// - `Invalid` if a staff caller references a row that does not exist
pub async fn create_task(
    store: &dyn EntityStore,
    auth: &AuthContext,
    input: CreateTask,
) -> ServiceResult<Task> {
    validate_reference(store.categories(), auth, "category", input.category_id).await?;
    validate_reference(store.priorities(), auth, "priority", input.priority_id).await?;

    resources::create(store.tasks(), auth, input).await
}

/// Partially updates a task
///
/// The gate runs first, then any supplied reference is validated. Omitted
/// fields keep their value; `completed_at` follows the completion rule of
/// [`TaskChanges`].
pub async fn update_task(
    store: &dyn EntityStore,
    auth: &AuthContext,
    id: i64,
    fields: UpdateTask,
) -> ServiceResult<Task> {
    fetch_authorized(store.tasks(), auth, Operation::Update, id).await?;

    if let Some(category_id) = fields.category_id {
        validate_reference(store.categories(), auth, "category", category_id).await?;
    }
    if let Some(priority_id) = fields.priority_id {
        validate_reference(store.priorities(), auth, "priority", priority_id).await?;
    }

    let changes = TaskChanges::new(fields, Utc::now());
    apply_update(store.tasks(), auth, id, changes).await
}

pub async fn destroy_task(
    store: &dyn EntityStore,
    auth: &AuthContext,
    id: i64,
) -> ServiceResult<Disposal> {
    resources::destroy(store.tasks(), auth, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authorization::AuthzError;
    use crate::auth::middleware::Role;
    use crate::models::category::{Category, CreateCategory};
    use crate::models::priority::{CreatePriority, Priority};
    use crate::query::TaskFilter;
    use crate::service::ServiceError;
    use crate::store::memory::MemoryStore;

    fn alice() -> AuthContext {
        AuthContext::new(1, "alice", Role::NonStaff)
    }

    fn bob() -> AuthContext {
        AuthContext::new(2, "bob", Role::NonStaff)
    }

    fn staff() -> AuthContext {
        AuthContext::new(3, "admin", Role::Staff)
    }

    async fn refs(store: &MemoryStore, auth: &AuthContext) -> (Category, Priority) {
        let category = resources::create(
            store.categories(),
            auth,
            CreateCategory {
                name: "Work".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap();
        let priority = resources::create(
            store.priorities(),
            auth,
            CreatePriority {
                name: "High".to_string(),
            },
        )
        .await
        .unwrap();
        (category, priority)
    }

    fn input(title: &str, category: &Category, priority: &Priority) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: String::new(),
            status: "Pending".to_string(),
            completed: false,
            category_id: category.id,
            priority_id: priority.id,
        }
    }

    #[tokio::test]
    async fn test_create_with_foreign_category_writes_nothing() {
        let store = MemoryStore::new();
        let (category, _) = refs(&store, &bob()).await;
        let (_, priority) = refs(&store, &alice()).await;

        let err = create_task(&store, &alice(), input("t", &category, &priority))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::NotFound("Category"))));

        let all = store.tasks().filter(&TaskFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_create_never_sets_completed_at() {
        let store = MemoryStore::new();
        let (category, priority) = refs(&store, &alice()).await;
        let mut new = input("t", &category, &priority);
        new.completed = true;

        let task = create_task(&store, &alice(), new).await.unwrap();
        assert!(task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.created_by, "alice");
    }

    #[tokio::test]
    async fn test_staff_may_reference_any_existing_row() {
        let store = MemoryStore::new();
        let (category, priority) = refs(&store, &bob()).await;

        let task = create_task(&store, &staff(), input("t", &category, &priority))
            .await
            .unwrap();
        assert_eq!(task.created_by, "admin");

        let mut missing = input("t", &category, &priority);
        missing.priority_id = 999;
        let err = create_task(&store, &staff(), missing).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "priority", .. }));
    }

    #[tokio::test]
    async fn test_update_completion_stamps_and_clears() {
        let store = MemoryStore::new();
        let (category, priority) = refs(&store, &alice()).await;
        let task = create_task(&store, &alice(), input("t", &category, &priority))
            .await
            .unwrap();

        let done = update_task(
            &store,
            &alice(),
            task.id,
            UpdateTask {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(done.completed_at.is_some());

        let renamed = update_task(
            &store,
            &alice(),
            task.id,
            UpdateTask {
                title: Some("renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(renamed.completed);
        assert!(renamed.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_foreign_reference() {
        let store = MemoryStore::new();
        let (category, priority) = refs(&store, &alice()).await;
        let (foreign, _) = refs(&store, &bob()).await;
        let task = create_task(&store, &alice(), input("t", &category, &priority))
            .await
            .unwrap();

        let err = update_task(
            &store,
            &alice(),
            task.id,
            UpdateTask {
                category_id: Some(foreign.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::NotFound(_))));

        let stored = store.tasks().get(task.id).await.unwrap().unwrap();
        assert_eq!(stored.category_id, category.id);
    }

    #[tokio::test]
    async fn test_update_of_deleted_task_is_not_found() {
        let store = MemoryStore::new();
        let (category, priority) = refs(&store, &bob()).await;
        let task = create_task(&store, &bob(), input("t", &category, &priority))
            .await
            .unwrap();
        destroy_task(&store, &bob(), task.id).await.unwrap();

        let err = update_task(&store, &alice(), task.id, UpdateTask::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::NotFound("Task"))));
    }

    #[tokio::test]
    async fn test_filtered_views_share_visibility() {
        let store = MemoryStore::new();
        let (category, priority) = refs(&store, &alice()).await;
        let (bob_category, bob_priority) = refs(&store, &bob()).await;

        let mine = create_task(&store, &alice(), input("a", &category, &priority))
            .await
            .unwrap();
        let gone = create_task(&store, &alice(), input("b", &category, &priority))
            .await
            .unwrap();
        destroy_task(&store, &alice(), gone.id).await.unwrap();
        create_task(&store, &bob(), input("c", &bob_category, &bob_priority))
            .await
            .unwrap();

        let by_status = list_tasks(&store, &alice(), TaskCriteria::Status("Pending".to_string()))
            .await
            .unwrap();
        assert_eq!(by_status, vec![mine.clone()]);

        let by_category = list_tasks(&store, &alice(), TaskCriteria::Category(category.id))
            .await
            .unwrap();
        assert_eq!(by_category, vec![mine]);

        let foreign = list_tasks(&store, &alice(), TaskCriteria::Priority(bob_priority.id))
            .await
            .unwrap();
        assert!(foreign.is_empty());

        let staff_view = list_tasks(&store, &staff(), TaskCriteria::All).await.unwrap();
        assert_eq!(staff_view.len(), 3, "staff task listing includes soft-deleted rows");
    }
}
