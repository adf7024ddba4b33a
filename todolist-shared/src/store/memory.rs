/// In-memory Entity Store
///
/// All tables live behind a single `tokio::sync::RwLock`, so every write
/// (including a hard delete and its cascade) is atomic with respect to
/// other requests. IDs come from a per-table counter and start at 1.
///
/// Used when no `DATABASE_URL` is configured and throughout the tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{EntityStore, Repository, StoreError, StoreResult, UserRepository};
use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::models::priority::{CreatePriority, Priority, UpdatePriority};
use crate::models::soft_delete::soft_delete;
use crate::models::task::{CreateTask, Task, TaskChanges};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::models::Resource;
use crate::query::Matches;

struct Table<E> {
    rows: BTreeMap<i64, E>,
    last_id: i64,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E: Clone> Table<E> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> E) -> E {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }
}

#[derive(Default)]
struct Tables {
    categories: Table<Category>,
    priorities: Table<Priority>,
    tasks: Table<Task>,
    users: Table<User>,
}

/// Storage hooks for one resource type
trait MemoryRow: Resource {
    fn table(tables: &Tables) -> &Table<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;

    fn build(id: i64, created_by: &str, input: Self::Create, now: DateTime<Utc>) -> Self;

    fn apply(&mut self, changes: Self::Changes, now: DateTime<Utc>);

    /// Removes rows that reference the hard-deleted row `id`
    fn cascade(_tables: &mut Tables, _id: i64) {}
}

impl MemoryRow for Category {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.categories
    }

    fn build(id: i64, created_by: &str, input: CreateCategory, now: DateTime<Utc>) -> Self {
        Category {
            id,
            name: input.name,
            description: input.description,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            deleted: false,
        }
    }

    fn apply(&mut self, changes: UpdateCategory, now: DateTime<Utc>) {
        changes.apply(self, now);
    }

    fn cascade(tables: &mut Tables, id: i64) {
        let before = tables.tasks.rows.len();
        tables.tasks.rows.retain(|_, task| task.category_id != id);
        debug!(category_id = id, removed = before - tables.tasks.rows.len(), "Cascaded to tasks");
    }
}

impl MemoryRow for Priority {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.priorities
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.priorities
    }

    fn build(id: i64, created_by: &str, input: CreatePriority, now: DateTime<Utc>) -> Self {
        Priority {
            id,
            name: input.name,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            deleted: false,
        }
    }

    fn apply(&mut self, changes: UpdatePriority, now: DateTime<Utc>) {
        changes.apply(self, now);
    }

    fn cascade(tables: &mut Tables, id: i64) {
        let before = tables.tasks.rows.len();
        tables.tasks.rows.retain(|_, task| task.priority_id != id);
        debug!(priority_id = id, removed = before - tables.tasks.rows.len(), "Cascaded to tasks");
    }
}

impl MemoryRow for Task {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.tasks
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.tasks
    }

    fn build(id: i64, created_by: &str, input: CreateTask, now: DateTime<Utc>) -> Self {
        Task {
            id,
            created_by: created_by.to_string(),
            title: input.title,
            description: input.description,
            status: input.status,
            completed: input.completed,
            created_at: now,
            completed_at: None,
            updated_at: now,
            deleted_at: None,
            deleted: false,
            category_id: input.category_id,
            priority_id: input.priority_id,
        }
    }

    fn apply(&mut self, changes: TaskChanges, now: DateTime<Utc>) {
        changes.apply(self, now);
    }
}

/// Entity Store held in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn insert<E: MemoryRow>(&self, created_by: &str, input: E::Create) -> E {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        E::table_mut(&mut tables).insert_with(|id| E::build(id, created_by, input, now))
    }

    async fn find<E: MemoryRow>(&self, id: i64) -> Option<E> {
        let tables = self.tables.read().await;
        E::table(&tables).rows.get(&id).cloned()
    }

    async fn select<E: MemoryRow>(&self, filter: &E::Filter) -> Vec<E> {
        let tables = self.tables.read().await;
        E::table(&tables)
            .rows
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect()
    }

    async fn modify<E: MemoryRow>(&self, id: i64, changes: E::Changes) -> Option<E> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let row = E::table_mut(&mut tables).rows.get_mut(&id)?;
        row.apply(changes, now);
        Some(row.clone())
    }

    async fn flag_deleted<E: MemoryRow>(&self, id: i64, at: DateTime<Utc>) -> Option<E> {
        let mut tables = self.tables.write().await;
        let row = E::table_mut(&mut tables).rows.get_mut(&id)?;
        soft_delete(row, at).then(|| row.clone())
    }

    async fn remove<E: MemoryRow>(&self, id: i64) -> bool {
        let mut tables = self.tables.write().await;
        let removed = E::table_mut(&mut tables).rows.remove(&id).is_some();
        if removed {
            E::cascade(&mut tables, id);
        }
        removed
    }
}

macro_rules! memory_repository {
    ($ty:ty) => {
        #[async_trait]
        impl Repository<$ty> for MemoryStore {
            async fn create(
                &self,
                created_by: &str,
                input: <$ty as Resource>::Create,
            ) -> StoreResult<$ty> {
                Ok(self.insert::<$ty>(created_by, input).await)
            }

            async fn get(&self, id: i64) -> StoreResult<Option<$ty>> {
                Ok(self.find::<$ty>(id).await)
            }

            async fn filter(&self, filter: &<$ty as Resource>::Filter) -> StoreResult<Vec<$ty>> {
                Ok(self.select::<$ty>(filter).await)
            }

            async fn update(
                &self,
                id: i64,
                changes: <$ty as Resource>::Changes,
            ) -> StoreResult<Option<$ty>> {
                Ok(self.modify::<$ty>(id, changes).await)
            }

            async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> StoreResult<Option<$ty>> {
                Ok(self.flag_deleted::<$ty>(id, at).await)
            }

            async fn hard_delete(&self, id: i64) -> StoreResult<bool> {
                Ok(self.remove::<$ty>(id).await)
            }
        }
    };
}

memory_repository!(Category);
memory_repository!(Priority);
memory_repository!(Task);

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, input: CreateUser) -> StoreResult<User> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;

        if tables.users.rows.values().any(|u| u.username == input.username) {
            return Err(StoreError::Conflict(format!(
                "Username '{}' already exists",
                input.username
            )));
        }

        Ok(tables.users.insert_with(|id| User {
            id,
            username: input.username,
            password_hash: input.password_hash,
            is_staff: input.is_staff,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }))
    }

    async fn get(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.rows.values().cloned().collect())
    }

    async fn update(&self, id: i64, changes: UpdateUser) -> StoreResult<Option<User>> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        Ok(tables.users.rows.get_mut(&id).map(|user| {
            changes.apply(user, now);
            user.clone()
        }))
    }

    async fn hard_delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.users.rows.remove(&id).is_some())
    }

    async fn record_login(&self, id: i64) -> StoreResult<()> {
        if let Some(user) = self.tables.write().await.users.rows.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    fn categories(&self) -> &dyn Repository<Category> {
        self
    }

    fn priorities(&self) -> &dyn Repository<Priority> {
        self
    }

    fn tasks(&self) -> &dyn Repository<Task> {
        self
    }

    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
