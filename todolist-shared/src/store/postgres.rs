/// PostgreSQL Entity Store
///
/// Filters and partial updates are assembled with `sqlx::QueryBuilder`, so
/// every value is a bound parameter. Each write is a single statement:
/// `UPDATE ... RETURNING` is atomic per row, a soft delete only matches rows
/// that are not yet deleted, and hard-delete cascades come from the
/// `ON DELETE CASCADE` foreign keys on `tasks`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::debug;

use super::{EntityStore, Repository, StoreError, StoreResult, UserRepository};
use crate::db::pool::{close_pool, health_check};
use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::models::priority::{CreatePriority, Priority, UpdatePriority};
use crate::models::task::{CreateTask, Task, TaskChanges};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::models::Resource;
use crate::query::{ScopeFilter, TaskFilter};

const USER_COLUMNS: &str =
    "id, username, password_hash, is_staff, is_active, created_at, updated_at, last_login_at";

/// Table layout and SQL fragments for one resource type
trait SqlTable: Resource + for<'r> FromRow<'r, PgRow> + Unpin {
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    /// Pushes `INSERT INTO ... VALUES (...)`
    fn push_insert(qb: &mut QueryBuilder<'_, Postgres>, created_by: &str, input: Self::Create);

    /// Pushes `column = value` pairs for the supplied fields
    fn push_changes(set: &mut Separated<'_, '_, Postgres, &'static str>, changes: Self::Changes);

    /// Pushes ` AND ...` conditions
    fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Self::Filter);
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: &ScopeFilter) {
    if let Some(ref created_by) = scope.created_by {
        qb.push(" AND created_by = ").push_bind(created_by.clone());
    }
    if let Some(deleted) = scope.deleted {
        qb.push(" AND deleted = ").push_bind(deleted);
    }
}

impl SqlTable for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static str =
        "id, name, description, created_by, created_at, updated_at, deleted_at, deleted";

    fn push_insert(qb: &mut QueryBuilder<'_, Postgres>, created_by: &str, input: CreateCategory) {
        qb.push("INSERT INTO categories (name, description, created_by) VALUES (");
        qb.separated(", ")
            .push_bind(input.name)
            .push_bind(input.description)
            .push_bind(created_by.to_string());
        qb.push(")");
    }

    fn push_changes(set: &mut Separated<'_, '_, Postgres, &'static str>, changes: UpdateCategory) {
        if let Some(name) = changes.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(description) = changes.description {
            set.push("description = ").push_bind_unseparated(description);
        }
    }

    fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ScopeFilter) {
        push_scope(qb, filter);
    }
}

impl SqlTable for Priority {
    const TABLE: &'static str = "priorities";
    const COLUMNS: &'static str =
        "id, name, created_by, created_at, updated_at, deleted_at, deleted";

    fn push_insert(qb: &mut QueryBuilder<'_, Postgres>, created_by: &str, input: CreatePriority) {
        qb.push("INSERT INTO priorities (name, created_by) VALUES (");
        qb.separated(", ")
            .push_bind(input.name)
            .push_bind(created_by.to_string());
        qb.push(")");
    }

    fn push_changes(set: &mut Separated<'_, '_, Postgres, &'static str>, changes: UpdatePriority) {
        if let Some(name) = changes.name {
            set.push("name = ").push_bind_unseparated(name);
        }
    }

    fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ScopeFilter) {
        push_scope(qb, filter);
    }
}

impl SqlTable for Task {
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static str = "id, created_by, title, description, status, completed, \
         created_at, completed_at, updated_at, deleted_at, deleted, category_id, priority_id";

    fn push_insert(qb: &mut QueryBuilder<'_, Postgres>, created_by: &str, input: CreateTask) {
        qb.push(
            "INSERT INTO tasks \
             (created_by, title, description, status, completed, category_id, priority_id) VALUES (",
        );
        qb.separated(", ")
            .push_bind(created_by.to_string())
            .push_bind(input.title)
            .push_bind(input.description)
            .push_bind(input.status)
            .push_bind(input.completed)
            .push_bind(input.category_id)
            .push_bind(input.priority_id);
        qb.push(")");
    }

    fn push_changes(set: &mut Separated<'_, '_, Postgres, &'static str>, changes: TaskChanges) {
        let fields = changes.fields;
        if let Some(title) = fields.title {
            set.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = fields.description {
            set.push("description = ").push_bind_unseparated(description);
        }
        if let Some(status) = fields.status {
            set.push("status = ").push_bind_unseparated(status);
        }
        if let Some(completed) = fields.completed {
            set.push("completed = ").push_bind_unseparated(completed);
        }
        if let Some(category_id) = fields.category_id {
            set.push("category_id = ").push_bind_unseparated(category_id);
        }
        if let Some(priority_id) = fields.priority_id {
            set.push("priority_id = ").push_bind_unseparated(priority_id);
        }
        set.push("completed_at = ").push_bind_unseparated(changes.completed_at);
    }

    fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
        push_scope(qb, &filter.scope);
        if let Some(ref status) = filter.status {
            qb.push(" AND status = ").push_bind(status.clone());
        }
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(priority_id) = filter.priority_id {
            qb.push(" AND priority_id = ").push_bind(priority_id);
        }
    }
}

/// Entity Store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps a pool whose schema is already migrated
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert<E: SqlTable>(&self, created_by: &str, input: E::Create) -> StoreResult<E> {
        let mut qb = QueryBuilder::new("");
        E::push_insert(&mut qb, created_by, input);
        qb.push(" RETURNING ").push(E::COLUMNS);

        let row = qb.build_query_as::<E>().fetch_one(&self.pool).await?;
        debug!(table = E::TABLE, id = row.id(), "Inserted row");
        Ok(row)
    }

    async fn find<E: SqlTable>(&self, id: i64) -> StoreResult<Option<E>> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", E::COLUMNS, E::TABLE);
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn select<E: SqlTable>(&self, filter: &E::Filter) -> StoreResult<Vec<E>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM {} WHERE TRUE", E::COLUMNS, E::TABLE));
        E::push_filter(&mut qb, filter);
        qb.push(" ORDER BY id");

        let rows = qb.build_query_as::<E>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn modify<E: SqlTable>(&self, id: i64, changes: E::Changes) -> StoreResult<Option<E>> {
        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
        {
            let mut set = qb.separated(", ");
            set.push("updated_at = NOW()");
            E::push_changes(&mut set, changes);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(E::COLUMNS);

        let row = qb.build_query_as::<E>().fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn flag_deleted<E: SqlTable>(&self, id: i64, at: DateTime<Utc>) -> StoreResult<Option<E>> {
        let sql = format!(
            "UPDATE {} SET deleted = TRUE, deleted_at = $1, updated_at = $1 \
             WHERE id = $2 AND deleted = FALSE RETURNING {}",
            E::TABLE,
            E::COLUMNS
        );
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(at)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn remove<E: SqlTable>(&self, id: i64) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

macro_rules! pg_repository {
    ($ty:ty) => {
        #[async_trait]
        impl Repository<$ty> for PgStore {
            async fn create(
                &self,
                created_by: &str,
                input: <$ty as Resource>::Create,
            ) -> StoreResult<$ty> {
                self.insert::<$ty>(created_by, input).await
            }

            async fn get(&self, id: i64) -> StoreResult<Option<$ty>> {
                self.find::<$ty>(id).await
            }

            async fn filter(&self, filter: &<$ty as Resource>::Filter) -> StoreResult<Vec<$ty>> {
                self.select::<$ty>(filter).await
            }

            async fn update(
                &self,
                id: i64,
                changes: <$ty as Resource>::Changes,
            ) -> StoreResult<Option<$ty>> {
                self.modify::<$ty>(id, changes).await
            }

            async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> StoreResult<Option<$ty>> {
                self.flag_deleted::<$ty>(id, at).await
            }

            async fn hard_delete(&self, id: i64) -> StoreResult<bool> {
                self.remove::<$ty>(id).await
            }
        }
    };
}

pg_repository!(Category);
pg_repository!(Priority);
pg_repository!(Task);

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, input: CreateUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, is_staff) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(input.is_staff)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::Conflict(format!("Username '{}' already exists", input.username))
                }
                other => StoreError::Database(other),
            })
    }

    async fn get(&self, id: i64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn update(&self, id: i64, changes: UpdateUser) -> StoreResult<Option<User>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut set = qb.separated(", ");
            set.push("updated_at = NOW()");
            if let Some(password_hash) = changes.password_hash {
                set.push("password_hash = ").push_bind_unseparated(password_hash);
            }
            if let Some(is_staff) = changes.is_staff {
                set.push("is_staff = ").push_bind_unseparated(is_staff);
            }
            if let Some(is_active) = changes.is_active {
                set.push("is_active = ").push_bind_unseparated(is_active);
            }
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(USER_COLUMNS);

        let user = qb.build_query_as::<User>().fetch_optional(&self.pool).await?;
        Ok(user)
    }

    async fn hard_delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_login(&self, id: i64) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore for PgStore {
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
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        close_pool(self.pool.clone()).await;
    }
}
