/// Entity Store
///
/// Persistence abstraction for categories, priorities, tasks and users.
/// Handlers and services depend on [`EntityStore`] only; two backends
/// implement it:
///
/// - [`memory::MemoryStore`]: tables behind one `tokio::sync::RwLock`, for
///   development and tests
/// - [`postgres::PgStore`]: PostgreSQL through sqlx
///
/// The store enforces no access rules. Callers reach it after the
/// access-control gate has decided.
///
/// # Example
///
/// ```no_run
/// use todolist_shared::models::priority::CreatePriority;
/// use todolist_shared::query::ScopeFilter;
/// use todolist_shared::store::{memory::MemoryStore, EntityStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store
///     .priorities()
///     .create("alice", CreatePriority { name: "High".to_string() })
///     .await?;
///
/// let active = store.priorities().filter(&ScopeFilter::active()).await?;
/// assert_eq!(active.len(), 1);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::category::Category;
use crate::models::priority::Priority;
use crate::models::task::Task;
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::models::Resource;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD and filtering for one soft-deletable resource type
///
/// Lookups by ID ignore the deleted flag; visibility is the caller's
/// business. Results of [`Repository::filter`] are ordered by ascending ID,
/// which is creation order.
#[async_trait]
pub trait Repository<E: Resource>: Send + Sync {
    /// Inserts a row owned by `created_by`
    async fn create(&self, created_by: &str, input: E::Create) -> StoreResult<E>;

    /// Finds a row by ID, deleted or not
    async fn get(&self, id: i64) -> StoreResult<Option<E>>;

    /// Rows matching `filter`, in creation order
    async fn filter(&self, filter: &E::Filter) -> StoreResult<Vec<E>>;

    /// Applies a partial update atomically
    ///
    /// Returns `None` if the row does not exist.
    async fn update(&self, id: i64, changes: E::Changes) -> StoreResult<Option<E>>;

    /// Flags the row deleted at `at`
    ///
    /// Returns `None` if the row does not exist or is already deleted, so
    /// the first deletion time is never overwritten.
    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> StoreResult<Option<E>>;

    /// Removes the row permanently
    ///
    /// Removing a category or priority also removes the tasks that
    /// reference it. Returns `false` if the row did not exist.
    async fn hard_delete(&self, id: i64) -> StoreResult<bool>;
}

/// User accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user
    ///
    /// # Errors
    ///
    /// `StoreError::Conflict` if the username is taken
    async fn create(&self, input: CreateUser) -> StoreResult<User>;

    async fn get(&self, id: i64) -> StoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// All users, active or not, in creation order
    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn update(&self, id: i64, changes: UpdateUser) -> StoreResult<Option<User>>;

    /// Clears the active flag; the account can no longer authenticate
    async fn deactivate(&self, id: i64) -> StoreResult<Option<User>> {
        let changes = UpdateUser {
            is_active: Some(false),
            ..Default::default()
        };
        self.update(id, changes).await
    }

    async fn hard_delete(&self, id: i64) -> StoreResult<bool>;

    /// Stamps `last_login_at` with the current time
    async fn record_login(&self, id: i64) -> StoreResult<()>;
}

/// Every repository plus a reachability probe
#[async_trait]
pub trait EntityStore: Send + Sync {
    fn categories(&self) -> &dyn Repository<Category>;

    fn priorities(&self) -> &dyn Repository<Priority>;

    fn tasks(&self) -> &dyn Repository<Task>;

    fn users(&self) -> &dyn UserRepository;

    /// Backend name reported by the health endpoint
    fn backend(&self) -> &'static str;

    /// Checks that the backend answers
    async fn health_check(&self) -> StoreResult<()>;

    /// Releases backend resources at shutdown
    async fn close(&self) {}
}
