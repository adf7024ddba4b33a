/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todolist_api::{app::{build_router, AppState}, config::Config};
/// use todolist_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, build_router(state)).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use todolist_shared::auth::middleware::authenticate;
use todolist_shared::store::EntityStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request by Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Entity Store (PostgreSQL or in-memory)
    pub store: Arc<dyn EntityStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                          # public
/// └── /v1/
///     ├── /auth/                           # public
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /tasks/                          # bearer auth
///     │   ├── GET, POST /
///     │   ├── GET, PATCH, DELETE /:id
///     │   ├── GET /status/:status
///     │   ├── GET /category/:id
///     │   └── GET /priority/:id
///     ├── /categories/   GET, POST / and GET, PATCH, DELETE /:id
///     ├── /priorities/   GET, POST / and GET, PATCH, DELETE /:id
///     └── /users/        GET, POST / and GET, PATCH, DELETE /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{auth, categories, health, priorities, tasks, users};

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh));

    let task_routes = Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/:id",
            get(tasks::retrieve_task)
                .patch(tasks::update_task)
                .delete(tasks::destroy_task),
        )
        .route("/status/:status", get(tasks::tasks_by_status))
        .route("/category/:id", get(tasks::tasks_by_category))
        .route("/priority/:id", get(tasks::tasks_by_priority));

    let category_routes = Router::new()
        .route("/", get(categories::list_categories).post(categories::create_category))
        .route(
            "/:id",
            get(categories::retrieve_category)
                .patch(categories::update_category)
                .delete(categories::destroy_category),
        );

    let priority_routes = Router::new()
        .route("/", get(priorities::list_priorities).post(priorities::create_priority))
        .route(
            "/:id",
            get(priorities::retrieve_priority)
                .patch(priorities::update_priority)
                .delete(priorities::destroy_priority),
        );

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/:id",
            get(users::retrieve_user)
                .patch(users::update_user)
                .delete(users::destroy_user),
        );

    let protected_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/categories", category_routes)
        .nest("/priorities", priority_routes)
        .nest("/users", user_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer authentication middleware
///
/// Resolves the token to an `AuthContext` and inserts it into request
/// extensions; anything else is a 401.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(state.store(), state.jwt_secret(), req.headers()).await?;
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
