/// Application state and router builder
///
/// Handlers see tasks and users only through the `TaskStore` and `UserStore`
/// capabilities; which implementation backs them is decided here.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::cors::cors_layer};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::repository::{TaskRepository, TaskStore, UserRepository, UserStore};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; every field is a
/// cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (used directly only by the health check)
    pub db: PgPool,

    /// Task operations
    pub tasks: Arc<dyn TaskStore>,

    /// User operations
    pub users: Arc<dyn UserStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state backed by the PostgreSQL repositories
    pub fn new(db: PgPool, config: Config) -> Self {
        let tasks = Arc::new(TaskRepository::new(db.clone()));
        let users = Arc::new(UserRepository::new(db.clone()));
        Self::with_stores(db, tasks, users, config)
    }

    /// Creates state over caller-supplied store implementations
    pub fn with_stores(
        db: PgPool,
        tasks: Arc<dyn TaskStore>,
        users: Arc<dyn UserStore>,
        config: Config,
    ) -> Self {
        Self {
            db,
            tasks,
            users,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /health
/// ├── /task/
/// │   ├── POST /create
/// │   ├── GET  /get/:id
/// │   ├── POST /update
/// │   ├── POST /delete/:id
/// │   ├── GET  /list
/// │   ├── GET  /search
/// │   └── GET  /dashboard/:user_id
/// └── /user/
///     ├── POST /register
///     ├── POST /login
///     └── GET  /get/:id
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS allow-list, outermost so `OPTIONS` never reaches routing
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let task_routes = Router::new()
        .route("/create", post(routes::tasks::create_task))
        .route("/get/:id", get(routes::tasks::get_task))
        .route("/update", post(routes::tasks::update_task))
        .route("/delete/:id", post(routes::tasks::delete_task))
        .route("/list", get(routes::tasks::list_tasks))
        .route("/search", get(routes::tasks::search_tasks))
        .route("/dashboard/:user_id", get(routes::tasks::get_dashboard));

    let user_routes = Router::new()
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .route("/get/:id", get(routes::users::get_user));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/task", task_routes)
        .nest("/user", user_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(axum::middleware::from_fn_with_state(state.clone(), cors_layer))
        .with_state(state)
}
