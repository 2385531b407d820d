/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use todolist_api::{app::AppState, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::in_memory(config);
/// let app = todolist_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Extension, Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use todolist_shared::{
    auth::{
        authorization::require_admin,
        jwt::TokenService,
        middleware::{CurrentUser, IdentityResolver},
        password::PasswordHasher,
    },
    db::{PgTaskStore, PgUserStore},
    services::{AuthService, TaskService, UserService},
    store::{MemoryStore, TaskStore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

/// Storage backend behind the services
#[derive(Clone, Debug)]
pub enum Backend {
    /// Process-local storage, lost on restart
    Memory,

    /// PostgreSQL
    Postgres(PgPool),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Postgres(_) => "postgres",
        }
    }
}

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is an `Arc` or wraps `Arc`s, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Registration and login
    pub auth: AuthService,

    /// Profiles and admin user management
    pub users: UserService,

    /// Task operations
    pub tasks: TaskService,

    /// Bearer token to `CurrentUser`
    pub identity: IdentityResolver,

    /// Application configuration
    pub config: Arc<Config>,

    /// Storage in use
    pub backend: Backend,
}

impl AppState {
    /// State backed by a fresh in-memory store
    pub fn in_memory(config: Config) -> Self {
        let store = MemoryStore::new();
        let users: Arc<dyn UserStore> = Arc::new(store.clone());
        let tasks: Arc<dyn TaskStore> = Arc::new(store);
        Self::with_stores(users, tasks, config, Backend::Memory)
    }

    /// State backed by PostgreSQL (migrations must already have run)
    pub fn postgres(pool: PgPool, config: Config) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
        let tasks: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool.clone()));
        Self::with_stores(users, tasks, config, Backend::Postgres(pool))
    }

    /// Wires the services over arbitrary stores
    pub fn with_stores(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        config: Config,
        backend: Backend,
    ) -> Self {
        let tokens = Arc::new(TokenService::with_ttl(
            &config.jwt.secret,
            chrono::Duration::hours(config.jwt.ttl_hours),
        ));
        let hasher = PasswordHasher::new(config.password.into());

        let auth = AuthService::new(users.clone(), hasher, tokens.clone());
        let identity = IdentityResolver::new(tokens, users.clone());

        Self {
            users: UserService::new(users, auth.clone()),
            tasks: TaskService::new(tasks),
            auth,
            identity,
            config: Arc::new(config),
            backend,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                      # public
/// ├── /auth/                           # public
/// │   ├── POST /register
/// │   └── POST /login
/// ├── /user/                           # bearer token
/// │   ├── GET|PUT /me
/// │   ├── GET /tasks
/// │   ├── POST /tasks/create
/// │   └── GET|PUT|DELETE /tasks/:id
/// └── /admin/                          # bearer token + ADMIN role
///     ├── /tasks/...
///     └── /users/...
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. CORS (tower-http CorsLayer)
/// 2. Logging (tower-http TraceLayer)
/// 3. Identity resolution (`/user` and `/admin`)
/// 4. Admin gate (`/admin` only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route("/me", get(routes::user::me).put(routes::user::update_me))
        .route("/tasks", get(routes::user::list_tasks))
        .route("/tasks/create", post(routes::user::create_task))
        .route(
            "/tasks/:id",
            get(routes::user::get_task)
                .put(routes::user::update_task)
                .delete(routes::user::delete_task),
        )
        .layer(middleware::from_fn_with_state(state.clone(), identity_layer));

    let admin_task_routes = Router::new()
        .route("/", post(routes::admin::tasks::create_task))
        .route("/all-tasks", get(routes::admin::tasks::list_tasks))
        .route("/task-by-id/:id", get(routes::admin::tasks::get_task))
        .route(
            "/:id",
            put(routes::admin::tasks::update_task).delete(routes::admin::tasks::delete_task),
        )
        .route("/by-status/:status", get(routes::admin::tasks::list_by_status))
        .route("/by-title/:title", get(routes::admin::tasks::exists_by_title))
        .route("/count/:user_id", get(routes::admin::tasks::count_by_owner))
        .route("/filter/:title", get(routes::admin::tasks::filter_by_title))
        .route("/delete/:status", delete(routes::admin::tasks::delete_by_status));

    let admin_user_routes = Router::new()
        .route("/all-users", get(routes::admin::users::list_users))
        .route("/user-by-id/:id", get(routes::admin::users::get_user))
        .route("/user-by-email/:email", get(routes::admin::users::get_by_email))
        .route("/exists-user/:username", get(routes::admin::users::exists_by_username))
        .route("/count-users/:email", get(routes::admin::users::count_by_email))
        .route("/create-user", post(routes::admin::users::create_user))
        .route("/delete-user/:id", delete(routes::admin::users::delete_user))
        .route("/delete-by-email/:email", delete(routes::admin::users::delete_by_email))
        .route("/:id/assign-role", put(routes::admin::users::assign_role));

    // Layers wrap what is already there, so identity (added last) runs first
    let admin_routes = Router::new()
        .nest("/tasks", admin_task_routes)
        .nest("/users", admin_user_routes)
        .layer(middleware::from_fn(admin_gate_layer))
        .layer(middleware::from_fn_with_state(state.clone(), identity_layer));

    let cors = if state.config.cors_allows_any() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/admin", admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Identity middleware layer
///
/// Resolves the bearer token to the stored user and injects `CurrentUser`
/// into the request extensions. Handlers pick it up with
/// `Extension<CurrentUser>`.
async fn identity_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = state.identity.resolve_headers(req.headers()).await?;

    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

/// Admin gate layer; must run after `identity_layer`
async fn admin_gate_layer(
    Extension(current): Extension<CurrentUser>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(denied) = require_admin(&current) {
        warn!(user_id = %current.id, path = %req.uri().path(), "Admin access denied");
        return Err(denied.into());
    }

    Ok(next.run(req).await)
}
