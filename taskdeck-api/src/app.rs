/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck_api::{app::{build_router, AppState}, config::Config};
/// use taskdeck_shared::repository::memory::MemoryStore;
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

use crate::{config::Config, error::ApiError, middleware::headers::JsonHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use taskdeck_shared::repository::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /health                                  GET
/// /api/users                               POST
/// /api/users/login                         POST
/// /api/users/:id                           GET PUT DELETE
/// /api/users/:id/tasks                     GET
/// /api/users/:id/categories                GET
/// /api/users/:id/statistics                GET
/// /api/users/:id/tasks-with-reminders      GET
/// /api/tasks                               POST
/// /api/tasks/:id                           GET PUT DELETE
/// /api/tasks/:id/reminders                 GET
/// /api/categories                          POST
/// /api/categories/:id                      GET PUT DELETE
/// /api/reminders                           POST
/// /api/reminders/:id                       GET PUT DELETE
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. JSON header normalization and bodies for bare error statuses
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/", post(routes::users::create_user))
        .route("/login", post(routes::users::login))
        .route(
            "/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/:id/tasks", get(routes::users::list_user_tasks))
        .route("/:id/categories", get(routes::users::list_user_categories))
        .route("/:id/statistics", get(routes::statistics::get_user_statistics))
        .route(
            "/:id/tasks-with-reminders",
            get(routes::users::list_tasks_with_reminders),
        );

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/reminders", get(routes::reminders::list_task_reminders));

    let category_routes = Router::new()
        .route("/", post(routes::categories::create_category))
        .route(
            "/:id",
            get(routes::categories::get_category)
                .put(routes::categories::update_category)
                .delete(routes::categories::delete_category),
        );

    let reminder_routes = Router::new()
        .route("/", post(routes::reminders::create_reminder))
        .route(
            "/:id",
            get(routes::reminders::get_reminder)
                .put(routes::reminders::update_reminder)
                .delete(routes::reminders::delete_reminder),
        );

    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/categories", category_routes)
        .nest("/reminders", reminder_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(JsonHeadersLayer::new())
        .with_state(state)
}

/// Permissive CORS for an empty origin list, otherwise the listed origins only
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
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
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
