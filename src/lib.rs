pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;

use config::SecurityConfig;

/// Build the full application router for the given state
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Token acquisition (public prefixes in the authorize table)
        .merge(auth_routes())
        // Protected API
        .merge(user_routes())
        .merge(station_routes())
        .merge(reading_routes())
        .merge(alert_routes())
        .merge(project_routes())
        .merge(task_routes())
        .merge(order_routes())
        .merge(admin_routes())
        .fallback(fallback)
        // Authorization sees every request, including unmatched /api paths
        .layer(from_fn_with_state(state.clone(), middleware::authorize))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn auth_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::protected::whoami;
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/protected", get(whoami::protected))
}

fn user_routes() -> Router<AppState> {
    use handlers::protected::users;

    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route(
            "/api/users/:id/orders",
            get(users::list_orders).post(users::create_order),
        )
}

fn station_routes() -> Router<AppState> {
    use handlers::protected::stations;

    Router::new()
        .route("/api/stations", get(stations::list).post(stations::create))
        .route(
            "/api/stations/:id",
            get(stations::get).put(stations::update).delete(stations::delete),
        )
}

fn reading_routes() -> Router<AppState> {
    use handlers::protected::readings;

    Router::new()
        .route("/api/readings", get(readings::list).post(readings::create))
        .route("/api/readings/:id", get(readings::get).delete(readings::delete))
}

fn alert_routes() -> Router<AppState> {
    use handlers::protected::alerts;

    Router::new()
        .route("/api/alerts", get(alerts::list).post(alerts::create))
        .route(
            "/api/alerts/:id",
            get(alerts::get).put(alerts::update_status).delete(alerts::delete),
        )
}

fn project_routes() -> Router<AppState> {
    use handlers::protected::projects;

    Router::new()
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/:id",
            get(projects::get)
                .put(projects::replace)
                .patch(projects::patch)
                .delete(projects::delete),
        )
}

fn task_routes() -> Router<AppState> {
    use handlers::protected::tasks;

    Router::new()
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/api/tasks/:id",
            get(tasks::get)
                .put(tasks::replace)
                .patch(tasks::patch)
                .delete(tasks::delete),
        )
}

fn order_routes() -> Router<AppState> {
    use handlers::protected::orders;

    Router::new()
        .route("/api/orders", get(orders::list).post(orders::create))
        .route(
            "/api/orders/:id",
            get(orders::get)
                .put(orders::replace)
                .patch(orders::patch)
                .delete(orders::delete),
        )
}

fn admin_routes() -> Router<AppState> {
    use handlers::protected::admin;

    Router::new().route("/api/admin", get(admin::stats).post(admin::action))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "message": "Climate Dashboard API",
        "data": {
            "name": "Climate Dashboard API",
            "version": version,
            "description": "REST backend for weather stations, sensor readings, alerts and project tracking",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/login, /api/auth/register, /api/auth/signup (public - token acquisition)",
                "protected": "/api/protected (any authenticated user)",
                "users": "/api/users[/:id[/orders]] (admin, operator)",
                "stations": "/api/stations[/:id] (admin, operator)",
                "readings": "/api/readings[/:id] (admin, operator)",
                "alerts": "/api/alerts[/:id] (admin, operator)",
                "projects": "/api/projects[/:id] (any authenticated user)",
                "tasks": "/api/tasks[/:id] (any authenticated user)",
                "orders": "/api/orders[/:id] (any authenticated user)",
                "admin": "/api/admin (admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let storage = state.storage_backend();

    match state.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Service healthy",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "storage": storage,
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Storage unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "storage": storage,
                    }
                })),
            )
        }
    }
}

async fn fallback() -> ApiError {
    ApiError::not_found("Route not found")
}
