//! Taskboard - a small task-tracking backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - /api/register, /api/login, /api/signout, /api/user/:id    │
//! │  - /api/tasks CRUD                                           │
//! │  - /health, /metrics                                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - AccountService (password hashing, duplicate checks)      │
//! │  - TaskService (status rules)                               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx), bounded by a per-query timeout            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers and routers
//! - `service`: Business logic layer
//! - `data`: Database layer and record models
//! - `auth`: Password hashing
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Cloned for each request; the database pool inside is acquired once at
/// startup and shared.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Registration, login and profile updates
    pub accounts: Arc<service::AccountService>,

    /// Task CRUD
    pub tasks: Arc<service::TaskService>,
}

impl AppState {
    /// Initialize application state
    ///
    /// Connects to the database (running migrations) and wires services.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or migrated
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect(
            &config.database.path,
            data::ConnectOptions {
                max_connections: config.database.max_connections,
                query_timeout: config.database.query_timeout(),
            },
        )
        .await?;
        let db = Arc::new(db);

        let users = db.count_users().await?;
        tracing::info!(users, "Database ready");

        Ok(Self {
            config: Arc::new(config),
            accounts: Arc::new(service::AccountService::new(db.clone())),
            tasks: Arc::new(service::TaskService::new(db.clone())),
            db,
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, extract::DefaultBodyLimit, middleware};
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    let mut router = Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api::api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::apply_failure_status,
        ));

    if state.config.metrics.enabled {
        router = router.merge(api::metrics_router::<AppState>());
    }

    if let Some(dir) = &state.config.server.static_dir {
        use tower_http::services::{ServeDir, ServeFile};

        // Unknown paths get index.html so client-side routes resolve
        let serve_dir = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        router = router.fallback_service(serve_dir);
    }

    router
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves, then close the pool.
///
/// In-flight requests are allowed to finish before this returns.
///
/// # Errors
/// Returns error if the listener fails
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let db = state.db.clone();
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    db.close().await;
    Ok(())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if server.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(%error, %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health_check() -> &'static str {
    "OK"
}
