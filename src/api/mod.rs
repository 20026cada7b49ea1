//! API layer
//!
//! HTTP handlers for:
//! - Accounts (register, login, signout, profile)
//! - Tasks (create, list, update, complete, delete)
//! - Metrics (Prometheus)

mod accounts;
mod dto;
mod extract;
mod failure_status;
pub mod metrics;
mod tasks;

use axum::{
    Router,
    routing::{post, put},
};

use crate::AppState;

pub use dto::*;
pub use extract::{ApiJson, ApiQuery};
pub use failure_status::apply_failure_status;
pub use metrics::metrics_router;

/// Create the `/api` router
///
/// `/tasks/:task_id/completed` is registered ahead of `/tasks/:task_id`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/signout", post(accounts::signout))
        .route("/user/:user_id", put(accounts::update_profile))
        .route("/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route("/tasks/:task_id/completed", put(tasks::complete_task))
        .route(
            "/tasks/:task_id",
            put(tasks::update_task).delete(tasks::delete_task),
        )
}
