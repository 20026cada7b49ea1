//! Transport status for business failures
//!
//! In legacy mode, responses marked with [`BusinessFailure`] are sent as
//! HTTP 200 so that clients which only read `success` from the body keep
//! working. The body is left untouched.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;
use crate::config::FailureStatusMode;
use crate::error::BusinessFailure;

/// Middleware applying `api.failure_status`
pub async fn apply_failure_status(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    if state.config.api.failure_status == FailureStatusMode::Legacy
        && response.extensions().get::<BusinessFailure>().is_some()
    {
        *response.status_mut() = StatusCode::OK;
    }

    response
}
