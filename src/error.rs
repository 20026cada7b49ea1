//! Error types for Taskboard
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` and renders the
//! `{ "success": false, "message": ... }` envelope clients expect.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Registration or profile update with an email that is taken (409)
    #[error("Email already exists. Please use a different email.")]
    DuplicateEmail,

    /// Unknown email or wrong password (401)
    #[error("Invalid Credentials. Try Again!")]
    InvalidCredentials,

    /// Target record does not exist (404)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request is well-formed JSON but semantically inconsistent (400)
    #[error("{0}")]
    Validation(String),

    /// Request body over `server.max_body_bytes` (413)
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema setup failed (500)
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Store did not answer within the configured bound (504)
    #[error("Store operation timed out")]
    StoreTimeout,

    /// Password hashing backend failure (500)
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Response extension marking an expected, client-caused failure.
///
/// The failure-status middleware uses it to downgrade these responses
/// to HTTP 200 in legacy mode.
#[derive(Debug, Clone, Copy)]
pub struct BusinessFailure;

impl AppError {
    /// HTTP status, client-facing message and metric label for this error
    fn parts(&self) -> (StatusCode, String, &'static str) {
        match self {
            AppError::DuplicateEmail => (StatusCode::CONFLICT, self.to_string(), "duplicate_email"),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                self.to_string(),
                "invalid_credentials",
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string(), "not_found"),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                self.to_string(),
                "payload_too_large",
            ),
            AppError::StoreTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                self.to_string(),
                "store_timeout",
            ),
            AppError::Database(_) => internal("database"),
            AppError::Migration(_) => internal("migration"),
            AppError::PasswordHash(_) => internal("password_hash"),
            AppError::Config(_) => internal("config"),
            AppError::Internal(_) => internal("internal"),
        }
    }

    /// Whether this is an expected outcome of a valid request rather than a fault
    pub fn is_business_failure(&self) -> bool {
        matches!(
            self,
            AppError::DuplicateEmail | AppError::InvalidCredentials | AppError::NotFound(_)
        )
    }
}

fn internal(error_type: &'static str) -> (StatusCode, String, &'static str) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error".to_string(),
        error_type,
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, message, error_type) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, error_type, "Request failed");
        } else {
            tracing::debug!(error = %self, error_type, "Request rejected");
        }

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[error_type])
            .inc();

        let body = Json(serde_json::json!({
            "success": false,
            "message": message,
        }));

        let mut response = (status, body).into_response();
        if self.is_business_failure() {
            response.extensions_mut().insert(BusinessFailure);
        }
        response
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_failures_map_to_client_errors() {
        assert_eq!(AppError::DuplicateEmail.parts().0, StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidCredentials.parts().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("Task").parts().0, StatusCode::NOT_FOUND);
        assert_eq!(AppError::NotFound("Task").to_string(), "Task not found");
    }

    #[test]
    fn internal_errors_hide_details() {
        let error = AppError::Internal(anyhow::anyhow!("disk on fire"));
        let (status, message, _) = error.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal Server Error");
        assert!(!error.is_business_failure());
    }

    #[test]
    fn only_business_failures_carry_the_marker() {
        let response = AppError::DuplicateEmail.into_response();
        assert!(response.extensions().get::<BusinessFailure>().is_some());

        let response = AppError::StoreTimeout.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(response.extensions().get::<BusinessFailure>().is_none());

        let response = AppError::Validation("bad".to_string()).into_response();
        assert!(response.extensions().get::<BusinessFailure>().is_none());

        let response = AppError::PayloadTooLarge.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.extensions().get::<BusinessFailure>().is_none());
    }
}
