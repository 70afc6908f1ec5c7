use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `catalog_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request body or query string that could not be decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a domain error into an HTTP status, error code, and message.
///
/// - `InvalidArgument` maps to 400.
/// - `NotFound` maps to 404.
/// - `Cancelled` and `DeadlineExceeded` map to 503 and 504; the write may or
///   may not have happened.
/// - `Internal` maps to 500 with a sanitized message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    if err.is_indeterminate() {
        tracing::warn!(error = %err, "Request ended with unknown outcome");
    }

    match err {
        CoreError::InvalidArgument(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Cancelled(msg) => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED", msg.clone()),
        CoreError::DeadlineExceeded(msg) => {
            (StatusCode::GATEWAY_TIMEOUT, "DEADLINE_EXCEEDED", msg.clone())
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
