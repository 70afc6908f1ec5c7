//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router needed.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use catalog_api::error::AppError;
use catalog_core::error::CoreError;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let id = uuid::Uuid::nil();
    let err = AppError::Core(CoreError::NotFound {
        entity: "CoursePart",
        id,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], format!("CoursePart with id {id} not found"));
}

#[tokio::test]
async fn invalid_argument_returns_400_with_message() {
    let err = AppError::Core(CoreError::invalid("name: must be 3-255 characters"));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "name: must be 3-255 characters");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("expected value at line 1".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::Core(CoreError::internal("connection reset by peer at 10.0.0.4"));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn cancelled_returns_503() {
    let err = AppError::Core(CoreError::Cancelled("create was cancelled".into()));
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "CANCELLED");
}

#[tokio::test]
async fn deadline_exceeded_returns_504() {
    let err = AppError::Core(CoreError::DeadlineExceeded("publish timed out".into()));
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["code"], "DEADLINE_EXCEEDED");
}

#[test]
fn core_errors_convert_into_app_error() {
    let err: AppError = CoreError::invalid("bad").into();
    assert_matches!(err, AppError::Core(CoreError::InvalidArgument(msg)) if msg == "bad");
}
