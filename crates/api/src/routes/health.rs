use axum::extract::State;
use axum::{routing::get, Json, Router};
use catalog_core::store::CatalogStore;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the backing store answered.
    pub store_healthy: bool,
}

/// GET /health -- returns service and store health.
async fn health_check<S: CatalogStore>(State(state): State<AppState<S>>) -> Json<HealthResponse> {
    let store_healthy = state.parts.store().ping().await.is_ok();

    let status = if store_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store_healthy,
    })
}

/// Mount health check routes (root level, NOT under `/api/v1`).
pub fn router<S: CatalogStore>() -> Router<AppState<S>> {
    Router::new().route("/health", get(health_check::<S>))
}
