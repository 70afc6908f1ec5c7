//! Handlers for course parts.
//!
//! Listing and creation are nested under courses:
//! `/courses/{course_id}/parts[/deleted|/unpublished]`
//!
//! Everything else addresses a part directly: `/parts/{id}[/...]`
//!
//! Path segments override any id carried in the request body. Ids are passed
//! through as strings so the engine reports malformed ones as validation
//! errors.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::course_part::{
    AddVideo, ChangeSet, CoursePart, CoursePartKey, CreateCoursePart, PartList, UpdateCoursePart,
};
use catalog_core::store::CatalogStore;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `PUT /parts/{id}/video`.
#[derive(Debug, Deserialize)]
pub struct AttachVideoBody {
    pub video_id: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// Course-scoped
// ---------------------------------------------------------------------------

/// GET /api/v1/courses/{course_id}/parts
pub async fn list<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(course_id): Path<String>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<PartList>>> {
    let page = query_params(params)?.to_page()?;
    let ctx = state.request_context();
    let parts = state.parts.list(&ctx, &course_id, page).await?;
    Ok(Json(DataResponse { data: parts }))
}

/// GET /api/v1/courses/{course_id}/parts/deleted
pub async fn list_deleted<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(course_id): Path<String>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<PartList>>> {
    let page = query_params(params)?.to_page()?;
    let ctx = state.request_context();
    let parts = state.parts.list_deleted(&ctx, &course_id, page).await?;
    Ok(Json(DataResponse { data: parts }))
}

/// GET /api/v1/courses/{course_id}/parts/unpublished
pub async fn list_unpublished<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(course_id): Path<String>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<PartList>>> {
    let page = query_params(params)?.to_page()?;
    let ctx = state.request_context();
    let parts = state.parts.list_unpublished(&ctx, &course_id, page).await?;
    Ok(Json(DataResponse { data: parts }))
}

/// POST /api/v1/courses/{course_id}/parts
///
/// The part is created unpublished under the course named in the path.
pub async fn create<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(course_id): Path<String>,
    payload: Result<Json<CreateCoursePart>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<CoursePartKey>>)> {
    let mut input = body(payload)?;
    input.course_id = course_id;
    let ctx = state.request_context();
    let key = state.parts.create(&ctx, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: key })))
}

// ---------------------------------------------------------------------------
// Part-scoped reads
// ---------------------------------------------------------------------------

/// GET /api/v1/parts/{id}
pub async fn get_by_id<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<CoursePart>>> {
    let ctx = state.request_context();
    let part = state.parts.get(&ctx, &id).await?;
    Ok(Json(DataResponse { data: part }))
}

/// GET /api/v1/parts/{id}/with-deleted
pub async fn get_with_deleted<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<CoursePart>>> {
    let ctx = state.request_context();
    let part = state.parts.get_with_deleted(&ctx, &id).await?;
    Ok(Json(DataResponse { data: part }))
}

/// GET /api/v1/parts/{id}/with-unpublished
pub async fn get_with_unpublished<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<CoursePart>>> {
    let ctx = state.request_context();
    let part = state.parts.get_with_unpublished(&ctx, &id).await?;
    Ok(Json(DataResponse { data: part }))
}

// ---------------------------------------------------------------------------
// Part-scoped writes
// ---------------------------------------------------------------------------

/// PATCH /api/v1/parts/{id}
///
/// Responds with the fields that actually changed; `{}` when none did.
pub async fn update<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCoursePart>, JsonRejection>,
) -> AppResult<Json<DataResponse<ChangeSet>>> {
    let mut input = body(payload)?;
    input.id = id;
    let ctx = state.request_context();
    let changes = state.parts.update(&ctx, &input).await?;
    Ok(Json(DataResponse { data: changes }))
}

/// PUT /api/v1/parts/{id}/video
pub async fn attach_video<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<AttachVideoBody>, JsonRejection>,
) -> AppResult<Json<DataResponse<ChangeSet>>> {
    let AttachVideoBody { video_id } = body(payload)?;
    let input = AddVideo { id, video_id };
    let ctx = state.request_context();
    let changes = state.parts.add_video(&ctx, &input).await?;
    Ok(Json(DataResponse { data: changes }))
}

/// POST /api/v1/parts/{id}/publish
pub async fn publish<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let ctx = state.request_context();
    state.parts.publish(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/parts/{id}/unpublish
pub async fn unpublish<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let ctx = state.request_context();
    state.parts.unpublish(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/parts/{id}
///
/// Soft delete; the part also stops being published.
pub async fn delete<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let ctx = state.request_context();
    state.parts.delete(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/parts/{id}/restore
pub async fn restore<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let ctx = state.request_context();
    state.parts.restore(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/parts/{id}/permanent
pub async fn delete_permanent<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let ctx = state.request_context();
    state.parts.delete_permanent(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
