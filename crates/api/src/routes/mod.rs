pub mod course_part;
pub mod health;

use axum::Router;
use catalog_core::store::CatalogStore;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /courses/{course_id}/parts                 list, create
/// /courses/{course_id}/parts/deleted         list including soft-deleted
/// /courses/{course_id}/parts/unpublished     list including unpublished
///
/// /parts/{id}                                get, update, soft delete
/// /parts/{id}/with-deleted                   get including soft-deleted
/// /parts/{id}/with-unpublished               get including unpublished
/// /parts/{id}/video                          attach video (PUT)
/// /parts/{id}/publish                        publish (POST)
/// /parts/{id}/unpublish                      unpublish (POST)
/// /parts/{id}/restore                        restore (POST)
/// /parts/{id}/permanent                      permanent delete (DELETE)
/// ```
pub fn api_routes<S: CatalogStore>() -> Router<AppState<S>> {
    Router::new()
        .nest("/courses", course_part::course_router::<S>())
        .nest("/parts", course_part::part_router::<S>())
}
