use axum::routing::{delete, get, post, put};
use axum::Router;
use catalog_core::store::CatalogStore;

use crate::handlers::course_part;
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /{course_id}/parts               -> list
/// POST   /{course_id}/parts               -> create
/// GET    /{course_id}/parts/deleted       -> list_deleted
/// GET    /{course_id}/parts/unpublished   -> list_unpublished
/// ```
pub fn course_router<S: CatalogStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/{course_id}/parts",
            get(course_part::list::<S>).post(course_part::create::<S>),
        )
        .route(
            "/{course_id}/parts/deleted",
            get(course_part::list_deleted::<S>),
        )
        .route(
            "/{course_id}/parts/unpublished",
            get(course_part::list_unpublished::<S>),
        )
}

/// Routes mounted at `/parts`.
///
/// ```text
/// GET    /{id}                    -> get_by_id
/// PATCH  /{id}                    -> update
/// DELETE /{id}                    -> delete (soft)
/// GET    /{id}/with-deleted       -> get_with_deleted
/// GET    /{id}/with-unpublished   -> get_with_unpublished
/// PUT    /{id}/video              -> attach_video
/// POST   /{id}/publish            -> publish
/// POST   /{id}/unpublish          -> unpublish
/// POST   /{id}/restore            -> restore
/// DELETE /{id}/permanent          -> delete_permanent
/// ```
pub fn part_router<S: CatalogStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/{id}",
            get(course_part::get_by_id::<S>)
                .patch(course_part::update::<S>)
                .delete(course_part::delete::<S>),
        )
        .route(
            "/{id}/with-deleted",
            get(course_part::get_with_deleted::<S>),
        )
        .route(
            "/{id}/with-unpublished",
            get(course_part::get_with_unpublished::<S>),
        )
        .route("/{id}/video", put(course_part::attach_video::<S>))
        .route("/{id}/publish", post(course_part::publish::<S>))
        .route("/{id}/unpublish", post(course_part::unpublish::<S>))
        .route("/{id}/restore", post(course_part::restore::<S>))
        .route(
            "/{id}/permanent",
            delete(course_part::delete_permanent::<S>),
        )
}
