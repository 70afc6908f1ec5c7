//! Read access to the `courses` table for the course-part engine.

use catalog_core::types::DbId;
use sqlx::PgExecutor;

/// Provides the parent-course lookups course parts depend on.
pub struct CourseRepo;

impl CourseRepo {
    /// Return `in_stock` for a live course, or `None` if it does not exist.
    ///
    /// Takes a `FOR SHARE` lock so the course cannot be withdrawn or deleted
    /// before the surrounding transaction ends.
    pub async fn find_in_stock<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT in_stock FROM courses WHERE id = $1 AND deleted_at IS NULL FOR SHARE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}
