//! Classification of sqlx errors into the domain taxonomy.

use catalog_core::error::CoreError;

/// Partial unique index on `(course_id, number)` for non-deleted parts.
pub const UQ_COURSE_PART_NUMBER: &str = "uq_course_parts_course_number";

/// Map a storage error onto [`CoreError`].
///
/// - Violating the part-number index is a caller error (`InvalidArgument`).
/// - A foreign-key violation means the parent course is gone.
/// - Everything else is `Internal`, with the detail kept for the logs.
pub fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") if db_err.constraint() == Some(UQ_COURSE_PART_NUMBER) => {
                return CoreError::invalid("number is already in use in this course");
            }
            Some("23503") => {
                return CoreError::invalid("referenced course does not exist");
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn row_not_found_is_internal() {
        // Repositories use `fetch_optional`; a stray RowNotFound is a bug.
        assert_matches!(
            map_db_error(sqlx::Error::RowNotFound),
            CoreError::Internal(_)
        );
    }

    #[test]
    fn pool_timeout_is_internal() {
        assert_matches!(
            map_db_error(sqlx::Error::PoolTimedOut),
            CoreError::Internal(_)
        );
    }
}
