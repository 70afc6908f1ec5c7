//! Repository for the `course_parts` table.

use catalog_core::course_part::{
    ChangeSet, CoursePart, FieldChange, NewCoursePart, Page, PartFilter, Visibility,
};
use catalog_core::types::DbId;
use sqlx::{PgExecutor, Postgres, QueryBuilder};

use crate::models::course_part::CoursePartRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, number, name, short_description, long_description, \
    tags, published, video_id, deleted_at, created_at, updated_at";

/// SQL predicate selecting the rows a scope may see.
fn scope_clause(scope: Visibility) -> &'static str {
    match scope {
        Visibility::Published => "deleted_at IS NULL AND published",
        Visibility::IncludeUnpublished => "deleted_at IS NULL",
        Visibility::IncludeDeleted => "TRUE",
    }
}

/// Build `SELECT COUNT(*)` for a [`PartFilter`].
fn count_query(filter: &PartFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM course_parts WHERE course_id = ");
    qb.push_bind(filter.course_id);
    qb.push(" AND ").push(scope_clause(filter.scope));
    if let Some(number) = filter.number {
        qb.push(" AND number = ").push_bind(number);
    }
    if let Some(exclude_id) = filter.exclude_id {
        qb.push(" AND id <> ").push_bind(exclude_id);
    }
    qb
}

/// Build an `UPDATE` that writes exactly the staged fields.
fn update_query(id: DbId, changes: &ChangeSet) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE course_parts SET ");
    {
        let mut set = qb.separated(", ");
        for change in changes.iter() {
            set.push(change.field());
            set.push_unseparated(" = ");
            match change {
                FieldChange::Number(n) => set.push_bind_unseparated(*n),
                FieldChange::Name(v)
                | FieldChange::ShortDescription(v)
                | FieldChange::LongDescription(v)
                | FieldChange::VideoId(v) => set.push_bind_unseparated(v.clone()),
                FieldChange::Tags(v) => set.push_bind_unseparated(v.clone()),
            };
        }
        set.push("updated_at = NOW()");
    }
    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND deleted_at IS NULL");
    qb
}

/// Provides CRUD and lifecycle operations for course parts.
pub struct CoursePartRepo;

impl CoursePartRepo {
    // ── Reads ────────────────────────────────────────────────────────

    /// Find a part by ID within `scope`.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        scope: Visibility,
    ) -> Result<Option<CoursePart>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_parts WHERE id = $1 AND {}",
            scope_clause(scope)
        );
        let row = sqlx::query_as::<_, CoursePartRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.map(CoursePart::from))
    }

    /// Like [`Self::find_by_id`] but takes a row lock (`FOR UPDATE`) that
    /// lasts until the surrounding transaction ends.
    pub async fn lock_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        scope: Visibility,
    ) -> Result<Option<CoursePart>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_parts WHERE id = $1 AND {} FOR UPDATE",
            scope_clause(scope)
        );
        let row = sqlx::query_as::<_, CoursePartRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.map(CoursePart::from))
    }

    /// List parts of a course ordered by number. A `NULL` limit means no cap.
    pub async fn list_by_course<'e>(
        executor: impl PgExecutor<'e>,
        course_id: DbId,
        scope: Visibility,
        page: Page,
    ) -> Result<Vec<CoursePart>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_parts
             WHERE course_id = $1 AND {}
             ORDER BY number ASC, created_at ASC
             LIMIT $2 OFFSET $3",
            scope_clause(scope)
        );
        let rows = sqlx::query_as::<_, CoursePartRow>(&query)
            .bind(course_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(executor)
            .await?;
        Ok(rows.into_iter().map(CoursePart::from).collect())
    }

    /// Count parts matching `filter`.
    pub async fn count<'e>(
        executor: impl PgExecutor<'e>,
        filter: &PartFilter,
    ) -> Result<i64, sqlx::Error> {
        let mut qb = count_query(filter);
        qb.build_query_scalar::<i64>().fetch_one(executor).await
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert a new part. `published` takes its database default (`false`).
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewCoursePart,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO course_parts
                (id, course_id, number, name, short_description, long_description, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(input.id)
        .bind(input.course_id)
        .bind(input.number)
        .bind(&input.name)
        .bind(&input.short_description)
        .bind(&input.long_description)
        .bind(&input.tags)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Write the staged fields of a non-deleted part. Returns rows affected.
    pub async fn apply_changes<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        changes: &ChangeSet,
    ) -> Result<u64, sqlx::Error> {
        let mut qb = update_query(id, changes);
        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Set the published flag of a non-deleted part. Returns rows affected.
    pub async fn set_published<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        published: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE course_parts SET published = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(published)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Soft-delete a part by ID. Returns rows affected.
    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE course_parts SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Restore a soft-deleted part. Leaves `published` alone. Returns rows affected.
    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE course_parts SET deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Permanently delete a part by ID. Returns rows affected.
    pub async fn hard_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM course_parts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
