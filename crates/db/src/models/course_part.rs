//! Course part row model.

use catalog_core::course_part::CoursePart;
use catalog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `course_parts` table.
#[derive(Debug, Clone, FromRow)]
pub struct CoursePartRow {
    pub id: DbId,
    pub course_id: DbId,
    pub number: i32,
    pub name: String,
    pub short_description: String,
    pub long_description: Option<String>,
    /// NOT NULL in the database; defaults to `{}`.
    pub tags: Vec<String>,
    pub published: bool,
    pub video_id: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CoursePartRow> for CoursePart {
    fn from(row: CoursePartRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            number: row.number,
            name: row.name,
            short_description: row.short_description,
            long_description: row.long_description,
            tags: row.tags,
            published: row.published,
            video_id: row.video_id,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
