//! Repository seams consumed by the lifecycle engine.
//!
//! A [`CatalogStore`] serves single-statement reads directly and opens a
//! [`CatalogTx`] for anything that checks and then writes. Every call made
//! for one engine operation goes through the same transaction handle.
//! Dropping a handle without calling [`CatalogTx::commit`] rolls it back.

use async_trait::async_trait;

use crate::course_part::{ChangeSet, CoursePart, NewCoursePart, Page, PartFilter, Visibility};
use crate::error::CoreError;
use crate::types::DbId;

#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    type Tx: CatalogTx;

    /// Open a transaction.
    async fn begin(&self) -> Result<Self::Tx, CoreError>;

    async fn find_part(&self, id: DbId, scope: Visibility) -> Result<Option<CoursePart>, CoreError>;

    /// Parts of a course ordered by `number`. An unbounded page returns all.
    async fn list_parts(
        &self,
        course_id: DbId,
        scope: Visibility,
        page: Page,
    ) -> Result<Vec<CoursePart>, CoreError>;

    async fn count_parts(&self, filter: PartFilter) -> Result<i64, CoreError>;

    /// Reachability check for the health endpoint.
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Repository bound to one open transaction.
///
/// Write methods return the number of rows affected so the engine can tell
/// "nothing matched" apart from a storage failure.
#[async_trait]
pub trait CatalogTx: Send + Sized {
    /// Availability of a live course: `None` if absent, else its `in_stock`.
    ///
    /// Holds the course row for the rest of the transaction.
    async fn course_in_stock(&mut self, course_id: DbId) -> Result<Option<bool>, CoreError>;

    /// Read a part and hold it for the rest of the transaction.
    async fn lock_part(
        &mut self,
        id: DbId,
        scope: Visibility,
    ) -> Result<Option<CoursePart>, CoreError>;

    async fn count_parts(&mut self, filter: PartFilter) -> Result<i64, CoreError>;

    async fn insert_part(&mut self, part: &NewCoursePart) -> Result<(), CoreError>;

    /// Apply a non-empty change-set to a non-deleted part.
    async fn apply_changes(&mut self, id: DbId, changes: &ChangeSet) -> Result<u64, CoreError>;

    /// Set `published` on a non-deleted part.
    async fn set_published(&mut self, id: DbId, published: bool) -> Result<u64, CoreError>;

    async fn soft_delete(&mut self, id: DbId) -> Result<u64, CoreError>;

    async fn restore(&mut self, id: DbId) -> Result<u64, CoreError>;

    /// Remove the row whatever its state.
    async fn delete_permanent(&mut self, id: DbId) -> Result<u64, CoreError>;

    async fn commit(self) -> Result<(), CoreError>;
}
