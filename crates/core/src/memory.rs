//! In-process catalog store.
//!
//! Transactions take an owned lock on the whole catalog, so they run one at a
//! time, and stage their writes on a copy that only replaces the shared state
//! on commit. Used by the test suites and for running the API without
//! PostgreSQL.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::course::{self, Course};
use crate::course_part::{ChangeSet, CoursePart, NewCoursePart, Page, PartFilter, Visibility};
use crate::error::CoreError;
use crate::store::{CatalogStore, CatalogTx};
use crate::types::{new_id, DbId};

#[derive(Debug, Clone, Default)]
struct CatalogState {
    courses: HashMap<DbId, Course>,
    parts: HashMap<DbId, CoursePart>,
}

impl CatalogState {
    fn count(&self, filter: &PartFilter) -> i64 {
        self.parts.values().filter(|p| filter.matches(p)).count() as i64
    }

    /// Mirrors the partial unique index on `(course_id, number)`.
    fn ensure_number_free(
        &self,
        course_id: DbId,
        number: i32,
        exclude_id: DbId,
    ) -> Result<(), CoreError> {
        let filter = PartFilter::number_taken(course_id, number, Some(exclude_id));
        if self.count(&filter) > 0 {
            return Err(CoreError::invalid(format!(
                "number {number} is already in use in this course"
            )));
        }
        Ok(())
    }

    fn live_part_mut(&mut self, id: DbId) -> Option<&mut CoursePart> {
        self.parts.get_mut(&id).filter(|p| !p.is_deleted())
    }
}

/// Shared handle to an in-memory catalog. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a course and return its id.
    pub async fn add_course(&self, name: &str, in_stock: bool) -> DbId {
        let course = Course::new(new_id(), name, in_stock);
        let id = course.id;
        self.state.lock().await.courses.insert(id, course);
        id
    }

    /// Flip a course's availability. Returns `false` if the course is unknown.
    pub async fn set_course_in_stock(&self, id: DbId, in_stock: bool) -> bool {
        let mut state = self.state.lock().await;
        match state.courses.get_mut(&id) {
            Some(course) => {
                course.in_stock = in_stock;
                course.updated_at = chrono::Utc::now();
                true
            }
            None => false,
        }
    }

    /// Raw row lookup that ignores every visibility rule.
    pub async fn part(&self, id: DbId) -> Option<CoursePart> {
        self.state.lock().await.parts.get(&id).cloned()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, CoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTx { guard, staged })
    }

    async fn find_part(
        &self,
        id: DbId,
        scope: Visibility,
    ) -> Result<Option<CoursePart>, CoreError> {
        let state = self.state.lock().await;
        Ok(state.parts.get(&id).filter(|p| scope.admits(p)).cloned())
    }

    async fn list_parts(
        &self,
        course_id: DbId,
        scope: Visibility,
        page: Page,
    ) -> Result<Vec<CoursePart>, CoreError> {
        let state = self.state.lock().await;
        let filter = PartFilter::in_course(course_id, scope);
        let mut parts: Vec<CoursePart> = state
            .parts
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        parts.sort_by_key(|p| (p.number, p.created_at));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = page
            .limit()
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(parts.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_parts(&self, filter: PartFilter) -> Result<i64, CoreError> {
        Ok(self.state.lock().await.count(&filter))
    }
}

/// Open memory transaction. Holds the catalog lock until dropped.
pub struct MemoryTx {
    guard: OwnedMutexGuard<CatalogState>,
    staged: CatalogState,
}

#[async_trait]
impl CatalogTx for MemoryTx {
    async fn course_in_stock(&mut self, course_id: DbId) -> Result<Option<bool>, CoreError> {
        Ok(self
            .staged
            .courses
            .get(&course_id)
            .filter(|c| c.is_live())
            .map(|c| c.in_stock))
    }

    async fn lock_part(
        &mut self,
        id: DbId,
        scope: Visibility,
    ) -> Result<Option<CoursePart>, CoreError> {
        Ok(self
            .staged
            .parts
            .get(&id)
            .filter(|p| scope.admits(p))
            .cloned())
    }

    async fn count_parts(&mut self, filter: PartFilter) -> Result<i64, CoreError> {
        Ok(self.staged.count(&filter))
    }

    async fn insert_part(&mut self, part: &NewCoursePart) -> Result<(), CoreError> {
        if !self
            .staged
            .courses
            .get(&part.course_id)
            .is_some_and(Course::is_live)
        {
            return Err(CoreError::NotFound {
                entity: course::ENTITY,
                id: part.course_id,
            });
        }
        self.staged
            .ensure_number_free(part.course_id, part.number, part.id)?;

        let now = chrono::Utc::now();
        self.staged.parts.insert(
            part.id,
            CoursePart {
                id: part.id,
                course_id: part.course_id,
                number: part.number,
                name: part.name.clone(),
                short_description: part.short_description.clone(),
                long_description: part.long_description.clone(),
                tags: part.tags.clone(),
                published: false,
                video_id: None,
                deleted_at: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn apply_changes(&mut self, id: DbId, changes: &ChangeSet) -> Result<u64, CoreError> {
        let Some(current) = self.staged.live_part_mut(id).cloned() else {
            return Ok(0);
        };
        if let Some(number) = changes.number() {
            self.staged
                .ensure_number_free(current.course_id, number, id)?;
        }
        if let Some(part) = self.staged.live_part_mut(id) {
            changes.apply_to(part);
            part.updated_at = chrono::Utc::now();
        }
        Ok(1)
    }

    async fn set_published(&mut self, id: DbId, published: bool) -> Result<u64, CoreError> {
        Ok(match self.staged.live_part_mut(id) {
            Some(part) => {
                part.published = published;
                part.updated_at = chrono::Utc::now();
                1
            }
            None => 0,
        })
    }

    async fn soft_delete(&mut self, id: DbId) -> Result<u64, CoreError> {
        Ok(match self.staged.live_part_mut(id) {
            Some(part) => {
                let now = chrono::Utc::now();
                part.deleted_at = Some(now);
                part.updated_at = now;
                1
            }
            None => 0,
        })
    }

    async fn restore(&mut self, id: DbId) -> Result<u64, CoreError> {
        let Some(part) = self.staged.parts.get(&id).filter(|p| p.is_deleted()) else {
            return Ok(0);
        };
        let (course_id, number) = (part.course_id, part.number);
        self.staged.ensure_number_free(course_id, number, id)?;
        if let Some(part) = self.staged.parts.get_mut(&id) {
            part.deleted_at = None;
            part.updated_at = chrono::Utc::now();
        }
        Ok(1)
    }

    async fn delete_permanent(&mut self, id: DbId) -> Result<u64, CoreError> {
        Ok(u64::from(self.staged.parts.remove(&id).is_some()))
    }

    async fn commit(self) -> Result<(), CoreError> {
        let MemoryTx { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn new_part(course_id: DbId, number: i32) -> NewCoursePart {
        NewCoursePart {
            id: new_id(),
            course_id,
            number,
            name: "Intro".to_string(),
            short_description: "desc".to_string(),
            long_description: None,
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn uncommitted_writes_are_discarded_on_drop() {
        let store = MemoryCatalog::new();
        let course_id = store.add_course("Rust", true).await;
        let part = new_part(course_id, 1);

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_part(&part).await.unwrap();
        }

        assert!(store.part(part.id).await.is_none());
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let store = MemoryCatalog::new();
        let course_id = store.add_course("Rust", true).await;
        let part = new_part(course_id, 1);

        let mut tx = store.begin().await.unwrap();
        tx.insert_part(&part).await.unwrap();
        tx.commit().await.unwrap();

        let stored = store.part(part.id).await.unwrap();
        assert!(!stored.published);
        assert_eq!(stored.number, 1);
    }

    #[tokio::test]
    async fn insert_enforces_number_uniqueness() {
        let store = MemoryCatalog::new();
        let course_id = store.add_course("Rust", true).await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_part(&new_part(course_id, 1)).await.unwrap();
        let err = tx.insert_part(&new_part(course_id, 1)).await.unwrap_err();
        assert_matches!(err, CoreError::InvalidArgument(_));
    }

    #[tokio::test]
    async fn insert_requires_live_course() {
        let store = MemoryCatalog::new();
        let mut tx = store.begin().await.unwrap();
        let err = tx.insert_part(&new_part(new_id(), 1)).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Course", .. });
    }

    #[tokio::test]
    async fn unbounded_page_returns_everything_in_number_order() {
        let store = MemoryCatalog::new();
        let course_id = store.add_course("Rust", true).await;
        let mut tx = store.begin().await.unwrap();
        for number in [3, 1, 2] {
            tx.insert_part(&new_part(course_id, number)).await.unwrap();
        }
        tx.commit().await.unwrap();

        let parts = store
            .list_parts(course_id, Visibility::IncludeUnpublished, Page::unbounded())
            .await
            .unwrap();
        let numbers: Vec<i32> = parts.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        let page = store
            .list_parts(
                course_id,
                Visibility::IncludeUnpublished,
                Page::new(1, 1).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].number, 2);
    }
}
