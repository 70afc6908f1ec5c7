//! PostgreSQL implementation of the engine's repository traits.
//!
//! Transactions run at the server default isolation level (READ COMMITTED).
//! Same-part operations serialize on the `FOR UPDATE` lock taken by
//! [`CatalogTx::lock_part`], and the parent course is held `FOR SHARE` while
//! a publish is decided. The unique index on `(course_id, number)` backs the
//! number check against concurrent inserts.

use async_trait::async_trait;
use catalog_core::course_part::{
    ChangeSet, CoursePart, NewCoursePart, Page, PartFilter, Visibility,
};
use catalog_core::error::CoreError;
use catalog_core::store::{CatalogStore, CatalogTx};
use catalog_core::types::DbId;
use sqlx::{Postgres, Transaction};

use crate::error::map_db_error;
use crate::repositories::{CoursePartRepo, CourseRepo};
use crate::DbPool;

/// Pool-backed catalog store.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    type Tx = PgCatalogTx;

    async fn begin(&self) -> Result<PgCatalogTx, CoreError> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(PgCatalogTx { tx })
    }

    async fn find_part(
        &self,
        id: DbId,
        scope: Visibility,
    ) -> Result<Option<CoursePart>, CoreError> {
        CoursePartRepo::find_by_id(&self.pool, id, scope)
            .await
            .map_err(map_db_error)
    }

    async fn list_parts(
        &self,
        course_id: DbId,
        scope: Visibility,
        page: Page,
    ) -> Result<Vec<CoursePart>, CoreError> {
        CoursePartRepo::list_by_course(&self.pool, course_id, scope, page)
            .await
            .map_err(map_db_error)
    }

    async fn count_parts(&self, filter: PartFilter) -> Result<i64, CoreError> {
        CoursePartRepo::count(&self.pool, &filter)
            .await
            .map_err(map_db_error)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(map_db_error)
    }
}

/// An open PostgreSQL transaction. Rolled back by sqlx if dropped uncommitted.
pub struct PgCatalogTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CatalogTx for PgCatalogTx {
    async fn course_in_stock(&mut self, course_id: DbId) -> Result<Option<bool>, CoreError> {
        CourseRepo::find_in_stock(&mut *self.tx, course_id)
            .await
            .map_err(map_db_error)
    }

    async fn lock_part(
        &mut self,
        id: DbId,
        scope: Visibility,
    ) -> Result<Option<CoursePart>, CoreError> {
        CoursePartRepo::lock_by_id(&mut *self.tx, id, scope)
            .await
            .map_err(map_db_error)
    }

    async fn count_parts(&mut self, filter: PartFilter) -> Result<i64, CoreError> {
        CoursePartRepo::count(&mut *self.tx, &filter)
            .await
            .map_err(map_db_error)
    }

    async fn insert_part(&mut self, part: &NewCoursePart) -> Result<(), CoreError> {
        CoursePartRepo::create(&mut *self.tx, part)
            .await
            .map_err(map_db_error)
    }

    async fn apply_changes(&mut self, id: DbId, changes: &ChangeSet) -> Result<u64, CoreError> {
        CoursePartRepo::apply_changes(&mut *self.tx, id, changes)
            .await
            .map_err(map_db_error)
    }

    async fn set_published(&mut self, id: DbId, published: bool) -> Result<u64, CoreError> {
        CoursePartRepo::set_published(&mut *self.tx, id, published)
            .await
            .map_err(map_db_error)
    }

    async fn soft_delete(&mut self, id: DbId) -> Result<u64, CoreError> {
        CoursePartRepo::soft_delete(&mut *self.tx, id)
            .await
            .map_err(map_db_error)
    }

    async fn restore(&mut self, id: DbId) -> Result<u64, CoreError> {
        CoursePartRepo::restore(&mut *self.tx, id)
            .await
            .map_err(map_db_error)
    }

    async fn delete_permanent(&mut self, id: DbId) -> Result<u64, CoreError> {
        CoursePartRepo::hard_delete(&mut *self.tx, id)
            .await
            .map_err(map_db_error)
    }

    async fn commit(self) -> Result<(), CoreError> {
        self.tx.commit().await.map_err(map_db_error)
    }
}
