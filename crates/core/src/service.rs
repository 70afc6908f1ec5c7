//! Course-part lifecycle engine.
//!
//! The only writer of course-part state. Every check-then-write sequence runs
//! inside one [`CatalogTx`], so invariants hold after any successful call:
//!
//! - `number` is unique among non-deleted parts of a course.
//! - A part becomes published only while its course is in stock.
//! - Soft-deleting a part unpublishes it; restoring never republishes it.
//!
//! Identifiers and request payloads are validated before a transaction is
//! opened.

use crate::context::RequestContext;
use crate::course;
use crate::course_part::{
    self, stage_update, AddVideo, ChangeSet, CoursePart, CoursePartKey, CreateCoursePart,
    NewCoursePart, Page, PartFilter, PartList, UpdateCoursePart, Visibility,
};
use crate::error::CoreError;
use crate::store::{CatalogStore, CatalogTx};
use crate::types::{new_id, parse_id, DbId};
use crate::validation::validate_request;
use crate::video::VideoOwner;

fn part_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: course_part::ENTITY,
        id,
    }
}

fn course_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: course::ENTITY,
        id,
    }
}

/// Reject `number` if another active part of `course_id` already holds it.
async fn ensure_number_free<T: CatalogTx>(
    tx: &mut T,
    course_id: DbId,
    number: i32,
    exclude_id: Option<DbId>,
) -> Result<(), CoreError> {
    let taken = tx
        .count_parts(PartFilter::number_taken(course_id, number, exclude_id))
        .await?;
    if taken > 0 {
        return Err(CoreError::invalid(format!(
            "number {number} is already in use in this course"
        )));
    }
    Ok(())
}

/// Lifecycle operations for course parts over any [`CatalogStore`].
#[derive(Debug, Clone)]
pub struct CoursePartService<S> {
    store: S,
}

impl<S: CatalogStore> CoursePartService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Active, published part.
    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<CoursePart, CoreError> {
        self.find(ctx, "get", id, Visibility::Published).await
    }

    /// Part in any state, soft-deleted included.
    pub async fn get_with_deleted(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<CoursePart, CoreError> {
        self.find(ctx, "get_with_deleted", id, Visibility::IncludeDeleted)
            .await
    }

    /// Active part, published or not.
    pub async fn get_with_unpublished(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<CoursePart, CoreError> {
        self.find(
            ctx,
            "get_with_unpublished",
            id,
            Visibility::IncludeUnpublished,
        )
        .await
    }

    async fn find(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        id: &str,
        scope: Visibility,
    ) -> Result<CoursePart, CoreError> {
        let id = parse_id("id", id)?;
        ctx.run(operation, async {
            self.store
                .find_part(id, scope)
                .await?
                .ok_or_else(|| part_not_found(id))
        })
        .await
    }

    /// Published parts of a course.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        course_id: &str,
        page: Page,
    ) -> Result<PartList, CoreError> {
        self.list_scoped(ctx, "list", course_id, page, Visibility::Published)
            .await
    }

    /// Parts of a course including soft-deleted ones.
    pub async fn list_deleted(
        &self,
        ctx: &RequestContext,
        course_id: &str,
        page: Page,
    ) -> Result<PartList, CoreError> {
        self.list_scoped(
            ctx,
            "list_deleted",
            course_id,
            page,
            Visibility::IncludeDeleted,
        )
        .await
    }

    /// Active parts of a course including unpublished ones.
    pub async fn list_unpublished(
        &self,
        ctx: &RequestContext,
        course_id: &str,
        page: Page,
    ) -> Result<PartList, CoreError> {
        self.list_scoped(
            ctx,
            "list_unpublished",
            course_id,
            page,
            Visibility::IncludeUnpublished,
        )
        .await
    }

    async fn list_scoped(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        course_id: &str,
        page: Page,
        scope: Visibility,
    ) -> Result<PartList, CoreError> {
        let course_id = parse_id("course_id", course_id)?;
        ctx.run(operation, async {
            let items = self.store.list_parts(course_id, scope, page).await?;
            let total = self
                .store
                .count_parts(PartFilter::in_course(course_id, scope))
                .await?;
            Ok::<_, CoreError>(PartList { items, total })
        })
        .await
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Create an unpublished part under an existing course.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: &CreateCoursePart,
    ) -> Result<CoursePartKey, CoreError> {
        validate_request(input)?;
        let course_id = parse_id("course_id", &input.course_id)?;

        ctx.run("create", async {
            let mut tx = self.store.begin().await?;

            if tx.course_in_stock(course_id).await?.is_none() {
                return Err(course_not_found(course_id));
            }
            ensure_number_free(&mut tx, course_id, input.number, None)
                .await?;

            let part = NewCoursePart {
                id: new_id(),
                course_id,
                number: input.number,
                name: input.name.clone(),
                short_description: input.short_description.clone(),
                long_description: input.long_description.clone(),
                tags: input.tags.clone(),
            };
            tx.insert_part(&part).await?;
            tx.commit().await?;

            tracing::info!(
                part_id = %part.id,
                course_id = %course_id,
                number = part.number,
                "Course part created",
            );
            Ok(CoursePartKey {
                part_id: part.id,
                course_id,
            })
        })
        .await
    }

    /// Apply the supplied fields that differ from the stored part.
    ///
    /// Returns exactly what changed. An empty change-set means nothing was
    /// written.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        input: &UpdateCoursePart,
    ) -> Result<ChangeSet, CoreError> {
        validate_request(input)?;
        let id = parse_id("id", &input.id)?;
        let expected_course = input
            .course_id
            .as_deref()
            .map(|raw| parse_id("course_id", raw))
            .transpose()?;

        ctx.run("update", async {
            let mut tx = self.store.begin().await?;

            let current = tx
                .lock_part(id, Visibility::IncludeUnpublished)
                .await?
                .ok_or_else(|| part_not_found(id))?;
            if expected_course.is_some_and(|c| c != current.course_id) {
                return Err(CoreError::invalid(
                    "course_id of a course part cannot be changed",
                ));
            }

            let changes = stage_update(&current, input);
            if let Some(number) = changes.number() {
                ensure_number_free(&mut tx, current.course_id, number, Some(id))
                    .await?;
            }
            if changes.is_empty() {
                tracing::debug!(part_id = %id, "Course part update is a no-op");
                return Ok(changes);
            }

            if tx.apply_changes(id, &changes).await? == 0 {
                return Err(part_not_found(id));
            }
            tx.commit().await?;

            tracing::info!(part_id = %id, changes = ?changes.fields(), "Course part updated");
            Ok(changes)
        })
        .await
    }

    /// Attach an external video, unless it is already attached.
    pub async fn add_video(
        &self,
        ctx: &RequestContext,
        input: &AddVideo,
    ) -> Result<ChangeSet, CoreError> {
        validate_request(input)?;
        let id = parse_id("id", &input.id)?;

        ctx.run("add_video", async {
            let mut tx = self.store.begin().await?;

            let part = tx
                .lock_part(id, Visibility::IncludeUnpublished)
                .await?
                .ok_or_else(|| part_not_found(id))?;
            let changes = part.stage_video(&input.video_id);
            if changes.is_empty() {
                return Ok(changes);
            }

            if tx.apply_changes(id, &changes).await? == 0 {
                return Err(part_not_found(id));
            }
            tx.commit().await?;

            tracing::info!(
                entity = CoursePart::ENTITY,
                owner_id = %part.owner_id(),
                video_id = %input.video_id,
                "Video attached",
            );
            Ok(changes)
        })
        .await
    }

    /// Publish a part. Its course must be in stock.
    pub async fn publish(&self, ctx: &RequestContext, id: &str) -> Result<(), CoreError> {
        let id = parse_id("id", id)?;

        ctx.run("publish", async {
            let mut tx = self.store.begin().await?;

            let part = tx
                .lock_part(id, Visibility::IncludeUnpublished)
                .await?
                .ok_or_else(|| part_not_found(id))?;
            let in_stock = tx
                .course_in_stock(part.course_id)
                .await?
                .ok_or_else(|| course_not_found(part.course_id))?;
            if !in_stock {
                return Err(CoreError::invalid(
                    "parent course is not published; publish the course first",
                ));
            }

            if tx.set_published(id, true).await? == 0 {
                return Err(part_not_found(id));
            }
            tx.commit().await?;

            tracing::info!(part_id = %id, course_id = %part.course_id, "Course part published");
            Ok(())
        })
        .await
    }

    pub async fn unpublish(&self, ctx: &RequestContext, id: &str) -> Result<(), CoreError> {
        let id = parse_id("id", id)?;

        ctx.run("unpublish", async {
            let mut tx = self.store.begin().await?;
            if tx.set_published(id, false).await? == 0 {
                return Err(part_not_found(id));
            }
            tx.commit().await?;

            tracing::info!(part_id = %id, "Course part unpublished");
            Ok(())
        })
        .await
    }

    /// Unpublish and soft-delete a part in one transaction.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), CoreError> {
        let id = parse_id("id", id)?;

        ctx.run("delete", async {
            let mut tx = self.store.begin().await?;

            tx.lock_part(id, Visibility::IncludeUnpublished)
                .await?
                .ok_or_else(|| part_not_found(id))?;
            tx.set_published(id, false).await?;
            // Zero rows here means the part vanished after the lock; the
            // transaction is dropped and nothing is written.
            if tx.soft_delete(id).await? == 0 {
                return Err(part_not_found(id));
            }
            tx.commit().await?;

            tracing::info!(part_id = %id, "Course part soft-deleted");
            Ok(())
        })
        .await
    }

    /// Remove a part for good, whatever its state.
    pub async fn delete_permanent(&self, ctx: &RequestContext, id: &str) -> Result<(), CoreError> {
        let id = parse_id("id", id)?;

        ctx.run("delete_permanent", async {
            let mut tx = self.store.begin().await?;
            if tx.delete_permanent(id).await? == 0 {
                return Err(part_not_found(id));
            }
            tx.commit().await?;

            tracing::info!(part_id = %id, "Course part permanently deleted");
            Ok(())
        })
        .await
    }

    /// Bring a soft-deleted part back. It stays unpublished.
    pub async fn restore(&self, ctx: &RequestContext, id: &str) -> Result<(), CoreError> {
        let id = parse_id("id", id)?;

        ctx.run("restore", async {
            let mut tx = self.store.begin().await?;

            let part = tx
                .lock_part(id, Visibility::IncludeDeleted)
                .await?
                .filter(CoursePart::is_deleted)
                .ok_or_else(|| part_not_found(id))?;
            ensure_number_free(&mut tx, part.course_id, part.number, Some(id))
                .await?;

            if tx.restore(id).await? == 0 {
                return Err(part_not_found(id));
            }
            tx.commit().await?;

            tracing::info!(part_id = %id, "Course part restored");
            Ok(())
        })
        .await
    }
}
