//! Course part domain model, request DTOs and the update change-set.
//!
//! A course part is an ordered, independently publishable sub-unit of a
//! course. Its `number` is unique among the non-deleted parts of the same
//! course, and it may only be published while the parent course is in stock.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::{validate_starts_with_letter, validate_tags, validate_uuid};

/// Entity label used in `NotFound` errors.
pub const ENTITY: &str = "CoursePart";

/// Default page size when a caller does not supply `limit`.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Sentinel `limit` meaning "return every row".
pub const NO_LIMIT: i64 = -1;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A stored course part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursePart {
    pub id: DbId,
    pub course_id: DbId,
    pub number: i32,
    pub name: String,
    pub short_description: String,
    pub long_description: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub video_id: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CoursePart {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Row payload for an insert. New parts are always unpublished.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoursePart {
    pub id: DbId,
    pub course_id: DbId,
    pub number: i32,
    pub name: String,
    pub short_description: String,
    pub long_description: Option<String>,
    pub tags: Vec<String>,
}

/// Identifier pair returned by a successful create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoursePartKey {
    pub part_id: DbId,
    pub course_id: DbId,
}

/// A page of parts together with the size of the whole scope.
#[derive(Debug, Clone, Serialize)]
pub struct PartList {
    pub items: Vec<CoursePart>,
    pub total: i64,
}

// ---------------------------------------------------------------------------
// Read scopes
// ---------------------------------------------------------------------------

/// Which rows a read may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Not soft-deleted and published.
    Published,
    /// Not soft-deleted, any publish state.
    IncludeUnpublished,
    /// Any row, soft-deleted or not.
    IncludeDeleted,
}

impl Visibility {
    pub fn admits(self, part: &CoursePart) -> bool {
        match self {
            Self::Published => !part.is_deleted() && part.published,
            Self::IncludeUnpublished => !part.is_deleted(),
            Self::IncludeDeleted => true,
        }
    }
}

/// Offset pagination. A negative `limit` is only legal as [`NO_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: i64,
    offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Result<Self, CoreError> {
        if limit < NO_LIMIT {
            return Err(CoreError::invalid(format!(
                "limit must be >= 0 or {NO_LIMIT} for no limit, got {limit}"
            )));
        }
        if offset < 0 {
            return Err(CoreError::invalid(format!(
                "offset must be >= 0, got {offset}"
            )));
        }
        Ok(Self { limit, offset })
    }

    pub fn unbounded() -> Self {
        Self {
            limit: NO_LIMIT,
            offset: 0,
        }
    }

    /// Row cap, or `None` when the page is unbounded.
    pub fn limit(&self) -> Option<i64> {
        (self.limit >= 0).then_some(self.limit)
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Conditional count over course parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartFilter {
    pub course_id: DbId,
    pub scope: Visibility,
    pub number: Option<i32>,
    pub exclude_id: Option<DbId>,
}

impl PartFilter {
    pub fn in_course(course_id: DbId, scope: Visibility) -> Self {
        Self {
            course_id,
            scope,
            number: None,
            exclude_id: None,
        }
    }

    /// Active parts of `course_id` holding `number`, other than `exclude_id`.
    pub fn number_taken(course_id: DbId, number: i32, exclude_id: Option<DbId>) -> Self {
        Self {
            course_id,
            scope: Visibility::IncludeUnpublished,
            number: Some(number),
            exclude_id,
        }
    }

    pub fn matches(&self, part: &CoursePart) -> bool {
        part.course_id == self.course_id
            && self.scope.admits(part)
            && self.number.is_none_or(|n| part.number == n)
            && self.exclude_id != Some(part.id)
    }
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a course part.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCoursePart {
    /// Taken from the URL path by the HTTP adapter.
    #[serde(default)]
    #[validate(custom(function = "validate_uuid"))]
    pub course_id: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub number: i32,
    #[validate(
        length(min = 3, max = 255, message = "must be 3-255 characters"),
        custom(function = "validate_starts_with_letter")
    )]
    pub name: String,
    #[validate(length(min = 3, max = 1000, message = "must be 3-1000 characters"))]
    pub short_description: String,
    #[validate(length(max = 100000, message = "must be at most 100000 characters"))]
    pub long_description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
}

/// DTO for a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCoursePart {
    /// Taken from the URL path by the HTTP adapter.
    #[serde(default)]
    #[validate(custom(function = "validate_uuid"))]
    pub id: String,
    /// Optional consistency check; a part never moves between courses.
    #[validate(custom(function = "validate_uuid"))]
    pub course_id: Option<String>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub number: Option<i32>,
    #[validate(
        length(min = 3, max = 255, message = "must be 3-255 characters"),
        custom(function = "validate_starts_with_letter")
    )]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 1000, message = "must be 3-1000 characters"))]
    pub short_description: Option<String>,
    #[validate(length(max = 100000, message = "must be at most 100000 characters"))]
    pub long_description: Option<String>,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
}

/// DTO for associating an external video with a part.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddVideo {
    /// Taken from the URL path by the HTTP adapter.
    #[serde(default)]
    #[validate(custom(function = "validate_uuid"))]
    pub id: String,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub video_id: String,
}

// ---------------------------------------------------------------------------
// Change-set
// ---------------------------------------------------------------------------

/// One staged field write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Number(i32),
    Name(String),
    ShortDescription(String),
    LongDescription(String),
    Tags(Vec<String>),
    VideoId(String),
}

impl FieldChange {
    /// Column / JSON key the change targets.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Name(_) => "name",
            Self::ShortDescription(_) => "short_description",
            Self::LongDescription(_) => "long_description",
            Self::Tags(_) => "tags",
            Self::VideoId(_) => "video_id",
        }
    }
}

/// The fields of a write whose values differ from what is stored, in the
/// order they were staged.
///
/// Serializes as a JSON object of field name to new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a change, replacing an earlier change to the same field.
    pub fn stage(&mut self, change: FieldChange) {
        let field = change.field();
        match self.changes.iter_mut().find(|c| c.field() == field) {
            Some(existing) => *existing = change,
            None => self.changes.push(change),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.changes.iter().map(FieldChange::field).collect()
    }

    /// The staged `number`, if any.
    pub fn number(&self) -> Option<i32> {
        self.changes.iter().find_map(|c| match c {
            FieldChange::Number(n) => Some(*n),
            _ => None,
        })
    }

    /// Write every staged value onto `part`.
    pub fn apply_to(&self, part: &mut CoursePart) {
        for change in &self.changes {
            match change {
                FieldChange::Number(n) => part.number = *n,
                FieldChange::Name(v) => part.name.clone_from(v),
                FieldChange::ShortDescription(v) => part.short_description.clone_from(v),
                FieldChange::LongDescription(v) => part.long_description = Some(v.clone()),
                FieldChange::Tags(v) => part.tags.clone_from(v),
                FieldChange::VideoId(v) => part.video_id = Some(v.clone()),
            }
        }
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.changes.len()))?;
        for change in &self.changes {
            match change {
                FieldChange::Number(n) => map.serialize_entry(change.field(), n)?,
                FieldChange::Name(v)
                | FieldChange::ShortDescription(v)
                | FieldChange::LongDescription(v)
                | FieldChange::VideoId(v) => map.serialize_entry(change.field(), v)?,
                FieldChange::Tags(v) => map.serialize_entry(change.field(), v)?,
            }
        }
        map.end()
    }
}

/// Stage every supplied field of `input` that differs from `current`.
///
/// `number` is staged here but its uniqueness is the caller's concern.
pub fn stage_update(current: &CoursePart, input: &UpdateCoursePart) -> ChangeSet {
    let mut changes = ChangeSet::new();
    if let Some(number) = input.number.filter(|n| *n != current.number) {
        changes.stage(FieldChange::Number(number));
    }
    if let Some(name) = input.name.as_ref().filter(|v| **v != current.name) {
        changes.stage(FieldChange::Name(name.clone()));
    }
    if let Some(short) = input
        .short_description
        .as_ref()
        .filter(|v| **v != current.short_description)
    {
        changes.stage(FieldChange::ShortDescription(short.clone()));
    }
    if let Some(long) = input
        .long_description
        .as_ref()
        .filter(|v| current.long_description.as_ref() != Some(*v))
    {
        changes.stage(FieldChange::LongDescription(long.clone()));
    }
    if let Some(tags) = input.tags.as_ref().filter(|v| **v != current.tags) {
        changes.stage(FieldChange::Tags(tags.clone()));
    }
    changes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::new_id;

    fn sample_part() -> CoursePart {
        let now = chrono::Utc::now();
        CoursePart {
            id: new_id(),
            course_id: new_id(),
            number: 1,
            name: "Intro".to_string(),
            short_description: "desc".to_string(),
            long_description: None,
            tags: vec!["basics".to_string()],
            published: false,
            video_id: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    // -- stage_update --------------------------------------------------------

    #[test]
    fn same_values_stage_nothing() {
        let part = sample_part();
        let input = UpdateCoursePart {
            number: Some(1),
            name: Some("Intro".to_string()),
            tags: Some(vec!["basics".to_string()]),
            ..Default::default()
        };
        assert!(stage_update(&part, &input).is_empty());
    }

    #[test]
    fn differing_values_are_staged_in_field_order() {
        let part = sample_part();
        let input = UpdateCoursePart {
            name: Some("Basics".to_string()),
            number: Some(3),
            long_description: Some("long".to_string()),
            ..Default::default()
        };
        let changes = stage_update(&part, &input);
        assert_eq!(changes.fields(), vec!["number", "name", "long_description"]);
        assert_eq!(changes.number(), Some(3));
    }

    #[test]
    fn absent_fields_never_clear_values() {
        let mut part = sample_part();
        part.long_description = Some("keep me".to_string());
        let changes = stage_update(&part, &UpdateCoursePart::default());
        changes.apply_to(&mut part);
        assert_eq!(part.long_description.as_deref(), Some("keep me"));
    }

    // -- ChangeSet -----------------------------------------------------------

    #[test]
    fn restaging_a_field_replaces_it() {
        let mut changes = ChangeSet::new();
        changes.stage(FieldChange::Name("a".into()));
        changes.stage(FieldChange::Number(2));
        changes.stage(FieldChange::Name("b".into()));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.fields(), vec!["name", "number"]);
    }

    #[test]
    fn serializes_as_object_in_staging_order() {
        let mut changes = ChangeSet::new();
        changes.stage(FieldChange::VideoId("v1".into()));
        changes.stage(FieldChange::Tags(vec!["a".into()]));
        let json = serde_json::to_string(&changes).unwrap();
        assert_eq!(json, r#"{"video_id":"v1","tags":["a"]}"#);
    }

    #[test]
    fn empty_change_set_serializes_as_empty_object() {
        assert_eq!(serde_json::to_string(&ChangeSet::new()).unwrap(), "{}");
    }

    // -- Page / Visibility ---------------------------------------------------

    #[test]
    fn page_accepts_no_limit_sentinel() {
        let page = Page::new(NO_LIMIT, 0).unwrap();
        assert_eq!(page.limit(), None);
    }

    #[test]
    fn page_rejects_bad_bounds() {
        assert!(Page::new(-2, 0).is_err());
        assert!(Page::new(10, -1).is_err());
    }

    #[test]
    fn visibility_scopes() {
        let mut part = sample_part();
        assert!(!Visibility::Published.admits(&part));
        assert!(Visibility::IncludeUnpublished.admits(&part));

        part.published = true;
        assert!(Visibility::Published.admits(&part));

        part.deleted_at = Some(chrono::Utc::now());
        assert!(!Visibility::IncludeUnpublished.admits(&part));
        assert!(Visibility::IncludeDeleted.admits(&part));
    }

    #[test]
    fn number_filter_excludes_self() {
        let part = sample_part();
        let filter = PartFilter::number_taken(part.course_id, 1, Some(part.id));
        assert!(!filter.matches(&part));
        let filter = PartFilter::number_taken(part.course_id, 1, None);
        assert!(filter.matches(&part));
    }
}
