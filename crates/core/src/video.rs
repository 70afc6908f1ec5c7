//! Association between catalog entities and the external media service.
//!
//! The media service is opaque to the catalog: an entity only stores the
//! identifier of its video. Any entity that carries one implements
//! [`VideoOwner`] and gets idempotent staging for free.

use crate::course_part::{ChangeSet, CoursePart, FieldChange};
use crate::types::DbId;

/// An entity that can have an external video attached.
pub trait VideoOwner {
    /// Entity label used in errors and logs.
    const ENTITY: &'static str;

    fn owner_id(&self) -> DbId;

    fn video_id(&self) -> Option<&str>;

    /// Stage `video_id` unless it is already the stored value.
    fn stage_video(&self, video_id: &str) -> ChangeSet {
        let mut changes = ChangeSet::new();
        if self.video_id() != Some(video_id) {
            changes.stage(FieldChange::VideoId(video_id.to_string()));
        }
        changes
    }
}

impl VideoOwner for CoursePart {
    const ENTITY: &'static str = crate::course_part::ENTITY;

    fn owner_id(&self) -> DbId {
        self.id
    }

    fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::new_id;

    fn part_with_video(video_id: Option<&str>) -> CoursePart {
        let now = chrono::Utc::now();
        CoursePart {
            id: new_id(),
            course_id: new_id(),
            number: 1,
            name: "Intro".to_string(),
            short_description: "desc".to_string(),
            long_description: None,
            tags: Vec::new(),
            published: false,
            video_id: video_id.map(str::to_string),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn stages_when_no_video_yet() {
        let changes = part_with_video(None).stage_video("v1");
        assert_eq!(changes.fields(), vec!["video_id"]);
    }

    #[test]
    fn stages_when_video_differs() {
        let changes = part_with_video(Some("v1")).stage_video("v2");
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn same_video_is_a_no_op() {
        assert!(part_with_video(Some("v1")).stage_video("v1").is_empty());
    }
}
