//! Parent course as seen by the course-part engine.
//!
//! The catalog owns the course lifecycle elsewhere; the engine only needs to
//! know whether a course exists and whether it is in stock.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Entity label used in `NotFound` errors.
pub const ENTITY: &str = "Course";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub id: DbId,
    pub name: String,
    /// Publicly available. Parts can only be published under an in-stock course.
    pub in_stock: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    pub fn new(id: DbId, name: impl Into<String>, in_stock: bool) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            name: name.into(),
            in_stock,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}
