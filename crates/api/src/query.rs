//! Query parameter types for API handlers.

use catalog_core::course_part::{Page, DEFAULT_PAGE_LIMIT};
use catalog_core::error::CoreError;
use serde::Deserialize;

/// Pagination parameters (`?limit=&offset=`).
///
/// `limit=-1` lists without a cap. Other out-of-range values are rejected by
/// [`Page::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn to_page(&self) -> Result<Page, CoreError> {
        Page::new(
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            self.offset.unwrap_or(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let page = PaginationParams::default().to_page().unwrap();
        assert_eq!(page.limit(), Some(DEFAULT_PAGE_LIMIT));
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn negative_offset_is_rejected() {
        let params = PaginationParams {
            limit: None,
            offset: Some(-5),
        };
        assert!(params.to_page().is_err());
    }
}
