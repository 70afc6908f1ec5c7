use crate::error::CoreError;

/// All catalog primary keys are UUIDs.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Parse a client-supplied identifier.
///
/// `field` names the request field in the error message.
pub fn parse_id(field: &str, raw: &str) -> Result<DbId, CoreError> {
    uuid::Uuid::parse_str(raw.trim())
        .map_err(|_| CoreError::InvalidArgument(format!("{field} must be a valid UUID")))
}

/// Allocate a fresh identifier for a new row.
pub fn new_id() -> DbId {
    uuid::Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_hyphenated_uuid() {
        let id = new_id();
        assert_eq!(parse_id("id", &id.to_string()).unwrap(), id);
    }

    #[test]
    fn rejects_malformed_id() {
        assert_matches!(
            parse_id("course_id", "C1"),
            Err(CoreError::InvalidArgument(msg)) if msg == "course_id must be a valid UUID"
        );
    }

    #[test]
    fn rejects_empty_id() {
        assert!(parse_id("id", "").is_err());
    }
}
