//! Request-shape validation.
//!
//! Request DTOs derive [`validator::Validate`]; the field-level checks the
//! derive cannot express live here as `custom` functions. [`validate_request`]
//! runs every check and folds the full set of violations into a single
//! [`CoreError::InvalidArgument`] whose message lists fields alphabetically,
//! so the same bad payload always produces the same message.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum number of tags on a single entity.
pub const MAX_TAGS: usize = 20;

/// Maximum length of a single tag.
pub const MAX_TAG_LEN: usize = 50;

/// Tags may contain letters, digits, spaces, hyphens and underscores.
pub const TAG_PATTERN: &str = r"^[\p{L}\p{N} _-]+$";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(TAG_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Validate a request payload before any transactional work.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), CoreError> {
    request
        .validate()
        .map_err(|errors| CoreError::InvalidArgument(render_errors(&errors)))
}

/// Render validation errors as `field: message; field: message`.
fn render_errors(errors: &ValidationErrors) -> String {
    let mut entries: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |err| (field.clone(), describe(err)))
        })
        .collect();
    entries.sort();
    entries
        .into_iter()
        .map(|(field, msg)| format!("{field}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe(err: &ValidationError) -> String {
    match &err.message {
        Some(msg) => msg.to_string(),
        None => format!("failed '{}' check", err.code),
    }
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

// ---------------------------------------------------------------------------
// Custom field checks
// ---------------------------------------------------------------------------

/// The value must parse as a UUID.
pub fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    uuid::Uuid::parse_str(value.trim())
        .map(|_| ())
        .map_err(|_| violation("uuid", "must be a valid UUID"))
}

/// The first character must be a letter.
pub fn validate_starts_with_letter(value: &str) -> Result<(), ValidationError> {
    if value.chars().next().is_some_and(char::is_alphabetic) {
        Ok(())
    } else {
        Err(violation("starts_with_letter", "must start with a letter"))
    }
}

/// Bounded tag list with per-tag length and charset rules.
pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(violation("tags_count", "must contain at most 20 tags"));
    }
    for tag in tags {
        let len = tag.chars().count();
        if len == 0 || len > MAX_TAG_LEN {
            return Err(violation("tag_length", "each tag must be 1-50 characters"));
        }
        if !TAG_RE.is_match(tag) {
            return Err(violation(
                "tag_charset",
                "tags may only contain letters, digits, spaces, '-' and '_'",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "validate_uuid"))]
        id: String,
        #[validate(
            length(min = 3, max = 255, message = "must be 3-255 characters"),
            custom(function = "validate_starts_with_letter")
        )]
        name: String,
        #[validate(range(min = 1, message = "must be at least 1"))]
        number: i32,
    }

    fn valid_sample() -> Sample {
        Sample {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Intro".to_string(),
            number: 1,
        }
    }

    // -- validate_request -----------------------------------------------------

    #[test]
    fn valid_request_passes() {
        assert!(validate_request(&valid_sample()).is_ok());
    }

    #[test]
    fn violations_are_sorted_by_field() {
        let sample = Sample {
            id: "nope".to_string(),
            number: 0,
            ..valid_sample()
        };
        let err = validate_request(&sample).unwrap_err();
        match err {
            CoreError::InvalidArgument(msg) => {
                assert_eq!(msg, "id: must be a valid UUID; number: must be at least 1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reports_every_violation_on_one_field() {
        let sample = Sample {
            name: "1a".to_string(),
            ..valid_sample()
        };
        let CoreError::InvalidArgument(msg) = validate_request(&sample).unwrap_err() else {
            panic!("expected InvalidArgument");
        };
        assert!(msg.contains("name: must be 3-255 characters"));
        assert!(msg.contains("name: must start with a letter"));
    }

    // -- validate_starts_with_letter -------------------------------------------

    #[test]
    fn letter_prefix_accepts_unicode_letters() {
        assert!(validate_starts_with_letter("Ärger").is_ok());
    }

    #[test]
    fn letter_prefix_rejects_digit_and_empty() {
        assert!(validate_starts_with_letter("1st part").is_err());
        assert!(validate_starts_with_letter("").is_err());
    }

    // -- validate_tags -------------------------------------------------------

    #[test]
    fn tags_accept_common_charset() {
        let tags = vec![
            "rust".to_string(),
            "async io".to_string(),
            "level_2-a".to_string(),
        ];
        assert!(validate_tags(&tags).is_ok());
    }

    #[test]
    fn tags_reject_too_many() {
        let tags: Vec<String> = (0..=MAX_TAGS).map(|i| format!("t{i}")).collect();
        assert!(validate_tags(&tags).is_err());
    }

    #[test]
    fn tags_reject_empty_and_overlong() {
        assert!(validate_tags(&[String::new()]).is_err());
        assert!(validate_tags(&["x".repeat(MAX_TAG_LEN + 1)]).is_err());
    }

    #[test]
    fn tags_reject_punctuation() {
        assert!(validate_tags(&["c++".to_string()]).is_err());
    }
}
