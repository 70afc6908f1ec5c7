use crate::types::DbId;

/// Domain error taxonomy shared by the engine, the stores and every adapter.
///
/// Adapters map each variant onto their own status vocabulary. `Cancelled`
/// and `DeadlineExceeded` mean the outcome of the operation is unknown; they
/// are never reported as `NotFound` or `InvalidArgument`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),
}

impl CoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// `true` for errors whose outcome is unknown to the caller.
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Cancelled(_) | Self::DeadlineExceeded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let id = uuid::Uuid::nil();
        let err = CoreError::NotFound {
            entity: "CoursePart",
            id,
        };
        assert_eq!(
            err.to_string(),
            format!("Entity not found: CoursePart with id {id}")
        );
    }

    #[test]
    fn only_cancellation_kinds_are_indeterminate() {
        assert!(CoreError::Cancelled("create".into()).is_indeterminate());
        let late = CoreError::DeadlineExceeded("create".into());
        assert!(late.is_indeterminate());
        assert!(!CoreError::invalid("bad").is_indeterminate());
        assert!(!CoreError::internal("boom").is_indeterminate());
    }
}
