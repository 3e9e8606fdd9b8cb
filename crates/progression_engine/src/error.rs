//! Error types for the progression engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressionError {
    #[error("No stats found for user {user_id}")]
    NotFound { user_id: String },

    #[error("Stats for user {user_id} changed concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        user_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProgressionError {
    pub fn not_found(user_id: &str) -> Self {
        ProgressionError::NotFound {
            user_id: user_id.to_string(),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ProgressionError::NotFound { .. } => -32010,
            ProgressionError::VersionConflict { .. } => -32011,
            ProgressionError::Storage(_) => -32012,
            ProgressionError::InvalidInput(_) => -32602,
            ProgressionError::Json(_) => -32700,
        }
    }

    /// Whether the caller may reload the snapshot and try again
    pub fn is_conflict(&self) -> bool {
        matches!(self, ProgressionError::VersionConflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProgressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ProgressionError::not_found("user-1");
        assert_eq!(err.to_string(), "No stats found for user user-1");
        assert_eq!(err.code(), -32010);
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_conflict_is_retryable() {
        let err = ProgressionError::VersionConflict {
            user_id: "u".to_string(),
            expected: 3,
            actual: 4,
        };
        assert!(err.is_conflict());
        assert!(err.to_string().contains("expected version 3"));
    }
}
