use thiserror::Error;

use crate::scheduler::TimerHandle;
use crate::state::{TaskId, TransitionError};

/// Uniform rejection text shown to the user for every policy violation.
pub const REJECTION_MESSAGE: &str = "Only PDFs and images under 2MB are allowed.";

/// File rejected by the upload policy. No task is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", REJECTION_MESSAGE)]
    UnsupportedType { mime_type: String },
    #[error("{}", REJECTION_MESSAGE)]
    TooLarge { size_bytes: u64, limit_bytes: u64 },
}

impl ValidationError {
    /// Detailed cause, for logs.
    pub fn reason(&self) -> String {
        match self {
            Self::UnsupportedType { mime_type } => format!("unsupported type '{mime_type}'"),
            Self::TooLarge {
                size_bytes,
                limit_bytes,
            } => format!("file too large: {size_bytes} bytes (limit: {limit_bytes} bytes)"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("task {id} already owns {handle}")]
    TimerActive { id: TaskId, handle: TimerHandle },
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_text_is_uniform() {
        let wrong_type = ValidationError::UnsupportedType {
            mime_type: "text/plain".to_string(),
        };
        let too_large = ValidationError::TooLarge {
            size_bytes: 4096,
            limit_bytes: 1024,
        };
        assert_eq!(wrong_type.to_string(), REJECTION_MESSAGE);
        assert_eq!(too_large.to_string(), REJECTION_MESSAGE);
        assert!(too_large.reason().contains("limit: 1024 bytes"));
    }
}
