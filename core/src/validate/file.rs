use serde::{Deserialize, Serialize};

/// Candidate file offered for tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl FileDescriptor {
    pub fn new(
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    pub fn pdf(display_name: impl Into<String>, size_bytes: u64) -> Self {
        Self::new(display_name, super::PDF_MIME_TYPE, size_bytes)
    }
}
