//! File admission policy

use serde::{Deserialize, Serialize};

use super::file::FileDescriptor;
use crate::error::ValidationError;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const IMAGE_MIME_PREFIX: &str = "image/";
/// 2 MiB, exclusive.
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Type and size limits applied before a task is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Also admit `image/*` MIME types.
    pub allow_images: bool,
    /// Files must be strictly smaller than this.
    pub max_size_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allow_images: false,
            max_size_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn with_images(mut self, allow_images: bool) -> Self {
        self.allow_images = allow_images;
        self
    }

    pub fn validate(&self, file: &FileDescriptor) -> Result<(), ValidationError> {
        let mime = file.mime_type.trim().to_ascii_lowercase();
        let type_ok =
            mime == PDF_MIME_TYPE || (self.allow_images && mime.starts_with(IMAGE_MIME_PREFIX));
        if !type_ok {
            return Err(ValidationError::UnsupportedType {
                mime_type: file.mime_type.clone(),
            });
        }

        if file.size_bytes >= self.max_size_bytes {
            return Err(ValidationError::TooLarge {
                size_bytes: file.size_bytes,
                limit_bytes: self.max_size_bytes,
            });
        }

        Ok(())
    }

    pub fn accepts(&self, file: &FileDescriptor) -> bool {
        self.validate(file).is_ok()
    }
}

/// Validates against the default (PDF only, under 2 MiB) policy.
pub fn validate(file: &FileDescriptor) -> bool {
    UploadPolicy::default().accepts(file)
}
