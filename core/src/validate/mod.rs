//! Validator: decides whether a file may be tracked.

mod file;
mod policy;

pub use file::FileDescriptor;
pub use policy::{validate, UploadPolicy, IMAGE_MIME_PREFIX, MAX_UPLOAD_BYTES, PDF_MIME_TYPE};
