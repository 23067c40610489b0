//! Per-file upload building blocks: handles, policy validation,
//! HTTP transfer with byte progress, and batch progress aggregation.
//!
//! This crate is the lower half of the upload pipeline. It knows how
//! to check one file against a policy, push one file's bytes to an
//! endpoint while reporting fractional progress, and fold per-file
//! progress into a single batch percentage. Driving a whole batch
//! (ordering, fail-fast, status notifications) lives in
//! `filedrop-batch`.

mod progress;
mod types;
mod uploader;
mod validate;

pub use progress::BatchProgress;
pub use types::{AcceptedTypes, FileHandle, TaskStatus, UploadPolicy, UploadResult, UploadTask};
pub use uploader::{FileUploader, HttpUploader, ProgressFn, UPLOAD_CHUNK_SIZE};
pub use validate::{format_size, validate};

/// Errors produced while validating or uploading a single file.
///
/// Cloneable so a failed task can carry its error while the same
/// error is surfaced through the batch outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("file '{name}' is too large ({}), the limit is {}", format_size(*.size), format_size(*.limit))]
    SizeExceeded { name: String, size: u64, limit: u64 },

    #[error("file '{name}' has unsupported type '{mime}'")]
    TypeRejected { name: String, mime: String },

    #[error("upload failed with status {status}")]
    Transport { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid content type '{0}'")]
    InvalidContentType(String),

    #[error("batch must contain at least one file")]
    EmptyBatch,
}
