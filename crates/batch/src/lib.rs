//! Batch upload orchestration.
//!
//! This crate implements the **business logic** for uploading a batch
//! of user-selected files. It is a library crate with no UI or
//! transport dependencies — the embedding app provides a
//! [`FileUploader`](filedrop_transfer::FileUploader) for the wire and
//! a [`NotificationSink`] for the status line.
//!
//! # Pipeline
//!
//! 1. **Admit** — refuse re-entry and multi-file batches the policy
//!    forbids
//! 2. **Validate** — size/type policy, per file, right before its
//!    upload
//! 3. **Upload** — strictly sequential, one request per file, byte
//!    progress folded into a single batch percentage
//! 4. **Resolve** — fail-fast on the first error; one transient
//!    terminal status either way

pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod types;

// Re-export primary types for convenience.
pub use error::BatchError;
pub use notify::{NotificationSink, StatusHandle, StatusId, DEFAULT_STATUS_DURATION};
pub use orchestrator::BatchOrchestrator;
pub use types::{BatchEvent, BatchOutcome};
