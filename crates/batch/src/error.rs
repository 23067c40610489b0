//! Batch-level errors.

/// Errors for calls that never became a batch.
///
/// Failures *inside* a batch resolve to
/// [`BatchOutcome::Failed`](crate::BatchOutcome::Failed) instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("an upload batch is already running")]
    AlreadyRunning,

    #[error("{files} files submitted but the policy allows only one")]
    MultipleNotAllowed { files: usize },
}
