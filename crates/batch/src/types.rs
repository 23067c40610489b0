//! Events and outcomes for the batch upload flow.

use filedrop_transfer::{UploadError, UploadResult};

/// Event emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// The batch started with this many files.
    Started { files: usize },
    /// Overall batch percentage advanced while uploading `file`.
    Progress { file: String, percent: f64 },
    /// Every file uploaded; results are in input order.
    Succeeded { files: Vec<UploadResult> },
    /// The batch aborted; `message` is the triggering error's text.
    Failed { message: String },
}

/// Terminal outcome of one `run()` call.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// The input was empty; nothing happened. Not an error.
    Empty,
    /// Every file uploaded. Results are in input order, one per file.
    Succeeded(Vec<UploadResult>),
    /// The batch aborted on the first failure. No results are
    /// delivered, but `completed` says how many earlier files had
    /// already been persisted server-side before the abort.
    Failed {
        error: UploadError,
        /// 0-based index of the file that triggered the abort.
        failed_index: usize,
        /// Files that succeeded before the abort.
        completed: usize,
    },
}

impl BatchOutcome {
    /// Returns `true` for [`BatchOutcome::Succeeded`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}
