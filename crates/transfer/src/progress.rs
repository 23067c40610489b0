//! Batch progress aggregation.

use std::sync::Mutex;

use crate::UploadError;

/// Folds per-file upload progress into one 0–100 batch percentage.
///
/// Every file weighs the same regardless of size: with `total` files,
/// `completed` of them done and the in-flight file at fraction `p`,
/// the batch sits at `((completed + p) / total) * 100`.
///
/// The reported figure is monotonic: a stale or out-of-order reading
/// never moves it backwards. Interior mutability so the uploader's
/// progress callback can record through a shared reference.
pub struct BatchProgress {
    inner: Mutex<ProgressInner>,
}

struct ProgressInner {
    total: usize,
    reported: f64,
}

impl BatchProgress {
    /// Creates an aggregator over `total` files.
    ///
    /// A batch must have at least one file; `total == 0` is rejected.
    pub fn new(total: usize) -> Result<Self, UploadError> {
        if total == 0 {
            return Err(UploadError::EmptyBatch);
        }
        Ok(Self {
            inner: Mutex::new(ProgressInner {
                total,
                reported: 0.0,
            }),
        })
    }

    /// Records the in-flight file's fractional progress and returns
    /// the batch percentage.
    ///
    /// `completed` is the number of files already fully uploaded and
    /// `fraction` the current file's progress in [0, 1] (clamped).
    pub fn record(&self, completed: usize, fraction: f64) -> f64 {
        let mut s = self.inner.lock().unwrap();
        let fraction = fraction.clamp(0.0, 1.0);
        let raw = ((completed as f64 + fraction) / s.total as f64) * 100.0;
        if raw.min(100.0) > s.reported {
            s.reported = raw.min(100.0);
        }
        s.reported
    }

    /// Returns the latest reported batch percentage.
    pub fn current(&self) -> f64 {
        self.inner.lock().unwrap().reported
    }

    /// Returns the number of files in the batch.
    pub fn total(&self) -> usize {
        self.inner.lock().unwrap().total
    }
}
