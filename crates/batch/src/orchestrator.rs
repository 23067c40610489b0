//! Batch upload orchestrator: validation, sequential upload,
//! aggregation, terminal outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use filedrop_transfer::{
    validate, BatchProgress, FileHandle, FileUploader, ProgressFn, UploadPolicy, UploadResult,
    UploadTask,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::BatchError;
use crate::notify::{NotificationSink, StatusHandle, DEFAULT_STATUS_DURATION};
use crate::types::{BatchEvent, BatchOutcome};

/// Current state of the single-batch state machine. Terminal states
/// are the [`BatchOutcome`] values returned by `run()`; the instance
/// itself returns to `Idle` so the control stays reusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
}

/// Restores `Idle` when the batch scope exits, on every path.
struct PhaseGuard<'a>(&'a Mutex<Phase>);

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap() = Phase::Idle;
    }
}

/// Drives one batch of files through validation, strictly sequential
/// upload, progress aggregation, and a terminal status.
///
/// One orchestrator backs one visual control. A `run()` while another
/// batch is in flight is refused with
/// [`BatchError::AlreadyRunning`]; independent controls use
/// independent instances.
pub struct BatchOrchestrator {
    policy: UploadPolicy,
    sink: Arc<dyn NotificationSink>,
    phase: Mutex<Phase>,
    events_tx: mpsc::Sender<BatchEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<BatchEvent>>>,
    events_taken: AtomicBool,
}

impl BatchOrchestrator {
    /// Creates an orchestrator with the given admission policy and
    /// notification sink.
    pub fn new(policy: UploadPolicy, sink: Arc<dyn NotificationSink>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            policy,
            sink,
            phase: Mutex::new(Phase::Idle),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            events_taken: AtomicBool::new(false),
        }
    }

    /// Takes the event receiver. Can only be called once; events are
    /// only emitted after the receiver has been taken.
    pub fn take_events(&self) -> Option<mpsc::Receiver<BatchEvent>> {
        let rx = self.events_rx.lock().unwrap().take();
        if rx.is_some() {
            self.events_taken.store(true, Ordering::SeqCst);
        }
        rx
    }

    /// Returns the orchestrator's admission policy.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Runs one batch to its terminal outcome.
    ///
    /// Files upload strictly sequentially in input order; the first
    /// validation or transport failure aborts the batch. Either way
    /// the in-progress status is dismissed exactly once and the
    /// orchestrator is reusable afterwards.
    ///
    /// An empty `files` is a no-op (`Ok(BatchOutcome::Empty)`): no
    /// request, no status, no state change.
    pub async fn run(
        &self,
        uploader: &dyn FileUploader,
        files: Vec<FileHandle>,
    ) -> Result<BatchOutcome, BatchError> {
        if files.is_empty() {
            return Ok(BatchOutcome::Empty);
        }
        if !self.policy.allow_multiple && files.len() > 1 {
            return Err(BatchError::MultipleNotAllowed {
                files: files.len(),
            });
        }

        let _phase = self.begin()?;
        Ok(self.run_batch(uploader, files).await)
    }

    /// Swaps `Idle → Running`, refusing re-entry.
    fn begin(&self) -> Result<PhaseGuard<'_>, BatchError> {
        let mut phase = self.phase.lock().unwrap();
        if *phase == Phase::Running {
            return Err(BatchError::AlreadyRunning);
        }
        *phase = Phase::Running;
        Ok(PhaseGuard(&self.phase))
    }

    async fn run_batch(&self, uploader: &dyn FileUploader, files: Vec<FileHandle>) -> BatchOutcome {
        let count = files.len();
        let progress = match BatchProgress::new(count) {
            Ok(p) => Arc::new(p),
            // Unreachable: run() returns early for empty input.
            Err(_) => return BatchOutcome::Empty,
        };

        let status = StatusHandle::show(&self.sink, &format!("Uploading {count} file(s)..."), None);
        self.emit(BatchEvent::Started { files: count }).await;

        let mut tasks: Vec<UploadTask> = files
            .iter()
            .enumerate()
            .map(|(index, handle)| UploadTask::new(index, handle.clone()))
            .collect();
        let mut failure: Option<(usize, filedrop_transfer::UploadError)> = None;

        for (index, handle) in files.iter().enumerate() {
            if let Err(err) = validate(handle, &self.policy) {
                warn!(file = %handle.name, error = %err, "validation failed, aborting batch");
                tasks[index].fail(err.clone());
                failure = Some((index, err));
                break;
            }

            tasks[index].start();
            let on_progress = self.progress_fn(&progress, &status, index, &handle.name);

            match uploader.upload(handle, on_progress).await {
                Ok(result) => {
                    // Advance the batch figure even when the transport
                    // reported no progress at all.
                    let overall = progress.record(index, 1.0);
                    status.update(&format!("Uploading... {overall:.0}%"));
                    tasks[index].succeed(result);
                }
                Err(err) => {
                    error!(file = %handle.name, error = %err, "upload failed, aborting batch");
                    tasks[index].fail(err.clone());
                    failure = Some((index, err));
                    break;
                }
            }
        }

        let results: Vec<UploadResult> = tasks
            .iter()
            .filter_map(|task| task.result.clone())
            .collect();

        match failure {
            None => {
                status.dismiss();
                let _ = self.sink.show(
                    &format!("{count} file(s) uploaded successfully."),
                    Some(DEFAULT_STATUS_DURATION),
                );
                info!(files = count, "batch upload complete");
                self.emit(BatchEvent::Succeeded {
                    files: results.clone(),
                })
                .await;
                BatchOutcome::Succeeded(results)
            }
            Some((failed_index, err)) => {
                let completed = results.len();
                if completed > 0 {
                    // Those files are already persisted server-side;
                    // the caller only sees the failure.
                    warn!(
                        completed,
                        failed_index, "discarding results of files uploaded before the abort"
                    );
                }
                status.dismiss();
                let message = err.to_string();
                let _ = self.sink.show(&message, Some(DEFAULT_STATUS_DURATION));
                self.emit(BatchEvent::Failed {
                    message: message.clone(),
                })
                .await;
                BatchOutcome::Failed {
                    error: err,
                    failed_index,
                    completed,
                }
            }
        }
    }

    /// Builds the per-file progress callback: folds the fraction into
    /// the batch figure, refreshes the status line, and emits a
    /// progress event.
    fn progress_fn(
        &self,
        progress: &Arc<BatchProgress>,
        status: &StatusHandle,
        index: usize,
        name: &str,
    ) -> ProgressFn {
        let progress = Arc::clone(progress);
        let sink = Arc::clone(&self.sink);
        let status_id = status.id();
        let name = name.to_string();
        let events_tx = self.events_tx.clone();
        let events_taken = self.events_taken.load(Ordering::SeqCst);

        Arc::new(move |fraction: f64| {
            let overall = progress.record(index, fraction);
            sink.update(status_id, &format!("Uploading {name}... {overall:.0}%"));
            if events_taken {
                // Best-effort: dropped when the receiver lags.
                let _ = events_tx.try_send(BatchEvent::Progress {
                    file: name.clone(),
                    percent: overall,
                });
            }
        })
    }

    async fn emit(&self, event: BatchEvent) {
        if self.events_taken.load(Ordering::SeqCst) {
            let _ = self.events_tx.send(event).await;
        }
    }
}
