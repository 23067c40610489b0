//! Notification sink contract and the scoped status handle.

use std::sync::Arc;
use std::time::Duration;

/// Identifier for one shown status, allocated by the sink.
pub type StatusId = u64;

/// How long terminal (success/error) statuses stay on screen.
pub const DEFAULT_STATUS_DURATION: Duration = Duration::from_secs(4);

/// External channel for transient, updatable, dismissible status
/// messages.
///
/// The embedding app implements this on its toast/snackbar layer.
/// Methods are synchronous; implementations must not block.
pub trait NotificationSink: Send + Sync {
    /// Shows a status. `None` means indefinite — it stays until
    /// [`dismiss`](Self::dismiss) is called for the returned id.
    fn show(&self, message: &str, duration: Option<Duration>) -> StatusId;

    /// Replaces the message of a previously shown status.
    fn update(&self, id: StatusId, message: &str);

    /// Removes a previously shown status. Unknown ids are ignored.
    fn dismiss(&self, id: StatusId);
}

/// Scoped ownership of one shown status.
///
/// A batch owns exactly one of these for its in-progress line. The
/// handle dismisses the status on drop, so every exit path — success,
/// failure, or an unwind mid-upload — releases it exactly once.
pub struct StatusHandle {
    sink: Arc<dyn NotificationSink>,
    id: StatusId,
    dismissed: bool,
}

impl StatusHandle {
    /// Shows a status and takes ownership of it.
    pub fn show(
        sink: &Arc<dyn NotificationSink>,
        message: &str,
        duration: Option<Duration>,
    ) -> Self {
        let id = sink.show(message, duration);
        Self {
            sink: Arc::clone(sink),
            id,
            dismissed: false,
        }
    }

    /// The underlying status id, for updates issued outside the
    /// handle (e.g. from a progress callback).
    pub fn id(&self) -> StatusId {
        self.id
    }

    /// Replaces the status message.
    pub fn update(&self, message: &str) {
        self.sink.update(self.id, message);
    }

    /// Dismisses the status now instead of at end of scope.
    pub fn dismiss(mut self) {
        self.dismiss_inner();
    }

    fn dismiss_inner(&mut self) {
        if !self.dismissed {
            self.dismissed = true;
            self.sink.dismiss(self.id);
        }
    }
}

impl Drop for StatusHandle {
    fn drop(&mut self) {
        self.dismiss_inner();
    }
}
