//! Data model for one upload batch: file handles, the admission
//! policy, server results, and per-file task state.

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::UploadError;

/// An in-memory reference to one file selected for upload.
///
/// Owned by the calling UI layer; the upload pipeline only reads it.
/// The payload is a [`Bytes`] so handles clone cheaply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    /// Payload size in bytes. Always equals `data.len()`.
    pub size: u64,
    pub mime_type: String,
    data: Bytes,
}

impl FileHandle {
    /// Creates a handle over an in-memory payload.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            size: data.len() as u64,
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Creates a handle by reading a file from disk.
    ///
    /// The handle's name is the path's final component.
    pub fn from_path(path: impl AsRef<Path>, mime_type: impl Into<String>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(name, mime_type, data))
    }

    /// Returns the file's payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// The set of MIME types an upload control accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AcceptedTypes {
    /// Accept anything.
    Any,
    /// Accept only the listed types. Entries like `image/*` match the
    /// whole top-level type.
    Mime(Vec<String>),
}

impl AcceptedTypes {
    /// Returns `true` if `mime` is allowed by this set.
    ///
    /// Matching is case-insensitive. A `type/*` entry matches every
    /// subtype of `type`.
    pub fn accepts(&self, mime: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Mime(list) => {
                let mime = mime.to_ascii_lowercase();
                list.iter().any(|accepted| {
                    if let Some(prefix) = accepted.strip_suffix("/*") {
                        mime.strip_prefix(prefix)
                            .is_some_and(|rest| rest.starts_with('/'))
                    } else {
                        *accepted == mime
                    }
                })
            }
        }
    }
}

/// Parses the comma-separated accept string used by upload controls,
/// e.g. `"image/png, image/*"`. `"*"`, `"*/*"` or an empty string
/// mean "accept anything".
impl From<String> for AcceptedTypes {
    fn from(value: String) -> Self {
        let entries: Vec<String> = value
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if entries.is_empty() || entries.iter().any(|e| e == "*" || e == "*/*") {
            Self::Any
        } else {
            Self::Mime(entries)
        }
    }
}

impl From<AcceptedTypes> for String {
    fn from(value: AcceptedTypes) -> Self {
        match value {
            AcceptedTypes::Any => "*".into(),
            AcceptedTypes::Mime(list) => list.join(","),
        }
    }
}

/// Admission policy for one upload control. Immutable per orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    pub accepted_types: AcceptedTypes,
    pub allow_multiple: bool,
}

impl UploadPolicy {
    /// A policy with no size limit that accepts any type.
    pub fn permissive() -> Self {
        Self {
            max_size_bytes: u64::MAX,
            accepted_types: AcceptedTypes::Any,
            allow_multiple: true,
        }
    }
}

/// Server-returned metadata for one stored file.
///
/// The schema is owned by the endpoint; everything beyond `id` and
/// `name` is carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UploadResult {
    /// The synthesized result for a transfer that completed but whose
    /// response body could not be parsed: `{name, uploaded: true}`.
    pub fn uploaded(name: &str) -> Self {
        let mut extra = serde_json::Map::new();
        extra.insert("uploaded".into(), serde_json::Value::Bool(true));
        Self {
            id: None,
            name: Some(name.to_string()),
            extra,
        }
    }
}

/// Lifecycle of one file within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InFlight,
    Succeeded,
    Failed,
}

/// Per-file transient state, created at batch start and dropped when
/// the batch resolves.
///
/// Legal transitions are `Pending → InFlight → {Succeeded, Failed}`,
/// each taken at most once. A validation failure moves a task from
/// `Pending` straight to `Failed` since its upload never starts.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub index: usize,
    pub handle: FileHandle,
    pub status: TaskStatus,
    pub fraction_done: f64,
    pub result: Option<UploadResult>,
    pub error: Option<UploadError>,
}

impl UploadTask {
    /// Creates a pending task for the file at `index`.
    pub fn new(index: usize, handle: FileHandle) -> Self {
        Self {
            index,
            handle,
            status: TaskStatus::Pending,
            fraction_done: 0.0,
            result: None,
            error: None,
        }
    }

    /// Marks the task in flight.
    pub fn start(&mut self) {
        debug_assert_eq!(self.status, TaskStatus::Pending);
        self.status = TaskStatus::InFlight;
    }

    /// Records fractional progress for the in-flight upload.
    pub fn set_fraction(&mut self, fraction: f64) {
        debug_assert_eq!(self.status, TaskStatus::InFlight);
        self.fraction_done = fraction.clamp(0.0, 1.0);
    }

    /// Marks the task succeeded with the server's result.
    pub fn succeed(&mut self, result: UploadResult) {
        debug_assert_eq!(self.status, TaskStatus::InFlight);
        self.status = TaskStatus::Succeeded;
        self.fraction_done = 1.0;
        self.result = Some(result);
    }

    /// Marks the task failed. Valid from `Pending` (validation
    /// failure) or `InFlight` (transport failure).
    pub fn fail(&mut self, error: UploadError) {
        debug_assert!(matches!(
            self.status,
            TaskStatus::Pending | TaskStatus::InFlight
        ));
        self.status = TaskStatus::Failed;
        self.error = Some(error);
    }
}
