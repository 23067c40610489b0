//! Single-file HTTP upload with byte-level progress.
//!
//! `FileUploader` is implemented on `reqwest` here and by mocks in
//! the orchestrator's tests. Using a trait keeps batch logic
//! decoupled from the transport.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::debug;

use crate::types::{FileHandle, UploadResult};
use crate::UploadError;

/// Granularity of progress reporting: the multipart body is streamed
/// in slices of this size and the callback fires once per slice.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Callback invoked with the in-flight file's fraction done in [0, 1].
///
/// Best-effort: a transport that cannot observe its write position
/// may never call it. Shared with the request body, hence `Arc`.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Abstract single-file upload transport.
pub trait FileUploader: Send + Sync {
    /// Uploads one file, reporting fractional progress along the way.
    ///
    /// Exactly one outbound request per call, no internal retry.
    fn upload<'a>(
        &'a self,
        handle: &'a FileHandle,
        progress: ProgressFn,
    ) -> Pin<Box<dyn Future<Output = Result<UploadResult, UploadError>> + Send + 'a>>;
}

/// Uploads files to an HTTP endpoint as multipart form posts.
pub struct HttpUploader {
    http: reqwest::Client,
    upload_url: String,
}

impl HttpUploader {
    /// Creates an uploader posting to `upload_url`.
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: upload_url.into(),
        }
    }

    /// Returns the configured endpoint URL.
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

impl FileUploader for HttpUploader {
    fn upload<'a>(
        &'a self,
        handle: &'a FileHandle,
        progress: ProgressFn,
    ) -> Pin<Box<dyn Future<Output = Result<UploadResult, UploadError>> + Send + 'a>> {
        Box::pin(async move {
            let part = progress_part(handle, progress)?;
            let form = Form::new().part("file", part);

            let resp = self
                .http
                .post(&self.upload_url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| UploadError::Network(e.to_string()))?;

            let status = resp.status();
            if status != StatusCode::OK {
                return Err(UploadError::Transport {
                    status: status.as_u16(),
                });
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| UploadError::Network(e.to_string()))?;

            Ok(parse_body(&handle.name, &body))
        })
    }
}

/// Interprets the body of a 200 response.
///
/// A completed transfer is never failed for a malformed or empty
/// body: anything unparseable becomes the synthesized
/// `{name, uploaded: true}` result.
fn parse_body(name: &str, body: &[u8]) -> UploadResult {
    serde_json::from_slice::<UploadResult>(body).unwrap_or_else(|_| {
        debug!(file = %name, "response body not parseable, synthesizing result");
        UploadResult::uploaded(name)
    })
}

/// Builds the `file` form part, wiring the progress callback into a
/// chunked body stream.
fn progress_part(handle: &FileHandle, progress: ProgressFn) -> Result<Part, UploadError> {
    let total = handle.size.max(1) as f64;
    let mut sent: u64 = 0;

    let chunks = chunk_payload(handle.data());
    let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        progress((sent as f64 / total).min(1.0));
        Ok::<_, std::io::Error>(chunk)
    }));

    let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), handle.size)
        .file_name(handle.name.clone());

    part.mime_str(&handle.mime_type)
        .map_err(|_| UploadError::InvalidContentType(handle.mime_type.clone()))
}

/// Splits the payload into [`UPLOAD_CHUNK_SIZE`] slices without
/// copying (the slices share the handle's buffer).
fn chunk_payload(data: &Bytes) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(data.len().div_ceil(UPLOAD_CHUNK_SIZE).max(1));
    let mut offset = 0;
    while offset < data.len() {
        let end = usize::min(offset + UPLOAD_CHUNK_SIZE, data.len());
        chunks.push(data.slice(offset..end));
        offset = end;
    }
    chunks
}
