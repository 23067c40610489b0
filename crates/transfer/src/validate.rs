//! Policy validation for one candidate file.

use crate::types::{FileHandle, UploadPolicy};
use crate::UploadError;

/// Checks a file against the upload policy.
///
/// Pure, no I/O. Runs immediately before each file's upload, not only
/// at batch admission, so a later file can still be rejected after
/// earlier files in the batch have gone out.
pub fn validate(handle: &FileHandle, policy: &UploadPolicy) -> Result<(), UploadError> {
    if handle.size > policy.max_size_bytes {
        return Err(UploadError::SizeExceeded {
            name: handle.name.clone(),
            size: handle.size,
            limit: policy.max_size_bytes,
        });
    }

    if !policy.accepted_types.accepts(&handle.mime_type) {
        return Err(UploadError::TypeRejected {
            name: handle.name.clone(),
            mime: handle.mime_type.clone(),
        });
    }

    Ok(())
}

/// Formats a byte count in decimal units ("500 B", "1.50 KB", "1 MB").
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1000.0 && unit < UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else if size.fract() == 0.0 {
        format!("{} {}", size as u64, UNITS[unit])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AcceptedTypes;

    fn policy(max: u64, accept: &str) -> UploadPolicy {
        UploadPolicy {
            max_size_bytes: max,
            accepted_types: AcceptedTypes::from(accept.to_string()),
            allow_multiple: true,
        }
    }

    fn handle(name: &str, mime: &str, size: usize) -> FileHandle {
        FileHandle::from_bytes(name, mime, vec![0u8; size])
    }

    #[test]
    fn accepts_file_within_limit() {
        let h = handle("a.png", "image/png", 500_000);
        assert!(validate(&h, &policy(1_000_000, "*")).is_ok());
    }

    #[test]
    fn accepts_file_exactly_at_limit() {
        let h = handle("a.png", "image/png", 1_000);
        assert!(validate(&h, &policy(1_000, "*")).is_ok());
    }

    #[test]
    fn rejects_oversized_file() {
        let h = handle("big.iso", "application/octet-stream", 2_000_000);
        let err = validate(&h, &policy(1_000_000, "*")).unwrap_err();
        assert!(matches!(err, UploadError::SizeExceeded { .. }));

        // The message names the file and the limit in human units.
        let msg = err.to_string();
        assert!(msg.contains("big.iso"), "{msg}");
        assert!(msg.contains("1 MB"), "{msg}");
    }

    #[test]
    fn rejects_unaccepted_type() {
        let h = handle("movie.mp4", "video/mp4", 10);
        let err = validate(&h, &policy(1_000_000, "image/*")).unwrap_err();
        assert_eq!(
            err,
            UploadError::TypeRejected {
                name: "movie.mp4".into(),
                mime: "video/mp4".into(),
            }
        );
    }

    #[test]
    fn size_check_runs_before_type_check() {
        let h = handle("movie.mp4", "video/mp4", 2_000_000);
        let err = validate(&h, &policy(1_000_000, "image/*")).unwrap_err();
        assert!(matches!(err, UploadError::SizeExceeded { .. }));
    }

    #[test]
    fn wildcard_policy_accepts_unknown_type() {
        let h = handle("blob", "application/x-custom", 10);
        assert!(validate(&h, &policy(1_000_000, "*")).is_ok());
    }

    #[test]
    fn format_size_decimal_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1_500), "1.50 KB");
        assert_eq!(format_size(1_000_000), "1 MB");
        assert_eq!(format_size(2_500_000_000), "2.50 GB");
    }
}
