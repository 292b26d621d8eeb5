//! Upload persistence into the caller's private folder.
//!
//! Uploaded filenames are flattened to a single safe component so the
//! destination can never leave the caller root.

use std::path::{Path, PathBuf};

use crate::error::{GatewayError, Result};
use crate::intake::form::SubmittedForm;

/// Form field carrying the network file.
pub const DEFAULT_UPLOAD_FIELD: &str = "file";

/// Used when nothing safe survives sanitization.
const FALLBACK_FILENAME: &str = "upload";

/// Longest name kept after sanitization.
pub const MAX_FILENAME_LEN: usize = 200;

/// Flatten a client-supplied filename into one safe path component.
///
/// Separators become word breaks, whitespace runs become `_`, anything outside
/// `[A-Za-z0-9._-]` is dropped and leading/trailing dots and underscores are
/// stripped, so `"path/to/file.json"` becomes `"path_to_file.json"` and
/// `"../../etc/passwd"` becomes `"etc_passwd"`. At most
/// [`MAX_FILENAME_LEN`] characters are kept.
pub fn sanitize_filename(name: &str) -> String {
    safe_component(name).unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// The sanitized component, or `None` when nothing safe survives.
pub(crate) fn safe_component(name: &str) -> Option<String> {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .take(MAX_FILENAME_LEN)
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Write the file carried by `field` to `caller_root/<sanitized name>`.
///
/// An existing file of the same name is overwritten. The caller root is
/// created when missing. Write failures are not retried.
pub async fn persist_upload(
    form: &SubmittedForm,
    caller_root: &Path,
    field: &str,
) -> Result<PathBuf> {
    let value = form
        .get(field)
        .filter(|value| value.is_file())
        .ok_or_else(|| GatewayError::field_missing(field))?;

    let original = value.filename.as_deref().unwrap_or_default();
    let destination = caller_root.join(sanitize_filename(original));
    let content = value.content.as_deref().unwrap_or_default();

    tokio::fs::create_dir_all(caller_root)
        .await
        .map_err(GatewayError::StorageFailure)?;
    tokio::fs::write(&destination, content)
        .await
        .map_err(GatewayError::StorageFailure)?;

    log::debug!(
        "Persisted upload '{}' ({} bytes) to {}",
        original,
        content.len(),
        destination.display()
    );

    Ok(destination)
}
