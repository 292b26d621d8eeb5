use crate::caller::CallerContext;
use crate::error::{GatewayError, Result};
use crate::intake::fields::extract_bool;
use crate::intake::form::{InlinePayload, RequestInput, SubmittedForm};
use crate::intake::upload::{persist_upload, DEFAULT_UPLOAD_FIELD};
use crate::jobs::{JobDescription, NetworkSource};

/// Threshold used when a request does not set one.
pub const DEFAULT_THRESHOLD: f64 = 50.0;

/// Turn either input shape into a single [`JobDescription`].
///
/// A form always takes the upload path, even if an inline `network` could
/// also have been supplied.
pub async fn resolve(input: RequestInput, caller: &CallerContext) -> Result<JobDescription> {
    match input {
        RequestInput::Form(form) => resolve_form(&form, caller).await,
        RequestInput::Payload(payload) => resolve_payload(payload),
    }
}

async fn resolve_form(form: &SubmittedForm, caller: &CallerContext) -> Result<JobDescription> {
    let filepath = persist_upload(form, caller.folder_path(), DEFAULT_UPLOAD_FIELD).await?;
    let calibration = extract_bool::<bool>(form, "calibration", None)?;
    let directed = extract_bool::<bool>(form, "directed", None)?;
    let threshold = form_threshold(form)?;

    Ok(JobDescription {
        threshold,
        calibration,
        directed,
        source: NetworkSource::Filepath(filepath),
    })
}

fn form_threshold(form: &SubmittedForm) -> Result<f64> {
    match form.get("threshold") {
        None => Ok(DEFAULT_THRESHOLD),
        Some(value) => value
            .text
            .trim()
            .parse::<f64>()
            .map_err(|_| GatewayError::type_mismatch("threshold", "threshold must be a float value")),
    }
}

fn resolve_payload(payload: InlinePayload) -> Result<JobDescription> {
    if payload.usable_network().is_none() {
        return Err(GatewayError::validation(
            "request body",
            "Please supply a network file or a 'network' field in the request body",
        ));
    }

    let InlinePayload {
        network,
        threshold,
        calibration,
        directed,
    } = payload;

    Ok(JobDescription {
        threshold: threshold.unwrap_or(DEFAULT_THRESHOLD),
        calibration: calibration.unwrap_or(false),
        directed: directed.unwrap_or(false),
        source: NetworkSource::Inline(network.unwrap_or_default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn caller(temp: &TempDir) -> CallerContext {
        CallerContext::new("alice", temp.path())
    }

    fn upload_form() -> SubmittedForm {
        SubmittedForm::new().with_file("file", "path/to/file.json", b"{\"nodes\": []}".to_vec())
    }

    #[tokio::test]
    async fn test_form_branch() {
        let temp = TempDir::new().unwrap();
        let caller = caller(&temp);
        let form = upload_form()
            .with_text("threshold", "100")
            .with_text("calibration", "false")
            .with_text("directed", "true");

        let description = resolve(RequestInput::Form(form), &caller).await.unwrap();

        let expected_path = caller.folder_path().join("path_to_file.json");
        assert_eq!(description.threshold, 100.0);
        assert!(!description.calibration);
        assert!(description.directed);
        assert_eq!(description.filepath(), Some(expected_path.as_path()));
        assert!(description.inline_network().is_none());
        assert_eq!(fs::read(expected_path).unwrap(), b"{\"nodes\": []}");
    }

    #[tokio::test]
    async fn test_form_threshold_defaults_to_fifty() {
        let temp = TempDir::new().unwrap();
        let form = upload_form()
            .with_text("calibration", "true")
            .with_text("directed", "false");

        let description = resolve(RequestInput::Form(form), &caller(&temp)).await.unwrap();
        assert_eq!(description.threshold, DEFAULT_THRESHOLD);
    }

    #[tokio::test]
    async fn test_form_threshold_must_be_float() {
        let temp = TempDir::new().unwrap();
        let form = upload_form()
            .with_text("threshold", "high")
            .with_text("calibration", "true")
            .with_text("directed", "false");

        let err = resolve(RequestInput::Form(form), &caller(&temp)).await.unwrap_err();
        assert!(matches!(err, GatewayError::FieldTypeMismatch { .. }));
        assert_eq!(err.to_string(), "threshold must be a float value");
        assert_eq!(err.target(), "threshold");
    }

    #[tokio::test]
    async fn test_form_booleans_are_required() {
        let temp = TempDir::new().unwrap();
        let form = upload_form().with_text("calibration", "true");

        let err = resolve(RequestInput::Form(form), &caller(&temp)).await.unwrap_err();
        assert!(matches!(err, GatewayError::FieldMissing { ref field, .. } if field == "directed"));
    }

    #[tokio::test]
    async fn test_form_without_file() {
        let temp = TempDir::new().unwrap();
        let form = SubmittedForm::new()
            .with_text("calibration", "true")
            .with_text("directed", "true");

        let err = resolve(RequestInput::Form(form), &caller(&temp)).await.unwrap_err();
        assert!(matches!(err, GatewayError::FieldMissing { ref field, .. } if field == "file"));
    }

    #[tokio::test]
    async fn test_form_persists_before_field_validation() {
        let temp = TempDir::new().unwrap();
        let caller = caller(&temp);
        let form = upload_form().with_text("calibration", "nope").with_text("directed", "true");

        assert!(resolve(RequestInput::Form(form), &caller).await.is_err());
        // The upload stays behind as an orphan.
        assert!(caller.folder_path().join("path_to_file.json").exists());
    }

    #[tokio::test]
    async fn test_payload_branch() {
        let temp = TempDir::new().unwrap();
        let payload: InlinePayload = serde_json::from_value(json!({
            "network": {"nodes": [1, 2], "edges": [[1, 2]]},
            "threshold": 100,
            "calibration": true,
            "directed": true
        }))
        .unwrap();

        let description = resolve(RequestInput::Payload(payload), &caller(&temp)).await.unwrap();
        assert_eq!(description.threshold, 100.0);
        assert!(description.calibration);
        assert!(description.directed);
        assert_eq!(
            description.inline_network(),
            Some(&json!({"nodes": [1, 2], "edges": [[1, 2]]}))
        );
        assert!(description.filepath().is_none());
    }

    #[tokio::test]
    async fn test_payload_defaults() {
        let temp = TempDir::new().unwrap();
        let payload = InlinePayload {
            network: Some(json!({"nodes": [1]})),
            ..InlinePayload::default()
        };

        let description = resolve(RequestInput::Payload(payload), &caller(&temp)).await.unwrap();
        assert_eq!(description.threshold, 50.0);
        assert!(!description.calibration);
        assert!(!description.directed);
    }

    #[tokio::test]
    async fn test_payload_without_network() {
        let temp = TempDir::new().unwrap();
        for payload in [
            InlinePayload::default(),
            InlinePayload {
                network: Some(json!({})),
                threshold: Some(10.0),
                ..InlinePayload::default()
            },
        ] {
            let err = resolve(RequestInput::Payload(payload), &caller(&temp)).await.unwrap_err();
            assert_eq!(err.name(), "ValidationError");
            assert_eq!(err.target(), "request body");
        }
    }
}
