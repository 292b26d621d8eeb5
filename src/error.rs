use thiserror::Error;

/// Main error type for netgate
///
/// The first five variants are request-scoped rejections; the rest are
/// infrastructure failures surfaced by the storage, queue or executor layers.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A required field is absent from the submitted form
    #[error("Field '{field}' is missing from the {target}")]
    FieldMissing { field: String, target: String },

    /// A field is present but cannot be read as the expected type
    #[error("{message}")]
    FieldTypeMismatch { target: String, message: String },

    /// Neither an upload nor a usable inline network was supplied
    #[error("{message}")]
    Validation { target: String, message: String },

    /// Unknown job kind or operation
    #[error("{message}")]
    Resource { target: String, message: String },

    /// The upload could not be written to the caller's folder
    #[error("Storage failure: {0}")]
    StorageFailure(#[source] std::io::Error),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors outside of upload persistence
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Job executor unreachable or replied with something unusable
    #[error("Executor error: {0}")]
    Executor(String),

    /// JSON encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn field_missing(field: impl Into<String>) -> Self {
        Self::FieldMissing {
            field: field.into(),
            target: "form".to_string(),
        }
    }

    pub fn type_mismatch(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldTypeMismatch {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn validation(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn resource(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resource {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable name, reported as the error code at the HTTP boundary.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FieldMissing { .. } => "FieldMissing",
            Self::FieldTypeMismatch { .. } => "FieldTypeMismatch",
            Self::Validation { .. } => "ValidationError",
            Self::Resource { .. } => "ResourceError",
            Self::StorageFailure(_) => "StorageFailure",
            Self::Database(_) => "DatabaseError",
            Self::Io(_) => "IoError",
            Self::Config(_) => "ConfigurationError",
            Self::Executor(_) => "ExecutorError",
            Self::Serialization(_) => "SerializationError",
        }
    }

    /// Which field or resource caused the error.
    pub fn target(&self) -> &str {
        match self {
            Self::FieldMissing { target, .. }
            | Self::FieldTypeMismatch { target, .. }
            | Self::Validation { target, .. }
            | Self::Resource { target, .. } => target,
            Self::StorageFailure(_) => "storage",
            Self::Executor(_) => "executor",
            Self::Database(_) | Self::Io(_) | Self::Config(_) | Self::Serialization(_) => "server",
        }
    }

    /// True for rejections caused by the request itself rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::FieldMissing { .. }
                | Self::FieldTypeMismatch { .. }
                | Self::Validation { .. }
                | Self::Resource { .. }
        )
    }
}

/// Convenient Result type using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_missing_targets_form() {
        let err = GatewayError::field_missing("calibration");
        assert_eq!(err.name(), "FieldMissing");
        assert_eq!(err.target(), "form");
        assert!(err.to_string().contains("calibration"));
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = GatewayError::type_mismatch("threshold", "threshold must be a float value");
        assert_eq!(err.to_string(), "threshold must be a float value");
        assert_eq!(err.target(), "threshold");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_error_from_rusqlite() {
        let err: GatewayError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, GatewayError::Database(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GatewayError = io_err.into();
        assert!(matches!(err, GatewayError::Io(_)));
        assert_eq!(err.target(), "server");
    }

    #[test]
    fn test_storage_failure_name() {
        let err = GatewayError::StorageFailure(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.name(), "StorageFailure");
        assert_eq!(err.target(), "storage");
    }
}
