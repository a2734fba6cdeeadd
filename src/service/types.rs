//! Service result and error types.

use thiserror::Error;

use crate::document::{DecodeError, Document, TemplateError, ValidationErrors};
use crate::store::StoreError;
use crate::versioning::{Version, VersionExhausted, VersionSelector};

/// Errors surfaced by [`ConfigService`](crate::service::ConfigService).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The upload body could not be decoded into a mapping.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The document failed required-field validation.
    #[error("validation failed: {0}")]
    Schema(ValidationErrors),

    /// The `(service, version)` pair already exists.
    #[error("version {version} already exists for service `{service}`")]
    DuplicateVersion { service: String, version: Version },

    /// No version of `service` matches the selector.
    #[error("service `{service}` has no version {selector}")]
    VersionNotFound {
        service: String,
        selector: VersionSelector,
    },

    /// The service has never stored a version.
    #[error("service `{0}` not found")]
    ServiceNotFound(String),

    /// Rendering the stored document failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Auto-increment ran out of versions.
    #[error(transparent)]
    VersionExhausted(#[from] VersionExhausted),

    /// Any other backend failure.
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl ServiceError {
    /// Stable short name of the error kind, used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Decode(DecodeError::Syntax(_)) => "decode",
            ServiceError::Decode(DecodeError::NotAMapping) => "not_a_mapping",
            ServiceError::Schema(_) => "schema",
            ServiceError::DuplicateVersion { .. } => "duplicate_version",
            ServiceError::VersionNotFound { .. } | ServiceError::ServiceNotFound(_) => "not_found",
            ServiceError::Template(_) => "template",
            ServiceError::VersionExhausted(_) => "version_exhausted",
            ServiceError::Storage(_) => "storage",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::VersionNotFound { .. } | ServiceError::ServiceNotFound(_)
        )
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateVersion { service, version } => {
                ServiceError::DuplicateVersion { service, version }
            }
            other => ServiceError::Storage(other),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub service: String,
    pub version: Version,
}

/// A retrieved document, rendered when a context was supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedConfig {
    pub service: String,
    pub version: Version,
    pub document: Document,
    pub rendered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_duplicate_maps_to_duplicate_version() {
        let err: ServiceError = StoreError::DuplicateVersion {
            service: "orders".into(),
            version: 2,
        }
        .into();
        assert!(matches!(err, ServiceError::DuplicateVersion { version: 2, .. }));
        assert_eq!(err.kind(), "duplicate_version");
    }

    #[test]
    fn test_other_store_errors_stay_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "duplicate key violates unique constraint");
        let err: ServiceError = StoreError::Io(io).into();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(err.kind(), "storage");
    }

    #[test]
    fn test_not_found_kinds() {
        assert!(ServiceError::ServiceNotFound("x".into()).is_not_found());
        let err = ServiceError::VersionNotFound {
            service: "x".into(),
            selector: VersionSelector::Latest,
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "service `x` has no version latest");
    }
}
