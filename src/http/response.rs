//! Error responses.
//!
//! # Responsibilities
//! - Map every error kind to a distinct HTTP status
//! - Render errors as `{"error": "..."}` (`{"errors": {...}}` for validation)
//!
//! # Design Decisions
//! - Caller errors are 4xx; only storage failures are 5xx
//! - Storage details are logged, not leaked to the client

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::service::ServiceError;

/// Anything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The `version` query parameter is not an integer.
    #[error("version must be integer")]
    InvalidVersion,

    /// The render context body is not a JSON object.
    #[error("Invalid JSON context: {0}")]
    InvalidContext(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidVersion | ApiError::InvalidContext(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::Decode(_) | ServiceError::Template(_) => StatusCode::BAD_REQUEST,
                ServiceError::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::DuplicateVersion { .. } | ServiceError::VersionExhausted(_) => {
                    StatusCode::CONFLICT
                }
                ServiceError::VersionNotFound { .. } | ServiceError::ServiceNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> serde_json::Value {
        let message = match self {
            ApiError::Service(ServiceError::Schema(errors)) => return json!({ "errors": errors }),
            ApiError::Service(ServiceError::DuplicateVersion { .. }) => "duplicate version".to_string(),
            ApiError::Service(ServiceError::VersionNotFound { .. }) => {
                "service or version not found".to_string()
            }
            ApiError::Service(ServiceError::ServiceNotFound(_)) => "service not found".to_string(),
            ApiError::Service(ServiceError::Template(err)) => format!("Template rendering error: {err}"),
            ApiError::Service(ServiceError::Storage(_)) => "storage error".to_string(),
            other => other.to_string(),
        };
        json!({ "error": message })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
