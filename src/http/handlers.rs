//! Route handlers for the configuration API.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::document::{RenderContext, Value};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::store::HistoryEntry;
use crate::versioning::{resolve_read_version, Version};

/// Response body of a successful upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub service: String,
    pub version: Version,
    pub status: String,
}

/// Query parameters of `GET /config/{service}`.
#[derive(Debug, Default, Deserialize)]
pub struct ReadParams {
    pub version: Option<String>,
    pub template: Option<String>,
}

impl ReadParams {
    fn version(&self) -> Result<Option<Version>, ApiError> {
        match self.version.as_deref() {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| ApiError::InvalidVersion),
        }
    }

    fn template_enabled(&self) -> bool {
        self.template
            .as_deref()
            .map(str::trim)
            .is_some_and(|t| t == "1" || t.eq_ignore_ascii_case("true"))
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn upload_config(
    State(state): State<AppState>,
    Path(service): Path<String>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let receipt = state.service.upload_yaml(&service, &body).await?;
    Ok(Json(UploadResponse {
        service: receipt.service,
        version: receipt.version,
        status: "saved".to_string(),
    }))
}

pub async fn get_config(
    State(state): State<AppState>,
    Path(service): Path<String>,
    Query(params): Query<ReadParams>,
    body: Bytes,
) -> Result<Json<crate::document::Document>, ApiError> {
    let selector = resolve_read_version(params.version()?);
    let context = if params.template_enabled() {
        Some(parse_context(&body)?)
    } else {
        None
    };

    let fetched = state.service.fetch(&service, selector, context.as_ref()).await?;
    Ok(Json(fetched.document))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    Ok(Json(state.service.history(&service).await?))
}

/// Decode a render context. An empty body is an empty context.
fn parse_context(body: &[u8]) -> Result<RenderContext, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RenderContext::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Map(map)) => Ok(map),
        Ok(other) => Err(ApiError::InvalidContext(format!(
            "expected an object, found {}",
            other.type_name()
        ))),
        Err(err) => Err(ApiError::InvalidContext(err.to_string())),
    }
}
