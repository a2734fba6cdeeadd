//! Upload, fetch and history over a [`ConfigStore`].

use std::sync::Arc;
use std::time::Instant;

use crate::document::{decode_yaml, validate, Document, RenderContext, TemplateRenderer};
use crate::observability::metrics;
use crate::service::types::{FetchedConfig, ServiceError, ServiceResult, UploadReceipt};
use crate::store::{ConfigStore, HistoryEntry};
use crate::versioning::{declared_version, resolve_upload_version, stamp_version, VersionSelector};

/// Core configuration operations, shared by all request handlers.
#[derive(Clone)]
pub struct ConfigService {
    store: Arc<dyn ConfigStore>,
    renderer: Arc<TemplateRenderer>,
}

impl ConfigService {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            renderer: Arc::new(TemplateRenderer::new()),
        }
    }

    /// Decode a YAML/JSON body and upload it.
    pub async fn upload_yaml(&self, service: &str, body: &[u8]) -> ServiceResult<UploadReceipt> {
        let start = Instant::now();
        let result = match decode_yaml(body) {
            Ok(document) => self.store_document(service, document).await,
            Err(e) => Err(e.into()),
        };
        record("upload", &result, start);
        result
    }

    /// Validate, version and store an already-decoded document.
    pub async fn upload(&self, service: &str, document: Document) -> ServiceResult<UploadReceipt> {
        let start = Instant::now();
        let result = self.store_document(service, document).await;
        record("upload", &result, start);
        result
    }

    async fn store_document(&self, service: &str, mut document: Document) -> ServiceResult<UploadReceipt> {
        let errors = validate(&document);
        if !errors.is_empty() {
            tracing::debug!(service = %service, errors = %errors, "Document rejected by validation");
            return Err(ServiceError::Schema(errors));
        }

        let explicit = declared_version(&document).is_some();
        let latest = if explicit {
            None
        } else {
            self.store.latest_version(service).await?
        };
        let version = resolve_upload_version(&document, latest)?;
        stamp_version(&mut document, version);

        match self.store.insert(service, version, document).await {
            Ok(entry) => {
                metrics::record_stored(explicit);
                tracing::info!(service = %service, version, explicit, "Configuration stored");
                Ok(UploadReceipt {
                    service: entry.service,
                    version: entry.version,
                })
            }
            Err(err) if err.is_duplicate() => {
                tracing::warn!(service = %service, version, "Duplicate version rejected");
                Err(err.into())
            }
            Err(err) => {
                tracing::error!(service = %service, version, error = %err, "Failed to store configuration");
                Err(err.into())
            }
        }
    }

    /// Fetch a stored document, rendering it when `context` is supplied.
    pub async fn fetch(
        &self,
        service: &str,
        selector: VersionSelector,
        context: Option<&RenderContext>,
    ) -> ServiceResult<FetchedConfig> {
        let start = Instant::now();
        let result = self.fetch_inner(service, selector, context).await;
        record("fetch", &result, start);
        result
    }

    async fn fetch_inner(
        &self,
        service: &str,
        selector: VersionSelector,
        context: Option<&RenderContext>,
    ) -> ServiceResult<FetchedConfig> {
        let entry = self
            .store
            .get(service, selector)
            .await?
            .ok_or_else(|| ServiceError::VersionNotFound {
                service: service.to_owned(),
                selector,
            })?;

        let document = match context {
            Some(ctx) => self.renderer.render(&entry.document, ctx).map_err(|err| {
                tracing::debug!(service = %service, version = entry.version, error = %err, "Template rendering failed");
                err
            })?,
            None => entry.document,
        };

        Ok(FetchedConfig {
            service: entry.service,
            version: entry.version,
            document,
            rendered: context.is_some(),
        })
    }

    /// Version history of `service`, ascending. A service without versions
    /// is reported as not found.
    pub async fn history(&self, service: &str) -> ServiceResult<Vec<HistoryEntry>> {
        let start = Instant::now();
        let result = match self.store.history(service).await {
            Ok(entries) if entries.is_empty() => Err(ServiceError::ServiceNotFound(service.to_owned())),
            Ok(entries) => Ok(entries),
            Err(err) => Err(err.into()),
        };
        record("history", &result, start);
        result
    }
}

fn record<T>(operation: &'static str, result: &ServiceResult<T>, start: Instant) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(err) => err.kind(),
    };
    metrics::record_operation(operation, outcome, start);
}
