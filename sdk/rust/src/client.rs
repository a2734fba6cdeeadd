use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ClientResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub service: String,
    pub version: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub version: i64,
    pub created_at: String, // RFC 3339
}

pub struct ConfigClient {
    client: Client,
    base_url: String,
}

impl ConfigClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Build an endpoint URL. Each segment is percent-encoded, so a service
    /// name containing `/`, `?` or `#` stays a single path segment.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| format!("base URL `{}` cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check that the server is up.
    pub async fn health(&self) -> ClientResult<Value> {
        let resp = self.client.get(self.endpoint(&["health"])?).send().await?;
        parse(resp).await
    }

    /// Upload a YAML (or JSON) document for `service`.
    pub async fn upload_yaml(&self, service: &str, yaml: &str) -> ClientResult<UploadResponse> {
        parse(self.upload_raw(service, yaml).await?).await
    }

    /// Fetch a stored document. `None` selects the latest version.
    pub async fn get(&self, service: &str, version: Option<i64>) -> ClientResult<Value> {
        parse(self.get_raw(service, version, None).await?).await
    }

    /// Fetch a document rendered against `context`.
    pub async fn get_rendered(
        &self,
        service: &str,
        version: Option<i64>,
        context: &Value,
    ) -> ClientResult<Value> {
        parse(self.get_raw(service, version, Some(context)).await?).await
    }

    /// Versions of `service`, oldest first.
    pub async fn history(&self, service: &str) -> ClientResult<Vec<HistoryEntry>> {
        parse(self.history_raw(service).await?).await
    }

    pub async fn upload_raw(&self, service: &str, body: &str) -> ClientResult<Response> {
        let resp = self
            .client
            .post(self.endpoint(&["config", service])?)
            .header("content-type", "application/x-yaml")
            .body(body.to_string())
            .send()
            .await?;
        Ok(resp)
    }

    /// Perform a read, rendering when `context` is given.
    pub async fn get_raw(
        &self,
        service: &str,
        version: Option<i64>,
        context: Option<&Value>,
    ) -> ClientResult<Response> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(v) = version {
            query.push(("version", v.to_string()));
        }

        let mut req = self.client.get(self.endpoint(&["config", service])?);
        if let Some(ctx) = context {
            query.push(("template", "1".to_string()));
            req = req.json(ctx);
        }
        Ok(req.query(&query).send().await?)
    }

    pub async fn history_raw(&self, service: &str) -> ClientResult<Response> {
        let resp = self
            .client
            .get(self.endpoint(&["config", service, "history"])?)
            .send()
            .await?;
        Ok(resp)
    }
}

async fn parse<T: serde::de::DeserializeOwned>(resp: Response) -> ClientResult<T> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(format!("Server returned error status {}: {}", status, text).into());
    }

    Ok(serde_json::from_str(&text)?)
}
