//! API client for communicating with the panel

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Non-2xx answer of the panel
#[derive(Debug, Error)]
#[error("panel responded with {status}: {message}")]
pub struct PanelApiError {
    pub status: u16,
    pub message: String,
}

/// API client for the panel
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let mut base_url = Url::parse(base_url).context("Invalid panel URL")?;
        // Relative paths join below the base path only with a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .context("Invalid path")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PanelApiError {
                status,
                message: error_message(&body),
            }
            .into());
        }

        Ok(response)
    }

    /// Make a GET request with optional query parameters
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let request = self.client.get(self.url(path)?).query(query);
        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    /// POST a text manifest
    pub async fn post_manifest(&self, path: &str, manifest: String) -> Result<Value> {
        let request = self
            .client
            .post(self.url(path)?)
            .header("content-type", "application/yaml")
            .body(manifest);
        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    /// PUT a text manifest
    pub async fn put_manifest(&self, path: &str, manifest: String) -> Result<Value> {
        let request = self
            .client
            .put(self.url(path)?)
            .header("content-type", "application/yaml")
            .body(manifest);
        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Value> {
        let request = self.client.delete(self.url(path)?);
        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }
}

/// Panel errors and Kubernetes `Status` objects both carry a `message`
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
