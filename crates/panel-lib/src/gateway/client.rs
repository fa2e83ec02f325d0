//! HTTPS client for the Kubernetes API server
//!
//! Authenticates with a static bearer token. Certificate verification is
//! disabled by default: the panel runs next to the cluster and talks to an
//! API server whose certificate is usually signed by the cluster CA. This is
//! a deliberate trust compromise and can be turned off through
//! `accept_invalid_certs`.

use super::{async_trait, KubeGateway, Method, UpstreamResponse};
use crate::error::{PanelError, Result};
use crate::observability::PanelMetrics;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Connection settings for the API server, built once and injected
#[derive(Clone)]
pub struct KubeConfig {
    pub api_url: Url,
    pub token: String,
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl KubeConfig {
    pub fn new(api_url: &str, token: impl Into<String>) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| PanelError::Config(format!("invalid API URL `{}`: {}", api_url, e)))?;

        Ok(Self {
            api_url,
            token: token.into().trim().to_string(),
            timeout: Duration::from_secs(30),
            accept_invalid_certs: true,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

impl fmt::Debug for KubeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeConfig")
            .field("api_url", &self.api_url.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

pub struct HttpGateway {
    client: Client,
    config: KubeConfig,
    metrics: PanelMetrics,
}

impl HttpGateway {
    pub fn new(config: KubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| PanelError::Config(format!("failed to create HTTP client: {}", e)))?;

        if config.accept_invalid_certs {
            warn!(
                api_url = %config.api_url,
                "TLS certificate verification is disabled for the Kubernetes API"
            );
        }

        Ok(Self {
            client,
            config,
            metrics: PanelMetrics::new(),
        })
    }

    /// API paths are appended to the base URL so that a path prefix on the
    /// base (for example an API proxy) is kept
    fn url(&self, path: &str) -> Result<Url> {
        let raw = format!(
            "{}/{}",
            self.config.api_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| PanelError::Config(format!("invalid path `{}`: {}", path, e)))
    }

    fn parse_body(bytes: &[u8]) -> Value {
        if bytes.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
    }
}

#[async_trait]
impl KubeGateway for HttpGateway {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse> {
        let url = self.url(path)?;

        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        }
        .bearer_auth(&self.config.token)
        .header("accept", "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let result = request.send().await;
        self.metrics
            .observe_upstream_latency(method.as_str(), started.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            self.metrics.inc_upstream_errors("transport");
            PanelError::Transport(e.to_string())
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            self.metrics.inc_upstream_errors("transport");
            PanelError::Transport(e.to_string())
        })?;
        let body = Self::parse_body(&bytes);

        debug!(method = %method, path = %path, status = status.as_u16(), "Kubernetes API call");

        if !status.is_success() {
            self.metrics.inc_upstream_errors("upstream");
            return Err(PanelError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(UpstreamResponse {
            status: status.as_u16(),
            body,
        })
    }

    fn endpoint(&self) -> String {
        self.config.api_url.to_string()
    }
}
