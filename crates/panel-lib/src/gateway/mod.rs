//! Access to the Kubernetes API server
//!
//! The panel only talks to the API server through [`KubeGateway`], which
//! keeps the dashboard logic testable against a mock backend.

mod client;

pub use client::{HttpGateway, KubeConfig};
pub use async_trait::async_trait;

use crate::error::{PanelError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful (2xx) response of the API server
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    /// Decode the body into a typed view
    pub fn decode<T: DeserializeOwned>(self, path: &str) -> Result<T> {
        serde_json::from_value(self.body).map_err(|e| PanelError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// A Kubernetes API backend. Non-2xx answers surface as
/// [`PanelError::Upstream`], connection failures as [`PanelError::Transport`].
#[async_trait]
pub trait KubeGateway: Send + Sync {
    async fn send(&self, method: Method, path: &str, body: Option<&Value>)
        -> Result<UpstreamResponse>;

    /// Human-readable name of the backend, used in logs
    fn endpoint(&self) -> String;

    async fn get(&self, path: &str) -> Result<UpstreamResponse> {
        self.send(Method::Get, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<UpstreamResponse> {
        self.send(Method::Post, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<UpstreamResponse> {
        self.send(Method::Put, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<UpstreamResponse> {
        self.send(Method::Delete, path, None).await
    }
}
