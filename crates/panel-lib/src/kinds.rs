//! Resource kinds served by the panel and their API paths

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Node,
    Pod,
    Service,
    Namespace,
    Deployment,
    Ingress,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Node,
        ResourceKind::Pod,
        ResourceKind::Service,
        ResourceKind::Namespace,
        ResourceKind::Deployment,
        ResourceKind::Ingress,
    ];

    /// Value of the manifest `kind` field
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceKind::Node => "Node",
            ResourceKind::Pod => "Pod",
            ResourceKind::Service => "Service",
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::Ingress => "Ingress",
        }
    }

    /// Value of the manifest `apiVersion` field
    pub fn api_version(&self) -> &'static str {
        match self {
            ResourceKind::Node
            | ResourceKind::Pod
            | ResourceKind::Service
            | ResourceKind::Namespace => "v1",
            ResourceKind::Deployment => "apps/v1",
            ResourceKind::Ingress => "networking.k8s.io/v1",
        }
    }

    /// Lowercase plural used in both the panel routes and the API paths
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Node => "nodes",
            ResourceKind::Pod => "pods",
            ResourceKind::Service => "services",
            ResourceKind::Namespace => "namespaces",
            ResourceKind::Deployment => "deployments",
            ResourceKind::Ingress => "ingresses",
        }
    }

    pub fn namespaced(&self) -> bool {
        !matches!(self, ResourceKind::Node | ResourceKind::Namespace)
    }

    pub fn from_plural(plural: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.plural() == plural)
    }

    fn api_root(&self) -> &'static str {
        match self.api_version() {
            "v1" => "/api/v1",
            "apps/v1" => "/apis/apps/v1",
            _ => "/apis/networking.k8s.io/v1",
        }
    }

    /// Collection path; `None` lists namespaced kinds across all namespaces
    pub fn collection_path(&self, namespace: Option<&str>) -> String {
        match namespace {
            Some(ns) if self.namespaced() => {
                format!("{}/namespaces/{}/{}", self.api_root(), ns, self.plural())
            }
            _ => format!("{}/{}", self.api_root(), self.plural()),
        }
    }

    /// Path of a single object; the namespace is ignored for cluster-scoped kinds
    pub fn item_path(&self, namespace: Option<&str>, name: &str) -> String {
        format!("{}/{}", self.collection_path(namespace), name)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Reject path segments that are not valid object names
pub fn validate_object_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let valid = !value.is_empty()
        && value.len() <= 253
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
        && !value.starts_with(['-', '.'])
        && !value.contains("..");

    if valid {
        Ok(())
    } else {
        Err(ValidationError::invalid(
            field,
            format!("`{}` is not a valid object name", value),
        ))
    }
}
