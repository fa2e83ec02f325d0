//! Flattening of Kubernetes list responses into dashboard summary records
//!
//! Every record field has a documented fallback so that sparse objects
//! still render. Records serialize in camelCase.

mod networking;
mod nodes;
mod workloads;

pub use networking::{format_ingress, format_service, IngressSummary, ServiceSummary};
pub use nodes::{count_pods_by_node, format_node, format_nodes, NodeSummary};
pub use workloads::{
    format_deployment, format_namespace, format_pod, DeploymentSummary, NamespaceSummary,
    PodSummary,
};

use crate::objects::ObjectMeta;

/// Placeholder for absent optional strings
pub const NOT_AVAILABLE: &str = "N/A";

fn or_na(value: Option<&String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn created_at(meta: &ObjectMeta) -> String {
    or_na(meta.creation_timestamp.as_ref())
}

fn namespace_of(meta: &ObjectMeta) -> String {
    meta.namespace
        .clone()
        .unwrap_or_else(|| "default".to_string())
}
