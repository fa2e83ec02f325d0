use super::{created_at, or_na};
use crate::classifier::{classify_node, NodeRole, NodeStatus};
use crate::objects::{Node, Pod};
use crate::units::{round_to, to_cores, to_gigabytes};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub name: String,
    pub status: NodeStatus,
    pub role: NodeRole,
    pub kubelet_version: String,
    pub cpu_cores: f64,
    pub memory_gb: f64,
    pub pods: usize,
    pub pod_capacity: u32,
    pub created_at: String,
}

/// Number of scheduled pods per node name, computed in one pass
pub fn count_pods_by_node(pods: &[Pod]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for pod in pods {
        if let Some(node) = pod.spec.node_name.as_deref().filter(|n| !n.is_empty()) {
            *counts.entry(node.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

pub fn format_node(node: &Node, pod_counts: &HashMap<String, usize>) -> NodeSummary {
    let name = node.metadata.name_or_empty();
    let classification = classify_node(node);
    let capacity = &node.status.capacity;

    NodeSummary {
        pods: pod_counts.get(&name).copied().unwrap_or(0),
        status: classification.status,
        role: classification.role,
        kubelet_version: or_na(node.status.node_info.kubelet_version.as_ref()),
        cpu_cores: capacity.get("cpu").map(|q| to_cores(q)).unwrap_or(0.0),
        memory_gb: capacity
            .get("memory")
            .map(|q| round_to(to_gigabytes(q), 2))
            .unwrap_or(0.0),
        pod_capacity: capacity
            .get("pods")
            .and_then(|q| q.trim().parse().ok())
            .unwrap_or(0),
        created_at: created_at(&node.metadata),
        name,
    }
}

/// Format a node list; the pod list is grouped once for all nodes
pub fn format_nodes(nodes: &[Node], pods: &[Pod]) -> Vec<NodeSummary> {
    let pod_counts = count_pods_by_node(pods);
    nodes
        .iter()
        .map(|node| format_node(node, &pod_counts))
        .collect()
}
