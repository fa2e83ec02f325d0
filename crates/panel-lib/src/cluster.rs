//! Cluster-wide usage figures for the dashboard overview
//!
//! Built from metrics-server node and pod metrics, the node list for
//! capacities and, when available, the persistent volume list.

use crate::classifier::{node_status, NodeStatus};
use crate::objects::{Node, NodeMetrics, PersistentVolume, PodMetrics};
use crate::units::{percent, round_to, to_cores, to_gigabytes, ResourceQuantity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMetrics {
    pub nodes: NodeCounts,
    pub cpu: CpuUsage,
    pub memory: MemoryUsage,
    pub pods: PodCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageCapacity>,
    pub node_usage: Vec<NodeUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCounts {
    pub total: usize,
    pub ready: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUsage {
    pub capacity_cores: f64,
    pub usage_cores: f64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub capacity_gb: f64,
    pub usage_gb: f64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodCounts {
    pub running: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCapacity {
    pub capacity_gb: f64,
    pub volumes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUsage {
    pub name: String,
    pub cpu_cores: f64,
    pub memory_gb: f64,
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

fn quantity(map: &BTreeMap<String, String>, key: &str, convert: fn(&str) -> f64) -> f64 {
    map.get(key).map(|q| convert(q)).unwrap_or(0.0)
}

/// Combine the fetched lists into the overview
pub fn build_cluster_metrics(
    node_metrics: &[NodeMetrics],
    nodes: &[Node],
    pod_metrics: &[PodMetrics],
    volumes: Option<&[PersistentVolume]>,
) -> ClusterMetrics {
    let capacities: HashMap<String, (f64, f64)> = nodes
        .iter()
        .map(|node| {
            let capacity = &node.status.capacity;
            (
                node.metadata.name_or_empty(),
                (
                    quantity(capacity, "cpu", to_cores),
                    quantity(capacity, "memory", to_gigabytes),
                ),
            )
        })
        .collect();

    let capacity_cores: f64 = capacities.values().map(|(cpu, _)| cpu).sum();
    let capacity_gb: f64 = capacities.values().map(|(_, mem)| mem).sum();

    let node_usage: Vec<NodeUsage> = node_metrics
        .iter()
        .map(|m| {
            let name = m.metadata.name_or_empty();
            let cpu = quantity(&m.usage, "cpu", to_cores);
            let memory = quantity(&m.usage, "memory", to_gigabytes);
            let (cpu_cap, mem_cap) = capacities.get(&name).copied().unwrap_or((0.0, 0.0));
            NodeUsage {
                cpu_cores: round_to(cpu, 3),
                memory_gb: round_to(memory, 2),
                cpu_percent: percent(cpu, cpu_cap),
                memory_percent: percent(memory, mem_cap),
                name,
            }
        })
        .collect();

    let usage_cores: f64 = node_metrics
        .iter()
        .map(|m| quantity(&m.usage, "cpu", to_cores))
        .sum();
    let usage_gb: f64 = node_metrics
        .iter()
        .map(|m| quantity(&m.usage, "memory", to_gigabytes))
        .sum();

    let storage = volumes.map(|volumes| StorageCapacity {
        capacity_gb: round_to(
            volumes
                .iter()
                .filter_map(|pv| pv.spec.capacity.get("storage"))
                .map(|q| ResourceQuantity::parse(q).to_bytes())
                .sum::<f64>()
                / 1024f64.powi(3),
            2,
        ),
        volumes: volumes.len(),
    });

    ClusterMetrics {
        nodes: NodeCounts {
            total: nodes.len(),
            ready: nodes
                .iter()
                .filter(|n| node_status(n) == NodeStatus::Online)
                .count(),
        },
        cpu: CpuUsage {
            capacity_cores: round_to(capacity_cores, 3),
            usage_cores: round_to(usage_cores, 3),
            usage_percent: percent(usage_cores, capacity_cores),
        },
        memory: MemoryUsage {
            capacity_gb: round_to(capacity_gb, 2),
            usage_gb: round_to(usage_gb, 2),
            usage_percent: percent(usage_gb, capacity_gb),
        },
        pods: PodCounts {
            running: pod_metrics.len(),
        },
        storage,
        node_usage,
    }
}
