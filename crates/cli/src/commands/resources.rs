//! Listing and inspection of cluster resources

use anyhow::Result;
use panel_lib::format::{
    DeploymentSummary, IngressSummary, NamespaceSummary, NodeSummary, PodSummary, ServiceSummary,
};
use panel_lib::ResourceKind;
use serde_json::Value;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::commands::item_path;
use crate::output::{color_status, format_gb, print_json, print_table, OutputFormat};

/// Row for nodes table
#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Kubelet")]
    kubelet: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Pods")]
    pods: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

/// Row for pods table
#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "IP")]
    pod_ip: String,
    #[tabled(rename = "Restarts")]
    restarts: u32,
    #[tabled(rename = "Containers")]
    containers: usize,
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    service_type: String,
    #[tabled(rename = "Cluster IP")]
    cluster_ip: String,
    #[tabled(rename = "Ports")]
    ports: String,
}

#[derive(Tabled)]
struct NamespaceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Labels")]
    labels: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

#[derive(Tabled)]
struct DeploymentRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Ready")]
    ready: String,
    #[tabled(rename = "Available")]
    available: i32,
    #[tabled(rename = "Updated")]
    updated: i32,
    #[tabled(rename = "Images")]
    images: String,
}

#[derive(Tabled)]
struct IngressRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Hosts")]
    hosts: String,
    #[tabled(rename = "Address")]
    address: String,
}

/// List summaries of one kind, across all namespaces unless one is given
pub async fn list(
    client: &ApiClient,
    kind: ResourceKind,
    namespace: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let path = format!("kube/{}", kind.plural());
    let query: Vec<(&str, &str)> = match (&namespace, kind.namespaced()) {
        (Some(ns), true) => vec![("namespace", ns.as_str())],
        _ => Vec::new(),
    };

    if format == OutputFormat::Json {
        let items: Value = client.get(&path, &query).await?;
        return print_json(&items);
    }

    let empty = format!("No {} found", kind.plural());
    match kind {
        ResourceKind::Node => {
            let nodes: Vec<NodeSummary> = client.get(&path, &query).await?;
            let rows = nodes
                .into_iter()
                .map(|n| NodeRow {
                    status: color_status(&format!("{:?}", n.status)),
                    role: format!("{:?}", n.role),
                    kubelet: n.kubelet_version,
                    cpu: format!("{}", n.cpu_cores),
                    memory: format_gb(n.memory_gb),
                    pods: format!("{}/{}", n.pods, n.pod_capacity),
                    created_at: n.created_at,
                    name: n.name,
                })
                .collect();
            print_table::<NodeRow>(rows, &empty);
        }
        ResourceKind::Pod => {
            let pods: Vec<PodSummary> = client.get(&path, &query).await?;
            let rows = pods
                .into_iter()
                .map(|p| PodRow {
                    status: color_status(&p.status),
                    namespace: p.namespace,
                    name: p.name,
                    node: p.node,
                    pod_ip: p.pod_ip,
                    restarts: p.restarts,
                    containers: p.containers,
                })
                .collect();
            print_table::<PodRow>(rows, &empty);
        }
        ResourceKind::Service => {
            let services: Vec<ServiceSummary> = client.get(&path, &query).await?;
            let rows = services
                .into_iter()
                .map(|s| ServiceRow {
                    namespace: s.namespace,
                    name: s.name,
                    service_type: s.service_type,
                    cluster_ip: s.cluster_ip,
                    ports: s.ports.join(", "),
                })
                .collect();
            print_table::<ServiceRow>(rows, &empty);
        }
        ResourceKind::Namespace => {
            let namespaces: Vec<NamespaceSummary> = client.get(&path, &query).await?;
            let rows = namespaces
                .into_iter()
                .map(|ns| NamespaceRow {
                    status: color_status(&ns.status),
                    labels: ns
                        .labels
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect::<Vec<_>>()
                        .join(","),
                    name: ns.name,
                    created_at: ns.created_at,
                })
                .collect();
            print_table::<NamespaceRow>(rows, &empty);
        }
        ResourceKind::Deployment => {
            let deployments: Vec<DeploymentSummary> = client.get(&path, &query).await?;
            let rows = deployments
                .into_iter()
                .map(|d| DeploymentRow {
                    ready: format!("{}/{}", d.ready, d.replicas),
                    available: d.available,
                    updated: d.updated,
                    images: d.images.join(", "),
                    namespace: d.namespace,
                    name: d.name,
                })
                .collect();
            print_table::<DeploymentRow>(rows, &empty);
        }
        ResourceKind::Ingress => {
            let ingresses: Vec<IngressSummary> = client.get(&path, &query).await?;
            let rows = ingresses
                .into_iter()
                .map(|i| IngressRow {
                    hosts: i.hosts.join(", "),
                    namespace: i.namespace,
                    name: i.name,
                    class: i.class,
                    address: i.address,
                })
                .collect();
            print_table::<IngressRow>(rows, &empty);
        }
    }

    Ok(())
}

/// Print the raw manifest of one object
pub async fn show(client: &ApiClient, kind: ResourceKind, namespace: &str, name: &str) -> Result<()> {
    let object: Value = client.get(&item_path(kind, namespace, name), &[]).await?;
    print_json(&object)
}
