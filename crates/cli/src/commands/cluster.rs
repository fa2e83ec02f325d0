//! Cluster overview command

use anyhow::Result;
use panel_lib::ClusterMetrics;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_percent, format_gb, print_json, print_table, OutputFormat};

/// Row for the per-node usage table
#[derive(Tabled)]
struct NodeUsageRow {
    #[tabled(rename = "Node")]
    name: String,
    #[tabled(rename = "CPU (cores)")]
    cpu: String,
    #[tabled(rename = "CPU %")]
    cpu_percent: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Memory %")]
    memory_percent: String,
}

/// Show cluster-wide usage
pub async fn show_metrics(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let metrics: ClusterMetrics = client.get("kube/metrics", &[]).await?;

    if format == OutputFormat::Json {
        return print_json(&metrics);
    }

    println!("Nodes:   {} ready / {} total", metrics.nodes.ready, metrics.nodes.total);
    println!(
        "CPU:     {} / {} cores ({})",
        metrics.cpu.usage_cores,
        metrics.cpu.capacity_cores,
        color_percent(metrics.cpu.usage_percent)
    );
    println!(
        "Memory:  {} / {} ({})",
        format_gb(metrics.memory.usage_gb),
        format_gb(metrics.memory.capacity_gb),
        color_percent(metrics.memory.usage_percent)
    );
    println!("Pods:    {} running", metrics.pods.running);
    if let Some(storage) = &metrics.storage {
        println!(
            "Storage: {} in {} volumes",
            format_gb(storage.capacity_gb),
            storage.volumes
        );
    }
    println!();

    let rows = metrics
        .node_usage
        .into_iter()
        .map(|n| NodeUsageRow {
            cpu: format!("{}", n.cpu_cores),
            cpu_percent: color_percent(n.cpu_percent),
            memory: format_gb(n.memory_gb),
            memory_percent: color_percent(n.memory_percent),
            name: n.name,
        })
        .collect();
    print_table::<NodeUsageRow>(rows, "No node metrics reported");

    Ok(())
}
