use super::{created_at, namespace_of, or_na};
use crate::objects::{Deployment, Namespace, Pod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSummary {
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub node: String,
    pub pod_ip: String,
    pub restarts: u32,
    pub containers: usize,
    pub created_at: String,
}

pub fn format_pod(pod: &Pod) -> PodSummary {
    let restarts = pod
        .status
        .container_statuses
        .iter()
        .map(|cs| cs.restart_count.unwrap_or(0))
        .sum();

    PodSummary {
        name: pod.metadata.name_or_empty(),
        namespace: namespace_of(&pod.metadata),
        status: pod
            .status
            .phase
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        node: or_na(pod.spec.node_name.as_ref()),
        pod_ip: or_na(pod.status.pod_ip.as_ref()),
        restarts,
        containers: pod.spec.containers.len(),
        created_at: created_at(&pod.metadata),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSummary {
    pub name: String,
    pub status: String,
    pub labels: BTreeMap<String, String>,
    pub created_at: String,
}

pub fn format_namespace(namespace: &Namespace) -> NamespaceSummary {
    NamespaceSummary {
        name: namespace.metadata.name_or_empty(),
        status: namespace
            .status
            .phase
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        labels: namespace.metadata.labels.clone(),
        created_at: created_at(&namespace.metadata),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub ready: i32,
    pub available: i32,
    pub updated: i32,
    pub images: Vec<String>,
    pub created_at: String,
}

pub fn format_deployment(deployment: &Deployment) -> DeploymentSummary {
    let status = &deployment.status;

    DeploymentSummary {
        name: deployment.metadata.name_or_empty(),
        namespace: namespace_of(&deployment.metadata),
        replicas: deployment.spec.replicas.unwrap_or(0),
        ready: status.ready_replicas.unwrap_or(0),
        available: status.available_replicas.unwrap_or(0),
        updated: status.updated_replicas.unwrap_or(0),
        images: deployment
            .spec
            .template
            .spec
            .containers
            .iter()
            .filter_map(|c| c.image.clone())
            .collect(),
        created_at: created_at(&deployment.metadata),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pod_restarts_sum_with_missing_counts() {
        let pod: Pod = serde_json::from_value(json!({
            "metadata": {"name": "web-0", "namespace": "shop"},
            "spec": {
                "nodeName": "worker-1",
                "containers": [{"name": "web"}, {"name": "sidecar"}, {"name": "init"}]
            },
            "status": {
                "phase": "Running",
                "podIP": "10.1.0.12",
                "containerStatuses": [
                    {"name": "web", "restartCount": 3},
                    {"name": "sidecar"},
                    {"name": "init", "restartCount": 2}
                ]
            }
        }))
        .unwrap();

        let summary = format_pod(&pod);
        assert_eq!(summary.restarts, 5);
        assert_eq!(summary.containers, 3);
        assert_eq!(summary.status, "Running");
        assert_eq!(summary.node, "worker-1");
        assert_eq!(summary.pod_ip, "10.1.0.12");
        assert_eq!(summary.namespace, "shop");
    }

    #[test]
    fn test_pending_pod_fallbacks() {
        let pod: Pod = serde_json::from_value(json!({
            "metadata": {"name": "pending"}
        }))
        .unwrap();

        let summary = format_pod(&pod);
        assert_eq!(summary.restarts, 0);
        assert_eq!(summary.status, "Unknown");
        assert_eq!(summary.node, "N/A");
        assert_eq!(summary.pod_ip, "N/A");
        assert_eq!(summary.created_at, "N/A");
    }

    #[test]
    fn test_deployment_defaults_to_zero() {
        let deployment: Deployment = serde_json::from_value(json!({
            "metadata": {"name": "api", "namespace": "default"},
            "spec": {
                "replicas": 3,
                "template": {"spec": {"containers": [{"name": "api", "image": "api:1.2"}]}}
            },
            "status": {"readyReplicas": 2}
        }))
        .unwrap();

        let summary = format_deployment(&deployment);
        assert_eq!(summary.replicas, 3);
        assert_eq!(summary.ready, 2);
        assert_eq!(summary.available, 0);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.images, vec!["api:1.2".to_string()]);
    }

    #[test]
    fn test_namespace_summary() {
        let ns: Namespace = serde_json::from_value(json!({
            "metadata": {"name": "kube-system", "labels": {"team": "platform"}},
            "status": {"phase": "Active"}
        }))
        .unwrap();

        let summary = format_namespace(&ns);
        assert_eq!(summary.status, "Active");
        assert_eq!(summary.labels["team"], "platform");
        assert_eq!(format_namespace(&Namespace::default()).status, "Unknown");
    }
}
