//! Dashboard operations
//!
//! Every request of the panel goes through [`Dashboard`]: it fetches raw
//! objects through the [`KubeGateway`], shapes them into summaries, and
//! normalizes manifests before they are written back. Manifests that fail
//! validation never reach the API server.

use crate::cluster::{build_cluster_metrics, ClusterMetrics};
use crate::error::{PanelError, Result, ValidationError};
use crate::format::{
    format_deployment, format_ingress, format_namespace, format_nodes, format_pod,
    format_service, DeploymentSummary, IngressSummary, NamespaceSummary, NodeSummary,
    PodSummary, ServiceSummary,
};
use crate::gateway::{KubeGateway, Method, UpstreamResponse};
use crate::health::{components, HealthRegistry};
use crate::kinds::{validate_object_name, ResourceKind};
use crate::manifest::{
    normalize_for_create, normalize_for_update, resolve_manifest_input, UpdateTarget,
};
use crate::objects::{
    Deployment, Ingress, Namespace, Node, NodeMetrics, ObjectList, PersistentVolume, Pod,
    PodMetrics, Service,
};
use crate::observability::{PanelMetrics, StructuredLogger};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

const NODE_METRICS_PATH: &str = "/apis/metrics.k8s.io/v1beta1/nodes";
const POD_METRICS_PATH: &str = "/apis/metrics.k8s.io/v1beta1/pods";
const PERSISTENT_VOLUMES_PATH: &str = "/api/v1/persistentvolumes";

pub struct Dashboard {
    gateway: Arc<dyn KubeGateway>,
    health: HealthRegistry,
    metrics: PanelMetrics,
    logger: StructuredLogger,
}

impl Dashboard {
    pub fn new(gateway: Arc<dyn KubeGateway>, health: HealthRegistry) -> Self {
        let logger = StructuredLogger::new(gateway.endpoint());
        Self {
            gateway,
            health,
            metrics: PanelMetrics::new(),
            logger,
        }
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Single round trip to the API server with health bookkeeping
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse> {
        match self.gateway.send(method, path, body).await {
            Ok(response) => {
                self.health.set_healthy(components::KUBE_API).await;
                Ok(response)
            }
            Err(err) => {
                match &err {
                    PanelError::Transport(detail) => {
                        self.health
                            .set_degraded(components::KUBE_API, detail.clone())
                            .await;
                    }
                    // The server answered, so it is reachable
                    PanelError::Upstream { .. } => {
                        self.health.set_healthy(components::KUBE_API).await;
                    }
                    _ => {}
                }
                self.logger
                    .log_upstream_failure(path, err.kind(), &err.to_string());
                Err(err)
            }
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let list: ObjectList<T> = self.call(Method::Get, path, None).await?.decode(path)?;
        Ok(list.items)
    }

    fn reject(&self, kind: ResourceKind, name: &str, err: ValidationError) -> PanelError {
        self.metrics.inc_validation_failures();
        self.logger
            .log_rejected_manifest(kind.kind(), name, &err.to_string());
        PanelError::Validation(err)
    }

    /// Path of a single object, checked before anything is sent
    fn object_path(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<String> {
        UpdateTarget::new(kind, namespace, name)
            .map(|target| target.item_path())
            .map_err(|e| self.reject(kind, name, e))
    }

    /// API discovery document, passed through unchanged
    pub async fn api_versions(&self) -> Result<Value> {
        self.metrics.inc_requests("api", "versions");
        Ok(self.call(Method::Get, "/api", None).await?.body)
    }

    /// Nodes with their pod counts. The pod list is fetched once for all nodes.
    pub async fn list_nodes(&self) -> Result<Vec<NodeSummary>> {
        let nodes: Vec<Node> = self
            .fetch_list(&ResourceKind::Node.collection_path(None))
            .await?;
        let pods: Vec<Pod> = self
            .fetch_list(&ResourceKind::Pod.collection_path(None))
            .await?;
        Ok(format_nodes(&nodes, &pods))
    }

    pub async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodSummary>> {
        let pods: Vec<Pod> = self
            .fetch_list(&ResourceKind::Pod.collection_path(namespace))
            .await?;
        Ok(pods.iter().map(format_pod).collect())
    }

    pub async fn list_services(&self, namespace: Option<&str>) -> Result<Vec<ServiceSummary>> {
        let services: Vec<Service> = self
            .fetch_list(&ResourceKind::Service.collection_path(namespace))
            .await?;
        Ok(services.iter().map(format_service).collect())
    }

    pub async fn list_deployments(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<DeploymentSummary>> {
        let deployments: Vec<Deployment> = self
            .fetch_list(&ResourceKind::Deployment.collection_path(namespace))
            .await?;
        Ok(deployments.iter().map(format_deployment).collect())
    }

    pub async fn list_ingresses(&self, namespace: Option<&str>) -> Result<Vec<IngressSummary>> {
        let ingresses: Vec<Ingress> = self
            .fetch_list(&ResourceKind::Ingress.collection_path(namespace))
            .await?;
        Ok(ingresses.iter().map(format_ingress).collect())
    }

    pub async fn list_namespaces(&self) -> Result<Vec<NamespaceSummary>> {
        let namespaces: Vec<Namespace> = self
            .fetch_list(&ResourceKind::Namespace.collection_path(None))
            .await?;
        Ok(namespaces.iter().map(format_namespace).collect())
    }

    /// Summaries of any served kind as JSON. The namespace filter is ignored
    /// for cluster-scoped kinds.
    pub async fn list(&self, kind: ResourceKind, namespace: Option<&str>) -> Result<Value> {
        if let Some(ns) = namespace {
            validate_object_name("namespace", ns).map_err(|e| self.reject(kind, ns, e))?;
        }
        self.metrics.inc_requests(kind.plural(), "list");

        match kind {
            ResourceKind::Node => to_json(kind, &self.list_nodes().await?),
            ResourceKind::Pod => to_json(kind, &self.list_pods(namespace).await?),
            ResourceKind::Service => to_json(kind, &self.list_services(namespace).await?),
            ResourceKind::Namespace => to_json(kind, &self.list_namespaces().await?),
            ResourceKind::Deployment => to_json(kind, &self.list_deployments(namespace).await?),
            ResourceKind::Ingress => to_json(kind, &self.list_ingresses(namespace).await?),
        }
    }

    /// Raw manifest of one object
    pub async fn get(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Value> {
        let path = self.object_path(kind, namespace, name)?;
        self.metrics.inc_requests(kind.plural(), "get");
        Ok(self.call(Method::Get, &path, None).await?.body)
    }

    /// Create an object from a structured or text manifest. The answer keeps
    /// the API server's status code.
    pub async fn create(&self, kind: ResourceKind, body: Value) -> Result<UpstreamResponse> {
        let manifest = resolve_manifest_input(body)
            .and_then(|value| normalize_for_create(value, kind))
            .map_err(|e| self.reject(kind, "-", e))?;

        let name = manifest.name().unwrap_or_default().to_string();
        let namespace = manifest.namespace().map(str::to_string);
        let path = kind.collection_path(namespace.as_deref());
        self.metrics.inc_requests(kind.plural(), "create");

        let response = self
            .call(Method::Post, &path, Some(&manifest.into_value()))
            .await?;
        self.logger.log_change(
            "resource_created",
            kind.kind(),
            namespace.as_deref(),
            &name,
            response.status,
        );
        Ok(response)
    }

    /// Replace the object addressed by `target` with a normalized manifest
    pub async fn update(&self, target: &UpdateTarget, body: Value) -> Result<UpstreamResponse> {
        let manifest = resolve_manifest_input(body)
            .and_then(|value| normalize_for_update(value, target))
            .map_err(|e| self.reject(target.kind, &target.name, e))?;
        self.metrics.inc_requests(target.kind.plural(), "update");

        let response = self
            .call(Method::Put, &target.item_path(), Some(&manifest.into_value()))
            .await?;
        self.logger.log_change(
            "resource_updated",
            target.kind.kind(),
            target.namespace.as_deref(),
            &target.name,
            response.status,
        );
        Ok(response)
    }

    /// Update addressed by raw path segments, rejected like any other
    /// invalid manifest when the address itself is malformed
    pub async fn update_at(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
        body: Value,
    ) -> Result<UpstreamResponse> {
        let target =
            UpdateTarget::new(kind, namespace, name).map_err(|e| self.reject(kind, name, e))?;
        self.update(&target, body).await
    }

    pub async fn delete(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<UpstreamResponse> {
        let path = self.object_path(kind, namespace, name)?;
        self.metrics.inc_requests(kind.plural(), "delete");

        let response = self.call(Method::Delete, &path, None).await?;
        self.logger.log_change(
            "resource_deleted",
            kind.kind(),
            namespace.filter(|_| kind.namespaced()),
            name,
            response.status,
        );
        Ok(response)
    }

    /// Cluster overview from metrics-server. Persistent volumes are optional:
    /// when they cannot be listed the storage section is left out.
    pub async fn cluster_metrics(&self) -> Result<ClusterMetrics> {
        self.metrics.inc_requests("cluster", "metrics");
        let node_metrics: Vec<NodeMetrics> = self.fetch_list(NODE_METRICS_PATH).await?;
        let nodes: Vec<Node> = self
            .fetch_list(&ResourceKind::Node.collection_path(None))
            .await?;
        let pod_metrics: Vec<PodMetrics> = self.fetch_list(POD_METRICS_PATH).await?;

        let volumes: Option<Vec<PersistentVolume>> =
            match self.fetch_list(PERSISTENT_VOLUMES_PATH).await {
                Ok(volumes) => Some(volumes),
                Err(e) => {
                    warn!(error = %e, "Persistent volumes unavailable, omitting storage");
                    None
                }
            };

        Ok(build_cluster_metrics(
            &node_metrics,
            &nodes,
            &pod_metrics,
            volumes.as_deref(),
        ))
    }
}

fn to_json<T: Serialize>(kind: ResourceKind, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| PanelError::Decode {
        path: kind.plural().to_string(),
        message: e.to_string(),
    })
}
