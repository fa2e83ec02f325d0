//! Observability infrastructure for the panel
//!
//! Provides:
//! - Prometheus metrics (upstream latency, upstream errors, rejected manifests, served requests)
//! - Structured JSON logging of resource changes with tracing

use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for Kubernetes API round trips (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PanelMetricsInner> = OnceLock::new();

struct PanelMetricsInner {
    upstream_latency_seconds: HistogramVec,
    upstream_errors: IntCounterVec,
    validation_failures: IntCounter,
    requests: IntCounterVec,
}

impl PanelMetricsInner {
    fn new() -> Self {
        Self {
            upstream_latency_seconds: register_histogram_vec!(
                "kube_panel_upstream_latency_seconds",
                "Round-trip time of calls to the Kubernetes API",
                &["method"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register upstream_latency_seconds"),

            upstream_errors: register_int_counter_vec!(
                "kube_panel_upstream_errors_total",
                "Failed calls to the Kubernetes API by failure kind",
                &["kind"]
            )
            .expect("Failed to register upstream_errors_total"),

            validation_failures: register_int_counter!(
                "kube_panel_validation_failures_total",
                "Manifests rejected before reaching the Kubernetes API"
            )
            .expect("Failed to register validation_failures_total"),

            requests: register_int_counter_vec!(
                "kube_panel_requests_total",
                "Dashboard requests served by resource and operation",
                &["resource", "operation"]
            )
            .expect("Failed to register requests_total"),
        }
    }
}

/// Panel metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct PanelMetrics {
    _private: (),
}

impl Default for PanelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PanelMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PanelMetricsInner {
        GLOBAL_METRICS.get_or_init(PanelMetricsInner::new)
    }

    pub fn observe_upstream_latency(&self, method: &str, duration_secs: f64) {
        self.inner()
            .upstream_latency_seconds
            .with_label_values(&[method])
            .observe(duration_secs);
    }

    pub fn inc_upstream_errors(&self, kind: &str) {
        self.inner().upstream_errors.with_label_values(&[kind]).inc();
    }

    pub fn inc_validation_failures(&self) {
        self.inner().validation_failures.inc();
    }

    pub fn inc_requests(&self, resource: &str, operation: &str) {
        self.inner()
            .requests
            .with_label_values(&[resource, operation])
            .inc();
    }
}

/// Structured logger for panel events
#[derive(Clone)]
pub struct StructuredLogger {
    cluster: String,
}

impl StructuredLogger {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
        }
    }

    pub fn log_startup(&self, version: &str, listen_port: u16) {
        info!(
            event = "panel_started",
            cluster = %self.cluster,
            panel_version = %version,
            listen_port = listen_port,
            "Kube panel started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "panel_shutdown",
            cluster = %self.cluster,
            reason = %reason,
            "Kube panel shutting down"
        );
    }

    pub fn log_change(
        &self,
        event: &str,
        kind: &str,
        namespace: Option<&str>,
        name: &str,
        status: u16,
    ) {
        info!(
            event = %event,
            cluster = %self.cluster,
            kind = %kind,
            namespace = namespace.unwrap_or("-"),
            name = %name,
            upstream_status = status,
            "Resource changed"
        );
    }

    pub fn log_rejected_manifest(&self, kind: &str, name: &str, reason: &str) {
        warn!(
            event = "manifest_rejected",
            cluster = %self.cluster,
            kind = %kind,
            name = %name,
            reason = %reason,
            "Manifest rejected before submission"
        );
    }

    pub fn log_upstream_failure(&self, path: &str, kind: &str, detail: &str) {
        warn!(
            event = "upstream_failure",
            cluster = %self.cluster,
            path = %path,
            failure = %kind,
            detail = %detail,
            "Kubernetes API call failed"
        );
    }
}
