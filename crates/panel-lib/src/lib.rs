//! Core library of the Kubernetes panel
//!
//! This crate provides:
//! - Access to the Kubernetes API server behind a gateway trait
//! - Resource quantity conversion and node classification
//! - Summary records for the dashboard lists and the cluster overview
//! - Manifest normalization for create and update
//! - Health checks and observability

pub mod classifier;
pub mod cluster;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod gateway;
pub mod health;
pub mod kinds;
pub mod manifest;
pub mod objects;
pub mod observability;
pub mod units;

pub use classifier::{classify_node, NodeClassification, NodeRole, NodeStatus};
pub use cluster::ClusterMetrics;
pub use dashboard::Dashboard;
pub use error::{PanelError, Result, ValidationError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use kinds::ResourceKind;
pub use manifest::{Manifest, UpdateTarget};
pub use observability::{PanelMetrics, StructuredLogger};
