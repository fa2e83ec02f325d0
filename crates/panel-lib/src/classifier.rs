//! Node role and readiness classification
//!
//! Role inference is a heuristic: a node counts as a master when its name,
//! one of its taint keys, or one of its labels mentions the control plane.
//! The rules live in a single ordered table evaluated first-match-wins.

use crate::objects::Node;
use serde::{Deserialize, Serialize};

/// Readiness shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    Online,
    Offline,
}

/// Display role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    Master,
    Worker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeClassification {
    pub status: NodeStatus,
    pub role: NodeRole,
}

/// Predicate over a node used by the role rule chain
pub type RoleRule = fn(&Node) -> bool;

/// Ordered role rules. Order only decides which rule short-circuits first.
pub const ROLE_RULES: &[(RoleRule, NodeRole)] = &[
    (name_mentions_control_plane, NodeRole::Master),
    (taint_mentions_control_plane, NodeRole::Master),
    (label_mentions_control_plane, NodeRole::Master),
];

const NAME_MARKERS: &[&str] = &["master", "control"];
const TAINT_AND_LABEL_MARKERS: &[&str] = &["master", "control-plane"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Node name contains `master` or `control`, ignoring case
pub fn name_mentions_control_plane(node: &Node) -> bool {
    node.metadata
        .name
        .as_deref()
        .map(|name| contains_any(&name.to_lowercase(), NAME_MARKERS))
        .unwrap_or(false)
}

/// A taint key contains `master` or `control-plane`
pub fn taint_mentions_control_plane(node: &Node) -> bool {
    node.spec
        .taints
        .iter()
        .any(|taint| contains_any(&taint.key, TAINT_AND_LABEL_MARKERS))
}

/// A label key or value contains `master` or `control-plane`
pub fn label_mentions_control_plane(node: &Node) -> bool {
    node.metadata.labels.iter().any(|(key, value)| {
        contains_any(key, TAINT_AND_LABEL_MARKERS) || contains_any(value, TAINT_AND_LABEL_MARKERS)
    })
}

/// Evaluate a rule chain, falling back to `Worker` when nothing matches
pub fn role_from_rules(node: &Node, rules: &[(RoleRule, NodeRole)]) -> NodeRole {
    rules
        .iter()
        .find(|(rule, _)| rule(node))
        .map(|(_, role)| *role)
        .unwrap_or(NodeRole::Worker)
}

pub fn node_role(node: &Node) -> NodeRole {
    role_from_rules(node, ROLE_RULES)
}

/// Online iff a `Ready` condition reports `True`
pub fn node_status(node: &Node) -> NodeStatus {
    let ready = node
        .status
        .conditions
        .iter()
        .any(|c| c.type_ == "Ready" && c.status == "True");

    if ready {
        NodeStatus::Online
    } else {
        NodeStatus::Offline
    }
}

pub fn classify_node(node: &Node) -> NodeClassification {
    NodeClassification {
        status: node_status(node),
        role: node_role(node),
    }
}
