//! Manifests submitted for create and update
//!
//! A manifest arrives either as structured JSON or as text (YAML or JSON),
//! is normalized into the shape the API server accepts, and is checked
//! against the identity given by the request path before it is sent.

mod normalize;
mod structured;
mod timestamps;

#[cfg(test)]
mod tests;

pub use normalize::{normalize_for_create, normalize_for_update, SERVER_METADATA_FIELDS};
pub use structured::StructuredOrEmpty;
pub use timestamps::{canonicalize_timestamps, TIMESTAMP_KEYS};

use crate::error::ValidationError;
use crate::kinds::{validate_object_name, ResourceKind};
use serde::Serialize;
use serde_json::{Map, Value};

/// A normalized manifest ready to be sent to the API server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn api_version(&self) -> Option<&str> {
        self.0.get("apiVersion").and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.0
            .get("metadata")
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Identity an update request is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTarget {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: Option<String>,
}

impl UpdateTarget {
    /// Build a target from path parameters. Namespaced kinds require a
    /// namespace, cluster-scoped kinds ignore it.
    pub fn new(
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Self, ValidationError> {
        validate_object_name("name", name)?;

        let namespace = if kind.namespaced() {
            let ns = namespace.ok_or(ValidationError::MissingField("namespace"))?;
            validate_object_name("namespace", ns)?;
            Some(ns.to_string())
        } else {
            None
        };

        Ok(Self {
            kind,
            name: name.to_string(),
            namespace,
        })
    }

    pub fn item_path(&self) -> String {
        self.kind.item_path(self.namespace.as_deref(), &self.name)
    }
}

/// Parse a text manifest (YAML, which also covers JSON) into structured form
pub fn parse_manifest_text(text: &str) -> Result<Value, ValidationError> {
    let value: Value =
        serde_yaml::from_str(text).map_err(|e| ValidationError::Parse(e.to_string()))?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(ValidationError::invalid("manifest", "must be a mapping"))
    }
}

/// Accept a structured manifest, a JSON string holding a text manifest, or
/// an envelope `{"manifest": "<text>"}`
pub fn resolve_manifest_input(input: Value) -> Result<Value, ValidationError> {
    match input {
        Value::String(text) => parse_manifest_text(&text),
        Value::Object(map) if !map.contains_key("kind") => match map.get("manifest") {
            Some(Value::String(text)) => parse_manifest_text(text),
            _ => Ok(Value::Object(map)),
        },
        other => Ok(other),
    }
}
