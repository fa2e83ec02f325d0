//! Manifest normalization and identity checks
//!
//! Transformations run first (strip server-set fields, canonicalize
//! timestamps, normalize pod specs), then the checks run against the
//! transformed manifest. Every step is idempotent.

use super::structured::StructuredOrEmpty;
use super::timestamps::canonicalize_timestamps;
use super::{Manifest, UpdateTarget};
use crate::error::ValidationError;
use crate::kinds::{validate_object_name, ResourceKind};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Metadata fields owned by the API server
pub const SERVER_METADATA_FIELDS: &[&str] =
    &["uid", "resourceVersion", "managedFields", "creationTimestamp"];

const CONTAINER_LISTS: &[&str] = &["containers", "initContainers"];

pub fn normalize_for_update(
    manifest: Value,
    target: &UpdateTarget,
) -> Result<Manifest, ValidationError> {
    let mut map = into_object(manifest)?;
    transform(&mut map, target.kind)?;

    for field in ["apiVersion", "kind", "metadata", "spec"] {
        require(&map, field)?;
    }
    check_type(&map, target.kind)?;

    let metadata = metadata(&map)?;
    check_metadata_field(metadata, "name", "metadata.name", &target.name)?;
    if let Some(namespace) = target.namespace.as_deref() {
        check_metadata_field(metadata, "namespace", "metadata.namespace", namespace)?;
    }

    Ok(Manifest::from_map(map))
}

/// Normalize a manifest for creation. `spec` is optional and namespaced
/// kinds fall back to the `default` namespace.
pub fn normalize_for_create(
    manifest: Value,
    kind: ResourceKind,
) -> Result<Manifest, ValidationError> {
    let mut map = into_object(manifest)?;
    transform(&mut map, kind)?;

    for field in ["apiVersion", "kind", "metadata"] {
        require(&map, field)?;
    }
    check_type(&map, kind)?;

    let metadata = metadata_mut(&mut map)?;
    let name = metadata
        .get("name")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingField("metadata.name"))?;
    validate_object_name("metadata.name", name)?;

    if kind.namespaced() {
        let namespace = metadata
            .entry("namespace")
            .or_insert_with(|| Value::String("default".to_string()));
        let namespace = namespace
            .as_str()
            .ok_or_else(|| ValidationError::invalid("metadata.namespace", "must be a string"))?;
        validate_object_name("metadata.namespace", namespace)?;
    }

    Ok(Manifest::from_map(map))
}

fn into_object(manifest: Value) -> Result<Map<String, Value>, ValidationError> {
    match manifest {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::invalid("manifest", "must be an object")),
    }
}

fn transform(map: &mut Map<String, Value>, kind: ResourceKind) -> Result<(), ValidationError> {
    strip_server_fields(map);

    for value in map.values_mut() {
        canonicalize_timestamps(value);
    }

    let (pod_spec, path) = match kind {
        ResourceKind::Pod => (map.get_mut("spec"), "spec"),
        ResourceKind::Deployment => (
            map.get_mut("spec")
                .and_then(|s| s.get_mut("template"))
                .and_then(|t| t.get_mut("spec")),
            "spec.template.spec",
        ),
        _ => (None, ""),
    };

    match pod_spec {
        Some(Value::Object(spec)) => normalize_pod_spec(spec, path),
        Some(Value::Null) | None => Ok(()),
        Some(_) => Err(ValidationError::invalid(path, "must be an object")),
    }
}

fn strip_server_fields(map: &mut Map<String, Value>) {
    map.remove("status");
    if let Some(Value::Object(metadata)) = map.get_mut("metadata") {
        for field in SERVER_METADATA_FIELDS {
            metadata.remove(*field);
        }
    }
}

fn normalize_pod_spec(spec: &mut Map<String, Value>, path: &str) -> Result<(), ValidationError> {
    spec.entry("containers")
        .or_insert_with(|| Value::Array(Vec::new()));

    for list_key in CONTAINER_LISTS {
        let Some(slot) = spec.get_mut(*list_key) else {
            continue;
        };
        let list_path = format!("{}.{}", path, list_key);
        let mut containers = coerce_container_list(slot.take(), &list_path)?;
        for (index, container) in containers.iter_mut().enumerate() {
            normalize_container(container, &format!("{}[{}]", list_path, index))?;
        }
        *slot = Value::Array(containers);
    }

    if let Some(security_context) = spec.get_mut("securityContext") {
        coerce_structured(security_context, &format!("{}.securityContext", path))?;
    }

    Ok(())
}

fn looks_like_container(map: &Map<String, Value>) -> bool {
    map.contains_key("name") || map.contains_key("image")
}

/// A map is keyed by container name only when every entry is a container
fn is_keyed_containers(map: &Map<String, Value>) -> bool {
    map.values()
        .all(|v| v.as_object().is_some_and(looks_like_container))
}

fn coerce_container_list(value: Value, path: &str) -> Result<Vec<Value>, ValidationError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::Object(map) if !looks_like_container(&map) && is_keyed_containers(&map) => {
            Ok(map.into_iter().map(|(_, container)| container).collect())
        }
        Value::Object(map) => Ok(vec![Value::Object(map)]),
        _ => Err(ValidationError::invalid(path, "must be a list of containers")),
    }
}

fn normalize_container(container: &mut Value, path: &str) -> Result<(), ValidationError> {
    let Value::Object(container) = container else {
        return Err(ValidationError::invalid(path, "must be an object"));
    };

    if let Some(security_context) = container.get_mut("securityContext") {
        coerce_structured(security_context, &format!("{}.securityContext", path))?;
    }

    if let Some(resources) = container.get_mut("resources") {
        let resources_path = format!("{}.resources", path);
        coerce_structured(resources, &resources_path)?;
        if let Value::Object(resources) = resources {
            for key in ["limits", "requests"] {
                if let Some(slot) = resources.get_mut(key) {
                    coerce_structured(slot, &format!("{}.{}", resources_path, key))?;
                }
            }
        }
    }

    Ok(())
}

fn coerce_structured(slot: &mut Value, path: &str) -> Result<(), ValidationError> {
    let decoded = StructuredOrEmpty::deserialize(slot.take())
        .map_err(|e| ValidationError::invalid(path, e.to_string()))?;
    *slot = decoded.into_value();
    Ok(())
}

fn require(map: &Map<String, Value>, field: &'static str) -> Result<(), ValidationError> {
    match map.get(field) {
        Some(Value::Null) | None => Err(ValidationError::MissingField(field)),
        Some(_) => Ok(()),
    }
}

fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    }
}

fn check_equals(
    map: &Map<String, Value>,
    key: &str,
    field: &'static str,
    expected: &str,
) -> Result<(), ValidationError> {
    let actual = map.get(key);
    if actual.and_then(Value::as_str) == Some(expected) {
        Ok(())
    } else {
        Err(ValidationError::Mismatch {
            field,
            expected: expected.to_string(),
            actual: display(actual),
        })
    }
}

fn check_type(map: &Map<String, Value>, kind: ResourceKind) -> Result<(), ValidationError> {
    check_equals(map, "apiVersion", "apiVersion", kind.api_version())?;
    check_equals(map, "kind", "kind", kind.kind())
}

fn check_metadata_field(
    metadata: &Map<String, Value>,
    key: &str,
    field: &'static str,
    expected: &str,
) -> Result<(), ValidationError> {
    match metadata.get(key) {
        Some(Value::Null) | None => Err(ValidationError::MissingField(field)),
        Some(_) => check_equals(metadata, key, field, expected),
    }
}

fn metadata(map: &Map<String, Value>) -> Result<&Map<String, Value>, ValidationError> {
    map.get("metadata")
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::invalid("metadata", "must be an object"))
}

fn metadata_mut(map: &mut Map<String, Value>) -> Result<&mut Map<String, Value>, ValidationError> {
    map.get_mut("metadata")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ValidationError::invalid("metadata", "must be an object"))
}
