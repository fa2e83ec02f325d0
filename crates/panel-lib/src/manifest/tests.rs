//! Normalizer behaviour on realistic manifests

use super::*;
use crate::error::ValidationError;
use crate::kinds::ResourceKind;
use serde_json::{json, Value};

fn pod_target() -> UpdateTarget {
    UpdateTarget::new(ResourceKind::Pod, Some("shop"), "web-0").unwrap()
}

fn deployment_target() -> UpdateTarget {
    UpdateTarget::new(ResourceKind::Deployment, Some("shop"), "api").unwrap()
}

fn pod_manifest() -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": "web-0",
            "namespace": "shop",
            "uid": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "resourceVersion": "48213",
            "creationTimestamp": "2024-10-16T13:08:07Z",
            "managedFields": [{"manager": "kubectl"}],
            "labels": {"app": "web"}
        },
        "spec": {
            "securityContext": [],
            "containers": [{
                "name": "web",
                "image": "nginx:1.27",
                "resources": {"limits": [], "requests": {"cpu": "100m"}},
                "securityContext": []
            }]
        },
        "status": {"phase": "Running", "startTime": 1729083600}
    })
}

fn deployment_manifest() -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": "api", "namespace": "shop", "resourceVersion": "7"},
        "spec": {
            "replicas": 2,
            "template": {
                "metadata": {"creationTimestamp": null, "labels": {"app": "api"}},
                "spec": {
                    "containers": {"name": "api", "image": "api:1.2", "resources": []}
                }
            }
        },
        "status": {
            "conditions": [{"type": "Available", "lastUpdateTime": 1729083600}]
        }
    })
}

#[test]
fn test_update_strips_server_fields() {
    let manifest = normalize_for_update(pod_manifest(), &pod_target()).unwrap();
    let value = manifest.into_value();

    assert!(value.get("status").is_none());
    let metadata = value["metadata"].as_object().unwrap();
    for field in SERVER_METADATA_FIELDS {
        assert!(!metadata.contains_key(*field), "{} should be stripped", field);
    }
    assert_eq!(metadata["labels"]["app"], "web");
}

#[test]
fn test_update_coerces_empty_lists_to_objects() {
    let value = normalize_for_update(pod_manifest(), &pod_target())
        .unwrap()
        .into_value();

    assert_eq!(value["spec"]["securityContext"], json!({}));
    let container = &value["spec"]["containers"][0];
    assert_eq!(container["securityContext"], json!({}));
    assert_eq!(container["resources"]["limits"], json!({}));
    assert_eq!(container["resources"]["requests"], json!({"cpu": "100m"}));
}

#[test]
fn test_deployment_template_single_container_becomes_list() {
    let value = normalize_for_update(deployment_manifest(), &deployment_target())
        .unwrap()
        .into_value();

    let containers = value["spec"]["template"]["spec"]["containers"]
        .as_array()
        .unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0]["name"], "api");
    assert_eq!(containers[0]["resources"], json!({}));
    assert!(value["metadata"].get("resourceVersion").is_none());
    assert_eq!(
        value["spec"]["template"]["metadata"]["creationTimestamp"],
        Value::Null
    );
}

#[test]
fn test_keyed_container_map_becomes_list_in_order() {
    let mut manifest = pod_manifest();
    manifest["spec"]["containers"] = json!({
        "0": {"name": "web", "image": "nginx"},
        "1": {"name": "sidecar", "image": "envoy"}
    });

    let value = normalize_for_update(manifest, &pod_target())
        .unwrap()
        .into_value();
    let names: Vec<&str> = value["spec"]["containers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["web", "sidecar"]);
}

#[test]
fn test_unnamed_single_container_is_wrapped_not_split() {
    let mut manifest = pod_manifest();
    manifest["spec"]["containers"] = json!({
        "resources": {"limits": {"cpu": "1"}},
        "securityContext": []
    });

    let value = normalize_for_update(manifest, &pod_target())
        .unwrap()
        .into_value();
    let containers = value["spec"]["containers"].as_array().unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0]["resources"]["limits"]["cpu"], "1");
    assert_eq!(containers[0]["securityContext"], json!({}));
}

#[test]
fn test_absent_containers_become_empty_list() {
    let mut manifest = pod_manifest();
    manifest["spec"].as_object_mut().unwrap().remove("containers");

    let value = normalize_for_update(manifest, &pod_target())
        .unwrap()
        .into_value();
    assert_eq!(value["spec"]["containers"], json!([]));
}

#[test]
fn test_normalization_is_idempotent() {
    let once = normalize_for_update(deployment_manifest(), &deployment_target()).unwrap();
    let twice = normalize_for_update(once.clone().into_value(), &deployment_target()).unwrap();
    assert_eq!(once, twice);

    let once = normalize_for_update(pod_manifest(), &pod_target()).unwrap();
    let twice = normalize_for_update(once.clone().into_value(), &pod_target()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_name_mismatch_is_rejected() {
    let target = UpdateTarget::new(ResourceKind::Pod, Some("shop"), "web-1").unwrap();
    let err = normalize_for_update(pod_manifest(), &target).unwrap_err();
    assert_eq!(
        err,
        ValidationError::Mismatch {
            field: "metadata.name",
            expected: "web-1".to_string(),
            actual: "web-0".to_string(),
        }
    );
}

#[test]
fn test_namespace_mismatch_is_rejected() {
    let target = UpdateTarget::new(ResourceKind::Pod, Some("default"), "web-0").unwrap();
    let err = normalize_for_update(pod_manifest(), &target).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::Mismatch {
            field: "metadata.namespace",
            ..
        }
    ));
}

#[test]
fn test_missing_namespace_is_not_filled_in_on_update() {
    let mut manifest = pod_manifest();
    manifest["metadata"]
        .as_object_mut()
        .unwrap()
        .remove("namespace");
    let err = normalize_for_update(manifest, &pod_target()).unwrap_err();
    assert_eq!(err, ValidationError::MissingField("metadata.namespace"));
}

#[test]
fn test_kind_and_api_version_must_match() {
    let err = normalize_for_update(pod_manifest(), &deployment_target()).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::Mismatch {
            field: "apiVersion",
            ..
        }
    ));

    let mut manifest = pod_manifest();
    manifest["kind"] = json!("Service");
    let err = normalize_for_update(manifest, &pod_target()).unwrap_err();
    assert!(matches!(err, ValidationError::Mismatch { field: "kind", .. }));
}

#[test]
fn test_required_fields() {
    for field in ["apiVersion", "kind", "metadata", "spec"] {
        let mut manifest = pod_manifest();
        manifest.as_object_mut().unwrap().remove(field);
        let err = normalize_for_update(manifest, &pod_target()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField(field));
    }
}

#[test]
fn test_cluster_scoped_update_ignores_namespace() {
    let target = UpdateTarget::new(ResourceKind::Namespace, Some("anything"), "shop").unwrap();
    assert_eq!(target.namespace, None);
    assert_eq!(target.item_path(), "/api/v1/namespaces/shop");

    let manifest = json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {"name": "shop"},
        "spec": {"finalizers": ["kubernetes"]},
        "status": {"phase": "Active"}
    });
    let normalized = normalize_for_update(manifest, &target).unwrap();
    assert_eq!(normalized.name(), Some("shop"));
    assert!(normalized.as_map().get("status").is_none());
}

#[test]
fn test_namespaced_target_requires_namespace() {
    let err = UpdateTarget::new(ResourceKind::Service, None, "web").unwrap_err();
    assert_eq!(err, ValidationError::MissingField("namespace"));
}

#[test]
fn test_non_empty_list_security_context_is_rejected() {
    let mut manifest = pod_manifest();
    manifest["spec"]["securityContext"] = json!([{"runAsUser": 0}]);
    let err = normalize_for_update(manifest, &pod_target()).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::InvalidStructure { ref path, .. } if path == "spec.securityContext"
    ));
}

#[test]
fn test_create_defaults_namespace() {
    let manifest = json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": "api"},
        "spec": {"template": {"spec": {}}}
    });
    let normalized = normalize_for_create(manifest, ResourceKind::Deployment).unwrap();
    assert_eq!(normalized.namespace(), Some("default"));
    assert_eq!(
        normalized.as_map()["spec"]["template"]["spec"]["containers"],
        json!([])
    );
}

#[test]
fn test_create_namespace_without_spec() {
    let manifest = json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {"name": "shop"}
    });
    let normalized = normalize_for_create(manifest, ResourceKind::Namespace).unwrap();
    assert_eq!(normalized.namespace(), None);
    assert_eq!(normalized.kind(), Some("Namespace"));
}

#[test]
fn test_create_requires_valid_name() {
    let manifest = json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": "Web_0"}
    });
    assert!(normalize_for_create(manifest, ResourceKind::Pod).is_err());
}

#[test]
fn test_parse_yaml_manifest_text() {
    let text = r#"
apiVersion: v1
kind: Service
metadata:
  name: web
  namespace: shop
spec:
  type: NodePort
  ports:
    - port: 80
"#;
    let value = parse_manifest_text(text).unwrap();
    assert_eq!(value["spec"]["ports"][0]["port"], 80);

    let target = UpdateTarget::new(ResourceKind::Service, Some("shop"), "web").unwrap();
    assert!(normalize_for_update(value, &target).is_ok());
}

#[test]
fn test_parse_rejects_scalars_and_garbage() {
    assert!(matches!(
        parse_manifest_text("just a string"),
        Err(ValidationError::InvalidStructure { .. })
    ));
    assert!(matches!(
        parse_manifest_text("kind: [unclosed"),
        Err(ValidationError::Parse(_))
    ));
}

#[test]
fn test_resolve_manifest_input_envelopes() {
    let text = "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: shop\n";

    let from_string = resolve_manifest_input(json!(text)).unwrap();
    assert_eq!(from_string["kind"], "Namespace");

    let from_envelope = resolve_manifest_input(json!({ "manifest": text })).unwrap();
    assert_eq!(from_envelope, from_string);

    let structured = json!({"apiVersion": "v1", "kind": "Namespace", "metadata": {"name": "shop"}});
    assert_eq!(resolve_manifest_input(structured.clone()).unwrap(), structured);
}
