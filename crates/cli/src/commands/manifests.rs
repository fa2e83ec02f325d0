//! Commands that write manifests through the panel

use anyhow::{Context, Result};
use panel_lib::ResourceKind;
use serde_json::Value;
use std::path::Path;

use crate::client::ApiClient;
use crate::commands::item_path;
use crate::output::{print_json, print_success, OutputFormat};

fn read_manifest(file: &Path) -> Result<String> {
    std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read manifest {}", file.display()))
}

fn object_name(object: &Value) -> &str {
    object
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
}

/// Create an object from a YAML or JSON manifest file
pub async fn create(
    client: &ApiClient,
    kind: ResourceKind,
    file: &Path,
    format: OutputFormat,
) -> Result<()> {
    let manifest = read_manifest(file)?;
    let created = client
        .post_manifest(&format!("kube/{}", kind.plural()), manifest)
        .await?;

    match format {
        OutputFormat::Json => print_json(&created),
        OutputFormat::Table => {
            print_success(&format!("{} {} created", kind, object_name(&created)));
            Ok(())
        }
    }
}

/// Replace an existing object with the manifest from a file
pub async fn apply(
    client: &ApiClient,
    kind: ResourceKind,
    namespace: &str,
    name: &str,
    file: &Path,
    format: OutputFormat,
) -> Result<()> {
    let manifest = read_manifest(file)?;
    let updated = client
        .put_manifest(&item_path(kind, namespace, name), manifest)
        .await?;

    match format {
        OutputFormat::Json => print_json(&updated),
        OutputFormat::Table => {
            print_success(&format!("{} {} updated", kind, name));
            Ok(())
        }
    }
}

pub async fn delete(
    client: &ApiClient,
    kind: ResourceKind,
    namespace: &str,
    name: &str,
    format: OutputFormat,
) -> Result<()> {
    let status = client.delete(&item_path(kind, namespace, name)).await?;

    match format {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Table => {
            print_success(&format!("{} {} deleted", kind, name));
            Ok(())
        }
    }
}
