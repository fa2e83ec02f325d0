//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

/// Run the built binary with an isolated home directory
fn kpctl(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kpctl"))
        .args(args)
        .env("HOME", home)
        .env_remove("KPCTL_PANEL_URL")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let output = kpctl(home.path(), &["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Kube Panel"), "Should show app name");
    for command in ["get", "metrics", "show", "create", "apply", "delete"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = kpctl(home.path(), &["--version"]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("kpctl"), "Should show binary name");
}

#[test]
fn test_unknown_kind_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = kpctl(home.path(), &["get", "secrets"]);

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("unknown kind"), "Should explain the kind error");
}

#[test]
fn test_get_pods_as_json() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/kube/pods")
        .match_query(mockito::Matcher::UrlEncoded(
            "namespace".into(),
            "shop".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name":"web-0","namespace":"shop","status":"Running"}]"#)
        .create();

    let home = tempfile::tempdir().unwrap();
    let output = kpctl(
        home.path(),
        &[
            "--panel-url",
            &server.url(),
            "--format",
            "json",
            "get",
            "pods",
            "-n",
            "shop",
        ],
    );

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "get pods should succeed");
    assert!(stdout.contains("web-0"));
    mock.assert();
}

#[test]
fn test_panel_url_from_config_file() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("DELETE", "/kube/pods/shop/web-0")
        .with_status(200)
        .with_body(r#"{"kind":"Pod"}"#)
        .create();

    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join(".config").join("kpctl");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        format!(
            r#"{{"panel_url": "{}", "default_namespace": "shop", "default_format": "json"}}"#,
            server.url()
        ),
    )
    .unwrap();

    let output = kpctl(home.path(), &["delete", "pods", "web-0"]);

    assert!(output.status.success(), "delete should succeed");
    mock.assert();
}

#[test]
fn test_validation_error_is_reported() {
    let mut server = mockito::Server::new();
    server
        .mock("PUT", "/kube/namespaces/shop")
        .with_status(422)
        .with_body(r#"{"error":"validation","message":"manifest is missing required field `spec`"}"#)
        .create();

    let home = tempfile::tempdir().unwrap();
    let manifest = home.path().join("ns.yaml");
    std::fs::write(&manifest, "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: shop\n").unwrap();

    let output = kpctl(
        home.path(),
        &[
            "--panel-url",
            &server.url(),
            "apply",
            "namespaces",
            "shop",
            "-f",
            manifest.to_str().unwrap(),
        ],
    );

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("422"));
    assert!(stderr.contains("missing required field"));
}
