//! Panel configuration

use anyhow::{bail, Context, Result};
use panel_lib::gateway::KubeConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "kube-panel.toml";

/// Panel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    /// Port of the HTTP API
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Base URL of the Kubernetes API server
    #[serde(default = "default_kube_api_url")]
    pub kube_api_url: String,

    /// Bearer token for the API server
    #[serde(default)]
    pub kube_token: Option<String>,

    /// File holding the bearer token, e.g. a mounted service account token
    #[serde(default)]
    pub kube_token_file: Option<PathBuf>,

    /// Timeout of a single API server call in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Skip TLS certificate verification of the API server
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

fn default_listen_port() -> u16 {
    8080
}

fn default_kube_api_url() -> String {
    "https://kubernetes.default.svc".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_accept_invalid_certs() -> bool {
    true
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            kube_api_url: default_kube_api_url(),
            kube_token: None,
            kube_token_file: None,
            request_timeout_secs: default_request_timeout(),
            accept_invalid_certs: default_accept_invalid_certs(),
        }
    }
}

impl PanelConfig {
    /// Load configuration from the optional config file and `PANEL_*`
    /// environment variables; the environment wins
    pub fn load() -> Result<Self> {
        let file = std::env::var("PANEL_CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::from_sources(&file, config::Environment::with_prefix("PANEL").try_parsing(true))
    }

    fn from_sources(file: &Path, environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(file).required(false))
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read configuration from {}", file.display()))?;

        config
            .try_deserialize()
            .context("Invalid panel configuration")
    }

    /// Bearer token: the explicit token, else the token file, else `KUBE_TOKEN`
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.kube_token.as_deref().map(str::trim) {
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }

        if let Some(path) = &self.kube_token_file {
            let token = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read token file {}", path.display()))?;
            return Ok(token.trim().to_string());
        }

        match std::env::var("KUBE_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => bail!(
                "No Kubernetes API token configured (set PANEL_KUBE_TOKEN, PANEL_KUBE_TOKEN_FILE or KUBE_TOKEN)"
            ),
        }
    }

    /// Connection settings handed to the gateway
    pub fn kube_config(&self) -> Result<KubeConfig> {
        let config = KubeConfig::new(&self.kube_api_url, self.resolve_token()?)?
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_accept_invalid_certs(self.accept_invalid_certs);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("PANEL")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config =
            PanelConfig::from_sources(Path::new("/nonexistent/kube-panel.toml"), env(&[])).unwrap();
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.kube_api_url, "https://kubernetes.default.svc");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.accept_invalid_certs);
        assert!(config.kube_token.is_none());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "listen_port = 9000\nkube_api_url = \"https://10.0.0.1:6443\"\naccept_invalid_certs = false"
        )
        .unwrap();

        let config = PanelConfig::from_sources(
            file.path(),
            env(&[("PANEL_LISTEN_PORT", "9100"), ("PANEL_REQUEST_TIMEOUT_SECS", "5")]),
        )
        .unwrap();

        assert_eq!(config.listen_port, 9100);
        assert_eq!(config.kube_api_url, "https://10.0.0.1:6443");
        assert_eq!(config.request_timeout_secs, 5);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_explicit_token_is_trimmed() {
        let config = PanelConfig {
            kube_token: Some("  abc123\n".to_string()),
            ..PanelConfig::default()
        };
        assert_eq!(config.resolve_token().unwrap(), "abc123");
    }

    #[test]
    fn test_token_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();

        let config = PanelConfig {
            kube_token_file: Some(file.path().to_path_buf()),
            ..PanelConfig::default()
        };
        assert_eq!(config.resolve_token().unwrap(), "from-file");

        let kube = config.kube_config().unwrap();
        assert_eq!(kube.token, "from-file");
        assert_eq!(kube.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_token_file_is_an_error() {
        let config = PanelConfig {
            kube_token_file: Some(PathBuf::from("/nonexistent/token")),
            ..PanelConfig::default()
        };
        assert!(config.resolve_token().is_err());
    }
}
