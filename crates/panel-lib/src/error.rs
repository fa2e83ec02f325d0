//! Error types shared by the gateway, the normalizer and the dashboard

use serde_json::Value;
use thiserror::Error;

/// Failure of a single panel operation
#[derive(Debug, Error)]
pub enum PanelError {
    /// The Kubernetes API could not be reached (network, TLS, timeout)
    #[error("failed to connect to Kubernetes API: {0}")]
    Transport(String),

    /// The Kubernetes API answered with a non-2xx status
    #[error("Kubernetes API responded with status {status}")]
    Upstream { status: u16, body: Value },

    /// A caller-supplied manifest failed structural or identity checks
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A 2xx response did not have the expected shape
    #[error("unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    /// Gateway could not be built from the supplied configuration
    #[error("invalid gateway configuration: {0}")]
    Config(String),
}

impl PanelError {
    /// Short machine-friendly label, used for metrics and the `error` field of responses
    pub fn kind(&self) -> &'static str {
        match self {
            PanelError::Transport(_) => "transport",
            PanelError::Upstream { .. } => "upstream",
            PanelError::Validation(_) => "validation",
            PanelError::Decode { .. } => "decode",
            PanelError::Config(_) => "config",
        }
    }
}

/// Rejection of a manifest before it is sent to the API server
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("manifest is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("`{field}` is `{actual}` but `{expected}` was expected")]
    Mismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("`{path}` {message}")]
    InvalidStructure { path: String, message: String },

    #[error("manifest could not be parsed: {0}")]
    Parse(String),
}

impl ValidationError {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidStructure {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = PanelError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages_name_the_field() {
        let err = ValidationError::Mismatch {
            field: "metadata.name",
            expected: "web".to_string(),
            actual: "api".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`metadata.name` is `api` but `web` was expected"
        );

        let err = ValidationError::MissingField("spec");
        assert!(err.to_string().contains("`spec`"));
    }

    #[test]
    fn test_panel_error_kind_labels() {
        assert_eq!(PanelError::Transport("x".into()).kind(), "transport");
        assert_eq!(
            PanelError::Upstream {
                status: 404,
                body: Value::Null
            }
            .kind(),
            "upstream"
        );
        assert_eq!(
            PanelError::from(ValidationError::MissingField("kind")).kind(),
            "validation"
        );
    }
}
