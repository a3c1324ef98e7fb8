//! CLI error types.

use std::path::PathBuf;

use cluster_operator::{
    ArgumentNamespace, ClientError, OperatorError, ResponseError, TransportError,
};
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// No configuration file exists at any searched location.
    #[error("no configuration file found (searched {})", join_paths(.searched))]
    ConfigNotFound {
        /// Every path that was tried, in order.
        searched: Vec<PathBuf>,
    },

    /// The requested cluster is not configured.
    #[error("cluster '{name}' not found in configuration")]
    UnknownCluster {
        /// Requested cluster.
        name: String,
        /// Configured clusters.
        available: Vec<String>,
    },

    /// No cluster is selected and none was given.
    #[error("no cluster selected")]
    NoClusterSelected,

    /// Operator schema or dispatch failure.
    #[error(transparent)]
    Operator(#[from] OperatorError),

    /// Remote client failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The response did not carry the expected data.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TransportError> for CliError {
    fn from(err: TransportError) -> Self {
        Self::Client(ClientError::Transport(err))
    }
}

impl CliError {
    /// Follow-up lines that help the user recover, printed after the error.
    #[must_use]
    pub fn hints(&self) -> Vec<String> {
        match self {
            Self::ConfigNotFound { .. } => vec![
                "create .clusterctl.yaml in the current or home directory, or pass --config-file"
                    .to_string(),
            ],
            Self::UnknownCluster { available, .. } => {
                list_hint("Available clusters", available)
            }
            Self::NoClusterSelected => {
                vec!["select one with `clusterctl use <cluster>` or pass --cluster".to_string()]
            }
            Self::Operator(OperatorError::UnknownOperator { available, .. }) => {
                list_hint("Available operators", available)
            }
            Self::Operator(OperatorError::UnknownOperation { available, .. }) => {
                list_hint("Available operations", available)
            }
            Self::Operator(OperatorError::InvalidArguments { namespace, required, .. }) => {
                if required.is_empty() {
                    return Vec::new();
                }
                let title = match namespace {
                    ArgumentNamespace::Params => "Required parameters:",
                    ArgumentNamespace::Config => "Required config values:",
                    ArgumentNamespace::Namespace => "Required namespace values:",
                };
                let mut lines = vec![title.to_string()];
                lines.extend(required.iter().map(|p| {
                    if p.description.is_empty() {
                        format!("  - {} ({})", p.name, p.param_type)
                    } else {
                        format!("  - {} ({}): {}", p.name, p.param_type, p.description)
                    }
                }));
                lines
            }
            _ => Vec::new(),
        }
    }
}

fn list_hint(title: &str, items: &[String]) -> Vec<String> {
    if items.is_empty() {
        return Vec::new();
    }
    vec![format!("{title}: {}", items.join(", "))]
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
