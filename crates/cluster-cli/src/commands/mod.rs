//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`cluster`] - Configured clusters and the selection
//! - [`health`] - Per-node health probe
//! - [`nodes`] - Membership and leader
//! - [`operator`] - Operator discovery and invocation
//! - [`logs`] - Node logs
//! - [`metrics`] - Cluster metrics
//! - [`remote_config`] - Cluster configuration

pub mod cluster;
pub mod health;
pub mod logs;
pub mod metrics;
pub mod nodes;
pub mod operator;
pub mod remote_config;

pub use cluster::ClusterCommand;
pub use health::HealthCommand;
pub use logs::LogsCommand;
pub use metrics::MetricsCommand;
pub use nodes::NodesCommand;
pub use operator::OperatorCommand;
pub use remote_config::RemoteConfigCommand;

use cluster_operator::RemoteClient;
use tracing::debug;

use crate::config::Config;
use crate::error::CliError;

/// Build a client for the active cluster.
///
/// `requested` overrides the selected cluster.
///
/// # Errors
///
/// Returns an error if no cluster can be resolved or the HTTP client cannot be
/// built.
pub fn connect(config: &Config, requested: Option<&str>) -> Result<RemoteClient, CliError> {
    let (name, cluster) = config.active_cluster(requested)?;
    let endpoints = cluster.endpoints();
    debug!(cluster = name, nodes = endpoints.len(), "connecting to cluster");
    Ok(RemoteClient::http(endpoints, config.remote_settings())?)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by command tests.

    use std::time::Duration;

    use cluster_operator::{Endpoint, NodeEndpoints, RemoteClient, RemoteSettings};
    use wiremock::MockServer;

    use crate::cli::Format;
    use crate::output::OutputFormat;

    pub fn client(servers: &[&MockServer]) -> RemoteClient {
        let endpoints = NodeEndpoints::new(
            servers
                .iter()
                .enumerate()
                .map(|(i, s)| Endpoint::new(format!("node{}", i + 1), s.uri()))
                .collect(),
        );
        let settings = RemoteSettings {
            timeout: Duration::from_secs(2),
            retries: 0,
        };
        RemoteClient::http(endpoints, settings).expect("client")
    }

    pub fn table() -> OutputFormat {
        OutputFormat::new(Format::Table)
    }

    pub fn json() -> OutputFormat {
        OutputFormat::new(Format::Json)
    }

    pub fn text(buf: Vec<u8>) -> String {
        String::from_utf8(buf).expect("utf8")
    }
}
