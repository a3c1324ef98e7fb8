//! Health command implementation.
//!
//! Every configured node is probed individually, so a single unreachable
//! node shows up instead of being hidden by read fallback.

use std::io::Write;

use cluster_operator::{ClientError, RemoteClient, Transport};
use serde::Serialize;
use tracing::debug;

use crate::error::CliError;
use crate::output::{OutputFormat, Table, TableDisplay, truncate};

/// Handler for the health command.
pub struct HealthCommand<'a, T> {
    client: &'a RemoteClient<T>,
}

impl<'a, T: Transport> HealthCommand<'a, T> {
    /// Creates a new health command handler.
    #[must_use]
    pub const fn new(client: &'a RemoteClient<T>) -> Self {
        Self { client }
    }

    /// Executes the health command.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails. Unreachable nodes are reported, not
    /// returned as errors.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
    ) -> Result<(), CliError> {
        let report = self.probe().await;
        format.write(out, &report)
    }

    /// Probe every node once.
    pub async fn probe(&self) -> HealthReport {
        let mut nodes = Vec::with_capacity(self.client.endpoints().len());
        for endpoint in self.client.endpoints().read_order() {
            let (status, detail) = match self.client.get_json_from(endpoint, "health").await {
                Ok(response) if response.success => (HealthStatus::Healthy, None),
                Ok(response) => (HealthStatus::Unhealthy, Some(response.error_message())),
                Err(e @ ClientError::Decode { .. }) => {
                    (HealthStatus::Unhealthy, Some(e.to_string()))
                }
                Err(ClientError::Transport(e)) => (HealthStatus::Unreachable, Some(e.to_string())),
            };
            debug!(node = %endpoint.name(), ?status, "probed node health");
            nodes.push(NodeHealth {
                node: endpoint.name().to_string(),
                address: endpoint.address().to_string(),
                status,
                detail,
            });
        }
        HealthReport { nodes }
    }
}

// Output types

/// Health of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The node answered `success=true`.
    Healthy,
    /// The node answered but reported a failure.
    Unhealthy,
    /// The node could not be reached.
    Unreachable,
}

impl HealthStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Unreachable => "unreachable",
        }
    }
}

/// Probe result of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeHealth {
    /// Node name.
    pub node: String,
    /// Node address.
    pub address: String,
    /// Probe outcome.
    pub status: HealthStatus,
    /// Error detail, when not healthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Health of the whole cluster.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Per-node results, in configuration order.
    pub nodes: Vec<NodeHealth>,
}

impl HealthReport {
    /// Number of healthy nodes.
    #[must_use]
    pub fn healthy(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.status == HealthStatus::Healthy)
            .count()
    }
}

impl TableDisplay for HealthReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mut table = Table::new(["NODE", "ADDRESS", "STATUS", "DETAIL"]);
        for node in &self.nodes {
            table.row([
                node.node.clone(),
                node.address.clone(),
                node.status.as_str().to_string(),
                node.detail.as_deref().map(|d| truncate(d, 60)).unwrap_or_default(),
            ]);
        }
        table.write(writer)?;
        writeln!(writer)?;
        writeln!(writer, "{}/{} node(s) healthy", self.healthy(), self.nodes.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{client, json, table, text};
    use serde_json::json as body;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn node(reply: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(reply)
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn probes_every_node() {
        let healthy = node(
            ResponseTemplate::new(200).set_body_json(body!({"success": true, "data": "ok"})),
        )
        .await;
        let sick = node(
            ResponseTemplate::new(200)
                .set_body_json(body!({"success": false, "error": "disk full"})),
        )
        .await;
        let down = node(ResponseTemplate::new(502)).await;

        let client = client(&[&healthy, &sick, &down]);
        let report = HealthCommand::new(&client).probe().await;

        let statuses: Vec<_> = report.nodes.iter().map(|n| n.status).collect();
        assert_eq!(
            statuses,
            vec![HealthStatus::Healthy, HealthStatus::Unhealthy, HealthStatus::Unreachable]
        );
        assert_eq!(report.nodes[1].detail.as_deref(), Some("disk full"));
        assert_eq!(report.healthy(), 1);
    }

    #[tokio::test]
    async fn table_summarises_health() {
        let healthy =
            node(ResponseTemplate::new(200).set_body_json(body!({"success": true}))).await;
        let client = client(&[&healthy]);

        let mut out = Vec::new();
        HealthCommand::new(&client).execute(&mut out, &table()).await.expect("health");
        let text = text(out);
        assert!(text.contains("node1"));
        assert!(text.contains("healthy"));
        assert!(text.ends_with("1/1 node(s) healthy\n"));
    }

    #[tokio::test]
    async fn json_uses_lowercase_status() {
        let down = node(ResponseTemplate::new(503)).await;
        let client = client(&[&down]);

        let mut out = Vec::new();
        HealthCommand::new(&client).execute(&mut out, &json()).await.expect("health");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value["nodes"][0]["status"], "unreachable");
    }
}
