//! Metrics command implementation.

use std::collections::BTreeMap;
use std::io::Write;

use cluster_operator::{RemoteClient, Transport};
use serde_json::Value;

use crate::error::CliError;
use crate::output::{KeyValues, OutputFormat};

/// Handler for the metrics command.
pub struct MetricsCommand<'a, T> {
    client: &'a RemoteClient<T>,
}

impl<'a, T: Transport> MetricsCommand<'a, T> {
    /// Creates a new metrics command handler.
    #[must_use]
    pub const fn new(client: &'a RemoteClient<T>) -> Self {
        Self { client }
    }

    /// Executes the metrics command.
    ///
    /// # Errors
    ///
    /// Returns error if no node answered or the metrics are not a mapping.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
    ) -> Result<(), CliError> {
        let metrics: BTreeMap<String, Value> = self.client.get_json("metrics").await?.into_data()?;
        format.write(out, &KeyValues(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{client, json, table, text};
    use serde_json::json as body;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server(data: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(body!({"success": true, "data": data})),
            )
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn renders_metrics_table() {
        let server = server(body!({"goroutines": 42, "leader": "node-1"})).await;
        let client = client(&[&server]);

        let mut out = Vec::new();
        MetricsCommand::new(&client).execute(&mut out, &table()).await.expect("metrics");
        let text = text(out);
        assert!(text.contains("goroutines  42"));
        assert!(text.contains("leader      node-1"));
    }

    #[tokio::test]
    async fn json_passes_values_through() {
        let server = server(body!({"requests": {"total": 10}})).await;
        let client = client(&[&server]);

        let mut out = Vec::new();
        MetricsCommand::new(&client).execute(&mut out, &json()).await.expect("metrics");
        let value: Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value, body!({"requests": {"total": 10}}));
    }

    #[tokio::test]
    async fn non_mapping_is_rejected() {
        let server = server(body!([1, 2, 3])).await;
        let client = client(&[&server]);

        let err = MetricsCommand::new(&client)
            .execute(&mut Vec::new(), &table())
            .await
            .expect_err("not a mapping");
        assert!(matches!(err, CliError::Response(_)));
    }
}
