//! Logs command implementation.
//!
//! Fetches the most recent log lines of one node. `--follow` is forwarded to
//! the cluster, but only the returned snapshot is printed.

use std::io::Write;

use cluster_operator::{RemoteClient, Transport};
use serde::Serialize;
use tracing::warn;

use crate::cli::LogsArgs;
use crate::error::CliError;
use crate::output::{OutputFormat, TableDisplay};

/// Handler for the logs command.
pub struct LogsCommand<'a, T> {
    client: &'a RemoteClient<T>,
}

impl<'a, T: Transport> LogsCommand<'a, T> {
    /// Creates a new logs command handler.
    #[must_use]
    pub const fn new(client: &'a RemoteClient<T>) -> Self {
        Self { client }
    }

    /// Executes the logs command.
    ///
    /// # Errors
    ///
    /// Returns error if the node id is invalid or no node answered.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &LogsArgs,
    ) -> Result<(), CliError> {
        let path = logs_path(args)?;
        let lines: Vec<String> = self.client.get_json(&path).await?.into_data()?;

        if args.follow {
            warn!("live log streaming is not supported, showing the latest lines only");
        }

        let logs = LogsOutput {
            node: args.node_id.clone(),
            lines,
        };
        format.write(out, &logs)
    }
}

fn logs_path(args: &LogsArgs) -> Result<String, CliError> {
    let id = args.node_id.trim();
    if id.is_empty() {
        return Err(CliError::InvalidArgument("node id cannot be empty".into()));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
    {
        return Err(CliError::InvalidArgument(format!(
            "node id '{id}' may only contain letters, digits, '-', '_', '.' and ':'"
        )));
    }

    let mut path = format!("logs/{id}?lines={}", args.lines);
    if args.follow {
        path.push_str("&follow=true");
    }
    Ok(path)
}

// Output types

/// Logs output.
#[derive(Debug, Clone, Serialize)]
pub struct LogsOutput {
    /// Node the lines came from.
    pub node: String,
    /// Log lines, oldest first.
    pub lines: Vec<String>,
}

impl TableDisplay for LogsOutput {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for line in &self.lines {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{client, json, table, text};
    use serde_json::json as body;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn args(node_id: &str, lines: u32, follow: bool) -> LogsArgs {
        LogsArgs {
            node_id: node_id.into(),
            lines,
            follow,
        }
    }

    #[test]
    fn path_includes_line_count_and_follow() {
        assert_eq!(logs_path(&args("node-1", 100, false)).expect("path"), "logs/node-1?lines=100");
        assert_eq!(
            logs_path(&args("node-1", 5, true)).expect("path"),
            "logs/node-1?lines=5&follow=true"
        );
    }

    #[test]
    fn path_rejects_unsafe_ids() {
        assert!(logs_path(&args("", 10, false)).is_err());
        assert!(logs_path(&args("../secrets", 10, false)).is_err());
        assert!(logs_path(&args("a?b", 10, false)).is_err());
    }

    #[tokio::test]
    async fn prints_lines_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/logs/node-1"))
            .and(query_param("lines", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body!({
                "success": true,
                "data": ["starting", "ready"]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client(&[&server]);

        let mut out = Vec::new();
        LogsCommand::new(&client)
            .execute(&mut out, &table(), &args("node-1", 2, false))
            .await
            .expect("logs");
        assert_eq!(text(out), "starting\nready\n");
    }

    #[tokio::test]
    async fn follow_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/logs/node-1"))
            .and(query_param("follow", "true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(body!({"success": true, "data": ["x"]})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = client(&[&server]);

        let mut out = Vec::new();
        LogsCommand::new(&client)
            .execute(&mut out, &json(), &args("node-1", 100, true))
            .await
            .expect("logs");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value, body!({"node": "node-1", "lines": ["x"]}));
    }

    #[tokio::test]
    async fn unknown_node_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/logs/ghost"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(body!({"success": false, "error": "node ghost not found"})),
            )
            .mount(&server)
            .await;
        let client = client(&[&server]);

        let err = LogsCommand::new(&client)
            .execute(&mut Vec::new(), &table(), &args("ghost", 10, false))
            .await
            .expect_err("missing node");
        assert!(err.to_string().contains("node ghost not found"));
    }
}
