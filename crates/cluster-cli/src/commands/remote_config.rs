//! Cluster configuration commands: `config get` and `config set`.

use std::collections::BTreeMap;
use std::io::Write;

use cluster_operator::{RemoteClient, ResponseError, Transport, TransportError};
use serde_json::Value;
use tracing::info;

use crate::cli::ConfigCommands;
use crate::error::CliError;
use crate::output::{KeyValues, Message, OutputFormat};

/// Handler for the cluster configuration commands.
pub struct RemoteConfigCommand<'a, T> {
    client: &'a RemoteClient<T>,
}

impl<'a, T: Transport> RemoteConfigCommand<'a, T> {
    /// Creates a new handler.
    #[must_use]
    pub const fn new(client: &'a RemoteClient<T>) -> Self {
        Self { client }
    }

    /// Execute a config subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the cluster rejects it.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &ConfigCommands,
    ) -> Result<(), CliError> {
        match command {
            ConfigCommands::Get => {
                let values: BTreeMap<String, Value> =
                    self.client.get_json("config").await?.into_data()?;
                format.write(out, &KeyValues(values))
            }
            ConfigCommands::Set { values } => {
                let count = self.set(values).await?;
                format.write(
                    out,
                    &Message::success(format!("Updated {count} configuration value(s)")),
                )
            }
        }
    }

    /// Send `values` to the first configured node. Not retried.
    ///
    /// Returns the number of distinct keys sent.
    async fn set(&self, values: &[(String, String)]) -> Result<usize, CliError> {
        let node = self
            .client
            .endpoints()
            .primary()
            .ok_or(TransportError::NoNodes)?;
        let body: BTreeMap<&str, &str> = values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let payload =
            serde_json::to_value(&body).map_err(|e| CliError::Format(e.to_string()))?;

        let response = self.client.post_json(node, "config/set", &payload).await?;
        if !response.success {
            return Err(ResponseError::Failed(response.error_message()).into());
        }
        info!(node = %node.name(), keys = body.len(), "updated cluster configuration");
        Ok(body.len())
    }
}
