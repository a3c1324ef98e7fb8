//! Operator schema discovery.

use tracing::{debug, warn};

use crate::api::OperatorSummary;
use crate::endpoint::Endpoint;
use crate::error::OperatorError;
use crate::remote::RemoteClient;
use crate::schema::OperatorSchema;
use crate::transport::Transport;

/// A schema together with the node that served it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSchema {
    /// The decoded schema.
    pub schema: OperatorSchema,
    /// The node that answered.
    pub node: Endpoint,
}

/// Retrieves operator metadata from the cluster.
///
/// Schemas are fetched fresh on every call; nothing is cached.
#[derive(Debug)]
pub struct SchemaFetcher<'a, T> {
    client: &'a RemoteClient<T>,
}

impl<'a, T: Transport> SchemaFetcher<'a, T> {
    /// Create a fetcher on top of `client`.
    #[must_use]
    pub const fn new(client: &'a RemoteClient<T>) -> Self {
        Self { client }
    }

    /// Fetch and decode the schema of `operator`.
    ///
    /// # Errors
    ///
    /// - [`OperatorError::InvalidName`] if `operator` is not a plain path segment
    /// - [`OperatorError::UnknownOperator`] if the server does not know it
    /// - [`OperatorError::Transport`] if no node answered
    /// - [`OperatorError::Decode`] if the schema is malformed
    pub async fn fetch(&self, operator: &str) -> Result<FetchedSchema, OperatorError> {
        check_operator_name(operator)?;
        let path = format!("operator/schema/{operator}");
        let (node, response) = self.client.get_json_routed(&path).await?;

        if !response.success {
            let message = response.error_message();
            debug!(operator, %message, "operator schema not available");
            let available = self.available_operators().await;
            return Err(OperatorError::UnknownOperator {
                operator: operator.to_string(),
                message,
                available,
            });
        }

        let mut schema: OperatorSchema =
            serde_json::from_value(response.data).map_err(|e| OperatorError::Decode {
                what: format!("schema of operator '{operator}'"),
                message: e.to_string(),
            })?;
        if schema.name.is_empty() {
            schema.name = operator.to_string();
        }

        debug!(
            operator,
            version = %schema.version,
            operations = schema.operations.len(),
            node = %node.name(),
            "fetched operator schema"
        );
        Ok(FetchedSchema { schema, node })
    }

    /// List the operators installed on the cluster.
    ///
    /// Malformed rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if no node answered or the list is malformed.
    pub async fn list_operators(&self) -> Result<Vec<OperatorSummary>, OperatorError> {
        let response = self.client.get_json("operator/list").await?;
        Ok(response.into_rows()?)
    }

    async fn available_operators(&self) -> Vec<String> {
        match self.list_operators().await {
            Ok(operators) => operators.into_iter().map(|op| op.name).collect(),
            Err(e) => {
                warn!(error = %e, "could not list operators");
                Vec::new()
            }
        }
    }
}

/// Operator names end up in URL paths; `.` and `..` would be normalised away.
fn check_operator_name(name: &str) -> Result<(), OperatorError> {
    let plain = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if name.is_empty() || !plain || name.chars().all(|c| c == '.') {
        return Err(OperatorError::InvalidName(name.to_string()));
    }
    Ok(())
}
