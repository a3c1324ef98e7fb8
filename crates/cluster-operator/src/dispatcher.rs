//! Operation dispatch.
//!
//! Triggering an operation is a four step affair: fetch the operator schema,
//! pick the operation, validate every argument namespace locally, then submit
//! a single `POST` to the node that served the schema. Validation failures
//! abort before the trigger request is sent.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::api::OperatorPayload;
use crate::error::OperatorError;
use crate::fetcher::{FetchedSchema, SchemaFetcher};
use crate::remote::RemoteClient;
use crate::schema::{OperationSchema, ParameterMap, required_parameters};
use crate::transport::Transport;
use crate::validate::{RawArguments, ValidatedArguments, validate};

/// The argument namespaces of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentNamespace {
    /// Operation parameters.
    Params,
    /// Operator configuration.
    Config,
    /// Namespace arguments.
    Namespace,
}

impl fmt::Display for ArgumentNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Params => "parameter",
            Self::Config => "config",
            Self::Namespace => "namespace",
        })
    }
}

/// Everything needed to trigger one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerRequest {
    /// Operator name.
    pub operator: String,
    /// Operation name.
    pub operation: String,
    /// Raw operation parameters.
    pub params: RawArguments,
    /// Raw operator configuration.
    pub config: RawArguments,
    /// Raw namespace arguments.
    pub namespace: RawArguments,
    /// Run on the targets in parallel.
    pub parallel: bool,
    /// Target nodes; empty lets the cluster choose.
    pub target_nodes: Vec<String>,
}

impl TriggerRequest {
    /// Create a request with no arguments.
    #[must_use]
    pub fn new(operator: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            operation: operation.into(),
            ..Self::default()
        }
    }

    /// Add an operation parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Add a configuration value.
    #[must_use]
    pub fn config(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(name.into(), value.into());
        self
    }

    /// Add a namespace argument.
    #[must_use]
    pub fn namespace(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.namespace.insert(name.into(), value.into());
        self
    }

    /// Request parallel execution.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Add a target node.
    #[must_use]
    pub fn target(mut self, node: impl Into<String>) -> Self {
        self.target_nodes.push(node.into());
        self
    }
}

/// Outcome of a successful trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerResult {
    /// Operator name.
    pub operator: String,
    /// Operation name.
    pub operation: String,
    /// Node the request was submitted to.
    pub node: String,
    /// Handle for later status queries, when the cluster returned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// Validates and submits operator operations.
#[derive(Debug)]
pub struct Dispatcher<'a, T> {
    client: &'a RemoteClient<T>,
}

impl<'a, T: Transport> Dispatcher<'a, T> {
    /// Create a dispatcher on top of `client`.
    #[must_use]
    pub const fn new(client: &'a RemoteClient<T>) -> Self {
        Self { client }
    }

    /// Trigger an operation.
    ///
    /// # Errors
    ///
    /// - schema fetch failures, surfaced unchanged
    /// - [`OperatorError::UnknownOperation`] listing every valid operation
    /// - [`OperatorError::InvalidArguments`] before anything is submitted
    /// - [`OperatorError::Transport`] if the chosen node cannot be reached
    /// - [`OperatorError::Rejected`] if the operator reports a failure
    pub async fn trigger(&self, request: &TriggerRequest) -> Result<TriggerResult, OperatorError> {
        let FetchedSchema { schema, node } =
            SchemaFetcher::new(self.client).fetch(&request.operator).await?;

        let operation = schema.operations.get(&request.operation).ok_or_else(|| {
            OperatorError::UnknownOperation {
                operator: request.operator.clone(),
                operation: request.operation.clone(),
                available: schema.operation_names(),
            }
        })?;

        let payload = build_payload(request, operation)?;
        let body =
            serde_json::to_value(&payload).map_err(|e| OperatorError::Encode(e.to_string()))?;

        info!(
            operator = %request.operator,
            operation = %request.operation,
            node = %node.name(),
            parallel = payload.parallel,
            targets = ?payload.target_nodes,
            "triggering operation"
        );

        let path = format!("operator/trigger/{}", request.operator);
        let response = self.client.post_json(&node, &path, &body).await?;

        if !response.success {
            return Err(OperatorError::Rejected {
                operator: request.operator.clone(),
                message: response.error_message(),
            });
        }

        let job_id = response.job_id();
        info!(operator = %request.operator, job_id = ?job_id, "operation triggered");
        Ok(TriggerResult {
            operator: request.operator.clone(),
            operation: request.operation.clone(),
            node: node.name().to_string(),
            job_id,
        })
    }
}

/// Validate every namespace of `request` against `operation` and assemble the
/// trigger payload.
///
/// # Errors
///
/// Returns [`OperatorError::InvalidArguments`] for the first namespace that
/// fails, checked in the order params, config, namespace.
pub fn build_payload(
    request: &TriggerRequest,
    operation: &OperationSchema,
) -> Result<OperatorPayload, OperatorError> {
    let params = validate_namespace(
        ArgumentNamespace::Params,
        &request.params,
        &operation.parameters,
    )?;
    let config = validate_namespace(ArgumentNamespace::Config, &request.config, &operation.config)?;
    let namespace: BTreeMap<String, String> = validate_namespace(
        ArgumentNamespace::Namespace,
        &request.namespace,
        &operation.namespace,
    )?
    .into_iter()
    .map(|(name, value)| (name, value.to_string()))
    .collect();

    Ok(OperatorPayload {
        operation: request.operation.clone(),
        params,
        config,
        namespace,
        parallel: request.parallel,
        target_nodes: request.target_nodes.clone(),
    })
}

fn validate_namespace(
    namespace: ArgumentNamespace,
    supplied: &RawArguments,
    schema: &ParameterMap,
) -> Result<ValidatedArguments, OperatorError> {
    validate(supplied, schema).map_err(|source| OperatorError::InvalidArguments {
        namespace,
        source,
        required: required_parameters(schema),
    })
}
