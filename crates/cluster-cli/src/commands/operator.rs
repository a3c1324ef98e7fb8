//! Operator command implementation.
//!
//! Provides subcommands for:
//! - Listing installed operators
//! - Showing an operator's operations and parameter schemas
//! - Triggering an operation

use std::io::Write;

use cluster_operator::{
    Dispatcher, OperatorSchema, OperatorSummary, ParameterMap, RemoteClient, SchemaFetcher,
    Transport, TriggerRequest, TriggerResult,
};
use serde::Serialize;

use crate::cli::{OperatorCommands, TriggerArgs};
use crate::error::CliError;
use crate::output::{OutputFormat, Table, TableDisplay, truncate};

/// Operator command executor.
pub struct OperatorCommand<'a, T> {
    client: &'a RemoteClient<T>,
}

impl<'a, T: Transport> OperatorCommand<'a, T> {
    /// Create a new operator command.
    #[must_use]
    pub const fn new(client: &'a RemoteClient<T>) -> Self {
        Self { client }
    }

    /// Execute an operator subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &OperatorCommands,
    ) -> Result<(), CliError> {
        match command {
            OperatorCommands::List { name: None } => {
                let operators = SchemaFetcher::new(self.client).list_operators().await?;
                format.write(writer, &OperatorList { operators })?;
            }
            OperatorCommands::List { name: Some(name) } | OperatorCommands::Show { name } => {
                let fetched = SchemaFetcher::new(self.client).fetch(name).await?;
                format.write(writer, &OperatorDetail(fetched.schema))?;
            }
            OperatorCommands::Trigger(args) => {
                let result = Dispatcher::new(self.client)
                    .trigger(&trigger_request(args))
                    .await?;
                format.write(writer, &Triggered(result))?;
            }
        }
        Ok(())
    }
}

/// Turn parsed arguments into a dispatcher request. Repeated keys keep the
/// last value.
#[must_use]
pub fn trigger_request(args: &TriggerArgs) -> TriggerRequest {
    TriggerRequest {
        operator: args.operator.clone(),
        operation: args.operation.clone(),
        params: args.params.iter().cloned().collect(),
        config: args.config.iter().cloned().collect(),
        namespace: args.namespace.iter().cloned().collect(),
        parallel: args.parallel,
        target_nodes: args.target_nodes.clone(),
    }
}

// Output types

/// Installed operators.
#[derive(Debug, Clone, Serialize)]
pub struct OperatorList {
    /// Operators as listed by the cluster.
    pub operators: Vec<OperatorSummary>,
}

impl TableDisplay for OperatorList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.operators.is_empty() {
            writeln!(writer, "No operators installed")?;
            return Ok(());
        }

        let mut table = Table::new(["NAME", "VERSION", "AUTHOR", "DESCRIPTION"]);
        for op in &self.operators {
            table.row([
                op.name.clone(),
                op.version.clone(),
                op.author.clone(),
                truncate(&op.description, 60),
            ]);
        }
        table.write(writer)
    }
}

/// Full schema of one operator.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct OperatorDetail(pub OperatorSchema);

impl TableDisplay for OperatorDetail {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let schema = &self.0;
        write!(writer, "Operator: {}", schema.name)?;
        if !schema.version.is_empty() {
            write!(writer, " (v{})", schema.version)?;
        }
        writeln!(writer)?;
        if !schema.description.is_empty() {
            writeln!(writer, "{}", schema.description)?;
        }

        if schema.operations.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "No operations")?;
            return Ok(());
        }

        for (name, operation) in &schema.operations {
            writeln!(writer)?;
            writeln!(writer, "Operation: {name}")?;
            if !operation.description.is_empty() {
                writeln!(writer, "  {}", operation.description)?;
            }
            write_parameters(writer, "Parameters", &operation.parameters)?;
            write_parameters(writer, "Config", &operation.config)?;
            write_parameters(writer, "Namespace", &operation.namespace)?;
        }
        Ok(())
    }
}

fn write_parameters<W: Write>(
    writer: &mut W,
    title: &str,
    parameters: &ParameterMap,
) -> Result<(), CliError> {
    if parameters.is_empty() {
        return Ok(());
    }
    writeln!(writer, "  {title}:")?;
    let mut table = Table::new(["NAME", "TYPE", "REQUIRED", "DEFAULT", "DESCRIPTION"]).indent(4);
    for (name, param) in parameters {
        table.row([
            name.clone(),
            param.param_type.to_string(),
            if param.required { "yes" } else { "no" }.to_string(),
            param.default.as_ref().map(ToString::to_string).unwrap_or_default(),
            param.description.clone(),
        ]);
    }
    table.write(writer)
}

/// A submitted operation.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Triggered(pub TriggerResult);

impl TableDisplay for Triggered {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let result = &self.0;
        writeln!(
            writer,
            "✓ Triggered {}/{} via {}",
            result.operator, result.operation, result.node
        )?;
        if let Some(job_id) = &result.job_id {
            writeln!(writer, "  Job ID: {job_id}")?;
        }
        Ok(())
    }
}
