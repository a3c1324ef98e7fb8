//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// clusterctl - inspect a cluster and invoke its operators.
#[derive(Parser, Debug, Clone)]
#[command(name = "clusterctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to use instead of the default search path.
    #[arg(long, global = true, env = "CLUSTERCTL_CONFIG", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Cluster to talk to, overriding the selected one.
    #[arg(long, global = true, env = "CLUSTERCTL_CLUSTER", value_name = "NAME")]
    pub cluster: Option<String>,

    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List configured clusters.
    Clusters,

    /// Select the cluster later commands talk to.
    Use {
        /// Cluster name from the configuration.
        name: String,
    },

    /// Show the selected cluster.
    Which,

    /// Check the health of every configured node.
    Health,

    /// List cluster members.
    Nodes,

    /// Show the current leader.
    Leader,

    /// Operator discovery and invocation.
    Operator {
        /// Operator subcommand to execute.
        #[command(subcommand)]
        command: OperatorCommands,
    },

    /// Fetch recent log lines of a node.
    Logs(LogsArgs),

    /// Show cluster metrics.
    Metrics,

    /// Read or change cluster configuration.
    Config {
        /// Config subcommand to execute.
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Operator subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum OperatorCommands {
    /// List installed operators, or show one operator in detail.
    List {
        /// Operator to show instead of the list.
        name: Option<String>,
    },

    /// Show the operations and parameters of an operator.
    Show {
        /// Operator name.
        name: String,
    },

    /// Trigger an operator operation.
    Trigger(TriggerArgs),
}

/// Arguments for `operator trigger`.
#[derive(Args, Debug, Clone)]
pub struct TriggerArgs {
    /// Operator name.
    pub operator: String,

    /// Operation to run.
    pub operation: String,

    /// Operation parameters.
    #[arg(
        short = 'p',
        long = "param",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        value_delimiter = ','
    )]
    pub params: Vec<(String, String)>,

    /// Operator configuration values.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        value_delimiter = ','
    )]
    pub config: Vec<(String, String)>,

    /// Namespace arguments.
    #[arg(
        short = 'n',
        long = "namespace",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        value_delimiter = ','
    )]
    pub namespace: Vec<(String, String)>,

    /// Run on the target nodes in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Node to run on (repeatable or comma-separated).
    #[arg(short = 't', long = "target-node", value_name = "NODE", value_delimiter = ',')]
    pub target_nodes: Vec<String>,
}

/// Arguments for `logs`.
#[derive(Args, Debug, Clone)]
pub struct LogsArgs {
    /// Node to read logs from.
    pub node_id: String,

    /// Number of lines to fetch.
    #[arg(short, long, default_value_t = 100)]
    pub lines: u32,

    /// Ask the node to follow the log.
    #[arg(long)]
    pub follow: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the cluster configuration.
    Get,

    /// Change cluster configuration values.
    Set {
        /// Values to set.
        #[arg(required = true, value_name = "KEY=VALUE", value_parser = parse_key_value)]
        values: Vec<(String, String)>,
    },
}

/// Parse a `key=value` argument. The value may be empty and may contain `=`.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
