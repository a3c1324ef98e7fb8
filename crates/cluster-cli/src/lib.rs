//! # cluster-cli
//!
//! The `clusterctl` command-line interface.
//!
//! Provides commands for:
//! - Selecting one of several configured clusters
//! - Node health, membership and leader inspection
//! - Operator discovery and schema-validated operation triggers
//! - Logs, metrics and cluster configuration
//!
//! # Architecture
//!
//! Commands resolve the active cluster from the YAML configuration and talk
//! to its nodes through [`cluster_operator::RemoteClient`]. Reads fall back
//! across nodes; writes go to exactly one node.
//!
//! ```text
//! ┌────────────┐   HTTP/JSON (/api/...)   ┌──────────────┐
//! │ clusterctl │◄────────────────────────►│ cluster node │ x N
//! └────────────┘                          └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, ConfigCommands, Format, LogsArgs, OperatorCommands, TriggerArgs};
pub use config::{ClusterConfig, Config, ConfigStore};
pub use error::CliError;
pub use output::OutputFormat;
