//! Membership commands: `nodes` and `leader`.

use std::io::Write;

use chrono::{DateTime, Utc};
use cluster_operator::{LeaderRecord, NodeRecord, RemoteClient, Transport};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{OutputFormat, Table, TableDisplay};

/// Handler for the membership commands.
pub struct NodesCommand<'a, T> {
    client: &'a RemoteClient<T>,
}

impl<'a, T: Transport> NodesCommand<'a, T> {
    /// Creates a new handler.
    #[must_use]
    pub const fn new(client: &'a RemoteClient<T>) -> Self {
        Self { client }
    }

    /// List cluster members. Malformed rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if no node answered or the list is malformed.
    pub async fn list<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
    ) -> Result<(), CliError> {
        let nodes: Vec<NodeRecord> = self.client.get_json("nodes").await?.into_rows()?;
        let list = NodeList {
            nodes,
            now: Utc::now(),
        };
        format.write(out, &list)
    }

    /// Show the current leader.
    ///
    /// # Errors
    ///
    /// Returns an error if no node answered or there is no leader.
    pub async fn leader<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
    ) -> Result<(), CliError> {
        let leader: LeaderRecord = self.client.get_json("leader").await?.into_data()?;
        format.write(out, &Leader(leader))
    }
}

// Output types

/// Cluster members.
#[derive(Debug, Clone, Serialize)]
pub struct NodeList {
    /// Members as reported by the cluster.
    pub nodes: Vec<NodeRecord>,
    #[serde(skip)]
    now: DateTime<Utc>,
}

impl TableDisplay for NodeList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.nodes.is_empty() {
            writeln!(writer, "No nodes in cluster")?;
            return Ok(());
        }

        let mut table = Table::new(["ID", "ADDRESS", "LAST SEEN", "STATE"]);
        for node in &self.nodes {
            table.row([
                node.id.clone(),
                node.address.clone(),
                last_seen(&node.last_seen, self.now),
                node.state.clone(),
            ]);
        }
        table.write(writer)?;
        writeln!(writer)?;
        writeln!(writer, "Total: {} node(s)", self.nodes.len())?;
        Ok(())
    }
}

/// The current leader.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Leader(pub LeaderRecord);

impl TableDisplay for Leader {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Leader:  {}", self.0.id)?;
        writeln!(writer, "Address: {}", self.0.address)?;
        Ok(())
    }
}

/// Render an RFC 3339 timestamp with its age. Anything else is shown as sent.
fn last_seen(raw: &str, now: DateTime<Utc>) -> String {
    let Ok(seen) = DateTime::parse_from_rfc3339(raw) else {
        return raw.to_string();
    };
    let seen = seen.with_timezone(&Utc);
    let stamp = seen.format("%Y-%m-%d %H:%M:%S");
    let secs = (now - seen).num_seconds();
    if secs < 0 {
        return stamp.to_string();
    }
    let age = match secs {
        0..60 => format!("{secs}s"),
        60..3600 => format!("{}m", secs / 60),
        3600..86_400 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    };
    format!("{stamp} ({age} ago)")
}
