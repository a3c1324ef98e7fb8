//! Cluster selection commands: `clusters`, `use` and `which`.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::config::ConfigStore;
use crate::error::CliError;
use crate::output::{Message, OutputFormat, Table, TableDisplay};

/// Handler for the cluster selection commands.
pub struct ClusterCommand<'a> {
    store: &'a mut ConfigStore,
}

impl<'a> ClusterCommand<'a> {
    /// Creates a new handler over a loaded configuration.
    #[must_use]
    pub fn new(store: &'a mut ConfigStore) -> Self {
        Self { store }
    }

    /// List the configured clusters.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn list<W: Write>(&self, out: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let config = self.store.config();
        let selected = config.selected_cluster.as_deref();
        let clusters = config
            .clusters
            .iter()
            .map(|(key, cluster)| ClusterSummary {
                name: key.clone(),
                display_name: cluster.name.clone(),
                nodes: cluster.nodes.len(),
                selected: selected == Some(key.as_str()),
            })
            .collect();

        format.write(out, &ClusterList { clusters })
    }

    /// Select a cluster and persist the choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster is unknown or the file cannot be written.
    pub fn select<W: Write>(
        &mut self,
        out: &mut W,
        format: &OutputFormat,
        name: &str,
    ) -> Result<(), CliError> {
        self.store.select(name)?;
        let msg = Message::success(format!(
            "Switched to cluster '{name}' ({})",
            self.store.path().display()
        ));
        format.write(out, &msg)
    }

    /// Show the active cluster.
    ///
    /// `requested` is the per-invocation override, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the active cluster is not configured.
    pub fn which<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        requested: Option<&str>,
    ) -> Result<(), CliError> {
        let config = self.store.config();
        match config.active_cluster(requested) {
            Ok((name, cluster)) => {
                let current = CurrentCluster {
                    name: name.to_string(),
                    display_name: cluster.name.clone(),
                    overridden: requested.is_some(),
                    nodes: cluster.nodes.clone(),
                };
                format.write(out, &current)
            }
            Err(CliError::NoClusterSelected) => {
                let hint = "No cluster selected. Use `clusterctl use <cluster>` to select one.";
                format.write(out, &Message::info(hint))
            }
            Err(e) => Err(e),
        }
    }
}

// Output types

/// Configured clusters.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterList {
    /// Clusters, sorted by key.
    pub clusters: Vec<ClusterSummary>,
}

/// One configured cluster.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    /// Key used to select the cluster.
    pub name: String,
    /// Display name from the configuration.
    pub display_name: String,
    /// Number of nodes.
    pub nodes: usize,
    /// Whether this is the selected cluster.
    pub selected: bool,
}

impl TableDisplay for ClusterList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.clusters.is_empty() {
            writeln!(writer, "No clusters configured")?;
            return Ok(());
        }

        let mut table = Table::new(["", "NAME", "DISPLAY NAME", "NODES"]);
        for cluster in &self.clusters {
            table.row([
                if cluster.selected { "*" } else { "" }.to_string(),
                cluster.name.clone(),
                cluster.display_name.clone(),
                cluster.nodes.to_string(),
            ]);
        }
        table.write(writer)
    }
}

/// The active cluster.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentCluster {
    /// Key of the cluster.
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Whether `--cluster` overrode the stored selection.
    pub overridden: bool,
    /// Node name to address.
    pub nodes: BTreeMap<String, String>,
}

impl TableDisplay for CurrentCluster {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        write!(writer, "Current cluster: {}", self.name)?;
        if !self.display_name.is_empty() && self.display_name != self.name {
            write!(writer, " ({})", self.display_name)?;
        }
        if self.overridden {
            write!(writer, " [--cluster]")?;
        }
        writeln!(writer)?;
        writeln!(writer, "Nodes:")?;
        for (node, address) in &self.nodes {
            writeln!(writer, "  {node}: {address}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{json, table, text};
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "
clusters:
  prod:
    name: production
    nodes:
      node1: 10.0.0.1:8080
      node2: 10.0.0.2:8080
  dev:
    nodes:
      local: localhost:8080
selected_cluster: prod
";

    fn store() -> (NamedTempFile, ConfigStore) {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write");
        let store = ConfigStore::open(file.path()).expect("open");
        (file, store)
    }

    #[test]
    fn list_marks_selected_cluster() {
        let (_file, mut store) = store();
        let mut out = Vec::new();
        ClusterCommand::new(&mut store).list(&mut out, &table()).expect("list");

        let text = text(out);
        let prod = text.lines().find(|l| l.contains("prod")).expect("prod row");
        assert!(prod.starts_with('*'));
        let dev = text.lines().find(|l| l.contains("dev")).expect("dev row");
        assert!(!dev.starts_with('*'));
    }

    #[test]
    fn list_as_json() {
        let (_file, mut store) = store();
        let mut out = Vec::new();
        ClusterCommand::new(&mut store).list(&mut out, &json()).expect("list");

        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value["clusters"][1]["name"], "prod");
        assert_eq!(value["clusters"][1]["selected"], true);
        assert_eq!(value["clusters"][1]["nodes"], 2);
    }

    #[test]
    fn select_persists_and_which_reports_it() {
        let (file, mut store) = store();
        let mut out = Vec::new();
        ClusterCommand::new(&mut store)
            .select(&mut out, &table(), "dev")
            .expect("select");
        assert!(text(out).contains("Switched to cluster 'dev'"));

        let mut reloaded = ConfigStore::open(file.path()).expect("reopen");
        let mut out = Vec::new();
        ClusterCommand::new(&mut reloaded)
            .which(&mut out, &table(), None)
            .expect("which");
        let text = text(out);
        assert!(text.starts_with("Current cluster: dev\n"));
        assert!(text.contains("local: localhost:8080"));
    }

    #[test]
    fn select_unknown_cluster_fails() {
        let (_file, mut store) = store();
        let err = ClusterCommand::new(&mut store)
            .select(&mut Vec::new(), &table(), "stage")
            .expect_err("unknown");
        assert!(matches!(err, CliError::UnknownCluster { .. }));
    }

    #[test]
    fn which_honours_override() {
        let (_file, mut store) = store();
        let mut out = Vec::new();
        ClusterCommand::new(&mut store)
            .which(&mut out, &table(), Some("dev"))
            .expect("which");
        assert!(text(out).contains("[--cluster]"));
    }

    #[test]
    fn which_without_selection_prints_hint() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"clusters: {}\n").expect("write");
        let mut store = ConfigStore::open(file.path()).expect("open");

        let mut out = Vec::new();
        ClusterCommand::new(&mut store)
            .which(&mut out, &table(), None)
            .expect("which");
        assert!(text(out).starts_with("No cluster selected."));
    }
}
