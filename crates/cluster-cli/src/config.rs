//! Cluster configuration.
//!
//! The configuration is a YAML file listing the known clusters, each with its
//! node addresses, plus the currently selected cluster and network settings:
//!
//! ```yaml
//! clusters:
//!   prod:
//!     name: prod
//!     port: 8080
//!     nodes:
//!       node1: 10.0.0.1:8080
//!       node2: 10.0.0.2
//! selected_cluster: prod
//! timeout: 10
//! retries: 0
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cluster_operator::{NodeEndpoints, RemoteSettings};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliError;

/// File name searched for in the working and home directories.
pub const CONFIG_FILE_NAME: &str = ".clusterctl.yaml";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// One configured cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Port appended to node addresses that carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Node name to address. Iteration order is the read order.
    #[serde(default)]
    pub nodes: BTreeMap<String, String>,
}

impl ClusterConfig {
    /// Endpoints of this cluster's nodes, in read order.
    #[must_use]
    pub fn endpoints(&self) -> NodeEndpoints {
        NodeEndpoints::from_nodes(
            self.nodes.iter().map(|(name, addr)| (name.as_str(), addr.as_str())),
            self.port,
        )
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Known clusters by key.
    #[serde(default)]
    pub clusters: BTreeMap<String, ClusterConfig>,
    /// Key of the selected cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_cluster: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Extra read sweeps over the node list.
    #[serde(default)]
    pub retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clusters: BTreeMap::new(),
            selected_cluster: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            retries: 0,
        }
    }
}

impl Config {
    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or fails validation.
    pub fn from_yaml(content: &str) -> Result<Self, CliError> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| CliError::Config(format!("invalid YAML: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, CliError> {
        serde_yaml::to_string(self)
            .map_err(|e| CliError::Config(format!("failed to encode YAML: {e}")))
    }

    /// Validate the configuration.
    ///
    /// The selected cluster is checked later, when it is resolved, so that a
    /// stale selection can still be replaced with `use`.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.timeout == 0 {
            return Err(CliError::Config("timeout must be greater than 0".to_string()));
        }

        if let Some((key, _)) = self.clusters.iter().find(|(_, c)| c.nodes.is_empty()) {
            return Err(CliError::Config(format!("cluster '{key}' has no nodes")));
        }

        Ok(())
    }

    /// Configured cluster keys, sorted.
    #[must_use]
    pub fn cluster_names(&self) -> Vec<String> {
        self.clusters.keys().cloned().collect()
    }

    /// Look a cluster up by key.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnknownCluster`] listing the configured clusters.
    pub fn cluster(&self, name: &str) -> Result<&ClusterConfig, CliError> {
        self.clusters.get(name).ok_or_else(|| CliError::UnknownCluster {
            name: name.to_string(),
            available: self.cluster_names(),
        })
    }

    /// Resolve the cluster to talk to: `requested` if given, otherwise the
    /// selected cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected or the cluster is unknown.
    pub fn active_cluster<'a>(
        &'a self,
        requested: Option<&'a str>,
    ) -> Result<(&'a str, &'a ClusterConfig), CliError> {
        let name = requested
            .or(self.selected_cluster.as_deref())
            .ok_or(CliError::NoClusterSelected)?;
        Ok((name, self.cluster(name)?))
    }

    /// Network settings for the remote client.
    #[must_use]
    pub const fn remote_settings(&self) -> RemoteSettings {
        RemoteSettings {
            timeout: Duration::from_secs(self.timeout),
            retries: self.retries,
        }
    }
}

/// A configuration together with the file it was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// Locate and load the configuration.
    ///
    /// `explicit` wins when given. Otherwise `./.clusterctl.yaml` and then
    /// `$HOME/.clusterctl.yaml` are tried.
    ///
    /// # Errors
    ///
    /// Returns an error if no file is found or the file is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let candidates = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => default_locations(),
        };
        let found = candidates.iter().find(|p| p.is_file()).cloned();
        let path = found.ok_or(CliError::ConfigNotFound { searched: candidates })?;
        Self::open(path)
    }

    /// Load the configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CliError> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|e| {
            CliError::Config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        let config = Config::from_yaml(&content)?;
        debug!(path = %path.display(), clusters = config.clusters.len(), "loaded configuration");
        Ok(Self { path, config })
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The file the configuration was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Select `name` and persist the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster is unknown or the file cannot be written.
    pub fn select(&mut self, name: &str) -> Result<(), CliError> {
        self.config.cluster(name)?;
        self.config.selected_cluster = Some(name.to_string());
        self.save()
    }

    /// Write the configuration back to its file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.config.to_yaml()?)?;
        debug!(path = %self.path.display(), "saved configuration");
        Ok(())
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".").join(CONFIG_FILE_NAME)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(CONFIG_FILE_NAME));
    }
    paths
}
