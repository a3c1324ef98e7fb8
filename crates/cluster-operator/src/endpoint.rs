//! Cluster node addressing.

use std::fmt;

/// A single cluster node reachable over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    name: String,
    address: String,
}

impl Endpoint {
    /// Create an endpoint for `address`.
    ///
    /// The address is either `host[:port]` or a full `http(s)://` base URL.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Node name from the configuration.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// URL of an API path on this node, e.g. `nodes` → `http://host/api/nodes`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let base = self.address.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{base}/api/{path}")
        } else {
            format!("http://{base}/api/{path}")
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Ordered list of cluster nodes.
///
/// Reads walk the list front to back; writes go to a single chosen node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeEndpoints {
    endpoints: Vec<Endpoint>,
}

impl NodeEndpoints {
    /// Create from an explicit order.
    #[must_use]
    pub const fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }

    /// Build from `(name, address)` pairs, keeping their order.
    ///
    /// `default_port` is appended to bare host addresses that carry no port.
    pub fn from_nodes<I, N, A>(nodes: I, default_port: Option<u16>) -> Self
    where
        I: IntoIterator<Item = (N, A)>,
        N: Into<String>,
        A: AsRef<str>,
    {
        let endpoints = nodes
            .into_iter()
            .map(|(name, address)| Endpoint::new(name, with_port(address.as_ref(), default_port)))
            .collect();
        Self { endpoints }
    }

    /// Nodes in read order.
    pub fn read_order(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    /// The first node.
    #[must_use]
    pub fn primary(&self) -> Option<&Endpoint> {
        self.endpoints.first()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether there are no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn with_port(address: &str, default_port: Option<u16>) -> String {
    match default_port {
        Some(port) if !address.contains(':') && !address.contains('/') => {
            format!("{address}:{port}")
        }
        _ => address.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_bare_address() {
        let ep = Endpoint::new("n1", "10.0.0.1:8080");
        assert_eq!(ep.url("nodes"), "http://10.0.0.1:8080/api/nodes");
        assert_eq!(ep.url("/operator/list"), "http://10.0.0.1:8080/api/operator/list");
    }

    #[test]
    fn url_for_full_base_url() {
        let ep = Endpoint::new("n1", "https://cluster.example.com/");
        assert_eq!(ep.url("health"), "https://cluster.example.com/api/health");
    }

    #[test]
    fn from_nodes_keeps_order_and_applies_port() {
        let endpoints = NodeEndpoints::from_nodes(
            [("a", "10.0.0.1"), ("b", "10.0.0.2:9000"), ("c", "http://10.0.0.3")],
            Some(8080),
        );
        let addrs: Vec<_> = endpoints.read_order().map(Endpoint::address).collect();
        assert_eq!(addrs, vec!["10.0.0.1:8080", "10.0.0.2:9000", "http://10.0.0.3"]);
        assert_eq!(endpoints.primary().map(Endpoint::name), Some("a"));
    }

    #[test]
    fn empty_endpoints() {
        let endpoints = NodeEndpoints::default();
        assert!(endpoints.is_empty());
        assert!(endpoints.primary().is_none());
    }
}
