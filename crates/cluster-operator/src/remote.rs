//! Multi-node client for the cluster API.
//!
//! Reads may be answered by any node, so [`RemoteClient::get_json`] walks the
//! configured nodes in order until one answers. Writes are not safe to replay
//! on another node and go to exactly one endpoint chosen by the caller.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::ApiResponse;
use crate::endpoint::{Endpoint, NodeEndpoints};
use crate::error::{ClientError, TransportError};
use crate::transport::{HttpTransport, Transport};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay unit between read sweeps; sweep `n` waits `n` units.
const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Network settings for a [`RemoteClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteSettings {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Additional full sweeps over the node list for reads.
    pub retries: u32,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
        }
    }
}

/// Client for the cluster API over an ordered set of nodes.
#[derive(Debug)]
pub struct RemoteClient<T = HttpTransport> {
    transport: T,
    endpoints: NodeEndpoints,
    retries: u32,
}

impl RemoteClient<HttpTransport> {
    /// Create a client that talks HTTP to `endpoints`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn http(
        endpoints: NodeEndpoints,
        settings: RemoteSettings,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(settings.timeout)?;
        Ok(Self::new(transport, endpoints, settings))
    }
}

impl<T: Transport> RemoteClient<T> {
    /// Create a client over an arbitrary transport.
    #[must_use]
    pub const fn new(transport: T, endpoints: NodeEndpoints, settings: RemoteSettings) -> Self {
        Self {
            transport,
            endpoints,
            retries: settings.retries,
        }
    }

    /// The nodes this client talks to.
    #[must_use]
    pub const fn endpoints(&self) -> &NodeEndpoints {
        &self.endpoints
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET` an API path from the first node that answers.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Exhausted`] when no node answered, or a
    /// decode error as soon as a node answers with a malformed body.
    pub async fn get_json(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.get_json_routed(path).await.map(|(_, response)| response)
    }

    /// Like [`get_json`](Self::get_json), also returning the node that answered.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn get_json_routed(
        &self,
        path: &str,
    ) -> Result<(Endpoint, ApiResponse), ClientError> {
        if self.endpoints.is_empty() {
            return Err(TransportError::NoNodes.into());
        }

        let mut attempts = 0;
        let mut last = None;

        for sweep in 0..=self.retries {
            if sweep > 0 {
                let delay = RETRY_BACKOFF * sweep;
                debug!(sweep, ?delay, path, "retrying read across cluster nodes");
                tokio::time::sleep(delay).await;
            }

            for endpoint in self.endpoints.read_order() {
                attempts += 1;
                match self.transport.get(endpoint, path).await {
                    Ok(response) => {
                        debug!(node = %endpoint.name(), path, attempts, "read answered");
                        return Ok((endpoint.clone(), response));
                    }
                    Err(ClientError::Transport(err)) => {
                        warn!(
                            node = %endpoint.name(),
                            error = %err,
                            "node read failed, trying next"
                        );
                        last = Some(err);
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Err(TransportError::Exhausted {
            attempts,
            last: Box::new(last.unwrap_or(TransportError::NoNodes)),
        }
        .into())
    }

    /// `GET` an API path from one specific node, without fallback.
    ///
    /// # Errors
    ///
    /// Returns the node's transport or decode error.
    pub async fn get_json_from(
        &self,
        endpoint: &Endpoint,
        path: &str,
    ) -> Result<ApiResponse, ClientError> {
        self.transport.get(endpoint, path).await
    }

    /// `POST` a JSON body to exactly one node. Never retried.
    ///
    /// # Errors
    ///
    /// Returns the node's transport or decode error.
    pub async fn post_json(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: &Value,
    ) -> Result<ApiResponse, ClientError> {
        self.transport.post(endpoint, path, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FakeTransport;
    use serde_json::json;

    fn three_nodes() -> NodeEndpoints {
        NodeEndpoints::new(vec![
            Endpoint::new("n1", "10.0.0.1:8080"),
            Endpoint::new("n2", "10.0.0.2:8080"),
            Endpoint::new("n3", "10.0.0.3:8080"),
        ])
    }

    fn node(endpoints: &NodeEndpoints, name: &str) -> Endpoint {
        endpoints.read_order().find(|e| e.name() == name).cloned().expect("node exists")
    }

    #[tokio::test]
    async fn read_falls_back_to_first_answering_node() {
        let endpoints = three_nodes();
        let fake = FakeTransport::new()
            .unreachable(&node(&endpoints, "n1"))
            .unreachable(&node(&endpoints, "n2"))
            .on_get(&node(&endpoints, "n3"), "nodes", ApiResponse::ok(json!([])));
        let client = RemoteClient::new(fake, endpoints, RemoteSettings::default());

        let (answered, response) = client.get_json_routed("nodes").await.expect("third answers");
        assert_eq!(answered.name(), "n3");
        assert!(response.success);
        assert_eq!(client.transport().calls().len(), 3);
    }

    #[tokio::test]
    async fn read_stops_at_first_answer() {
        let endpoints = three_nodes();
        let fake = FakeTransport::new()
            .on_get(&node(&endpoints, "n1"), "leader", ApiResponse::failure("electing"));
        let client = RemoteClient::new(fake, endpoints, RemoteSettings::default());

        // A failure envelope is still an answer.
        let response = client.get_json("leader").await.expect("answered");
        assert!(!response.success);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn read_exhausts_all_nodes() {
        let endpoints = three_nodes();
        let fake = FakeTransport::new()
            .unreachable(&node(&endpoints, "n1"))
            .unreachable(&node(&endpoints, "n2"))
            .unreachable(&node(&endpoints, "n3"));
        let client = RemoteClient::new(fake, endpoints, RemoteSettings::default());

        let err = client.get_json("health").await.expect_err("all down");
        match err {
            ClientError::Transport(TransportError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(last.to_string().contains("10.0.0.3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_does_not_fall_back_on_decode_error() {
        let endpoints = three_nodes();
        let fake = FakeTransport::new()
            .fail_get(
                &node(&endpoints, "n1"),
                "nodes",
                ClientError::Decode {
                    url: "http://10.0.0.1:8080/api/nodes".into(),
                    message: "expected value".into(),
                },
            )
            .on_get(&node(&endpoints, "n2"), "nodes", ApiResponse::ok(json!([])));
        let client = RemoteClient::new(fake, endpoints, RemoteSettings::default());

        let err = client.get_json("nodes").await.expect_err("decode error");
        assert!(matches!(err, ClientError::Decode { .. }));
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn retries_add_full_sweeps() {
        let endpoints = NodeEndpoints::new(vec![
            Endpoint::new("n1", "10.0.0.1:8080"),
            Endpoint::new("n2", "10.0.0.2:8080"),
        ]);
        let fake = FakeTransport::new()
            .unreachable(&node(&endpoints, "n1"))
            .unreachable(&node(&endpoints, "n2"));
        let settings = RemoteSettings {
            timeout: DEFAULT_TIMEOUT,
            retries: 1,
        };
        let client = RemoteClient::new(fake, endpoints, settings);

        let err = client.get_json("health").await.expect_err("all down");
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Exhausted { attempts: 4, .. })
        ));
    }

    #[tokio::test]
    async fn read_without_nodes_fails_fast() {
        let client = RemoteClient::new(
            FakeTransport::new(),
            NodeEndpoints::default(),
            RemoteSettings::default(),
        );
        let err = client.get_json("health").await.expect_err("no nodes");
        assert_eq!(err, ClientError::Transport(TransportError::NoNodes));
    }

    #[tokio::test]
    async fn post_targets_exactly_one_node() {
        let endpoints = three_nodes();
        let target = node(&endpoints, "n2");
        let fake = FakeTransport::new().unreachable(&target);
        let client = RemoteClient::new(fake, endpoints, RemoteSettings::default());

        let err = client
            .post_json(&target, "config/set", &json!({"k": "v"}))
            .await
            .expect_err("target down");
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Unreachable { .. })
        ));

        let posts = client.transport().posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].url, "http://10.0.0.2:8080/api/config/set");
    }
}
