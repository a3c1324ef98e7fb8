//! HTTP transport to cluster nodes.
//!
//! [`Transport`] is the seam the rest of the crate talks through. The real
//! implementation, [`HttpTransport`], sits on `reqwest`; tests substitute a
//! scripted fake.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};

use crate::api::ApiResponse;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, TransportError};

/// Request/response exchange with a single node.
pub trait Transport: Send + Sync {
    /// `GET` an API path on `endpoint`.
    fn get(
        &self,
        endpoint: &Endpoint,
        path: &str,
    ) -> impl Future<Output = Result<ApiResponse, ClientError>> + Send;

    /// `POST` a JSON body to an API path on `endpoint`.
    fn post(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: &Value,
    ) -> impl Future<Output = Result<ApiResponse, ClientError>> + Send;
}

/// `reqwest` backed transport with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport whose requests fail after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("clusterctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// The configured request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse, ClientError> {
        let response = request.send().await.map_err(|e| self.classify(url, &e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(url, &e))?;
        trace!(url, status = status.as_u16(), bytes = body.len(), "received response");

        match serde_json::from_slice::<ApiResponse>(&body) {
            Ok(api) => {
                if !status.is_success() {
                    debug!(url, status = status.as_u16(), "error status with API response body");
                }
                Ok(api)
            }
            Err(_) if !status.is_success() => Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into()),
            Err(e) => Err(ClientError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn classify(&self, url: &str, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            TransportError::Unreachable {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, endpoint: &Endpoint, path: &str) -> Result<ApiResponse, ClientError> {
        let url = endpoint.url(path);
        debug!(node = %endpoint.name(), url = %url, "GET");
        self.send(&url, self.client.get(&url)).await
    }

    async fn post(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: &Value,
    ) -> Result<ApiResponse, ClientError> {
        let url = endpoint.url(path);
        debug!(node = %endpoint.name(), url = %url, "POST");
        self.send(&url, self.client.post(&url).json(body)).await
    }
}

/// A recorded request made through [`FakeTransport`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
}

/// Scripted transport for testing.
///
/// Replies are keyed by `"{METHOD} {url}"`; unscripted requests fail with
/// HTTP 404 and requests to unreachable addresses fail as unreachable.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    replies: std::collections::HashMap<String, Result<ApiResponse, ClientError>>,
    unreachable: std::collections::HashSet<String>,
    calls: std::sync::Mutex<Vec<Call>>,
}

#[cfg(test)]
impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_get(mut self, endpoint: &Endpoint, path: &str, reply: ApiResponse) -> Self {
        self.replies
            .insert(format!("GET {}", endpoint.url(path)), Ok(reply));
        self
    }

    #[must_use]
    pub fn on_post(mut self, endpoint: &Endpoint, path: &str, reply: ApiResponse) -> Self {
        self.replies
            .insert(format!("POST {}", endpoint.url(path)), Ok(reply));
        self
    }

    #[must_use]
    pub fn fail_get(mut self, endpoint: &Endpoint, path: &str, err: ClientError) -> Self {
        self.replies
            .insert(format!("GET {}", endpoint.url(path)), Err(err));
        self
    }

    #[must_use]
    pub fn unreachable(mut self, endpoint: &Endpoint) -> Self {
        self.unreachable.insert(endpoint.address().to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn posts(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.method == "POST").collect()
    }

    fn reply(
        &self,
        method: &'static str,
        endpoint: &Endpoint,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ClientError> {
        let url = endpoint.url(path);
        self.calls.lock().expect("lock").push(Call {
            method,
            url: url.clone(),
            body: body.cloned(),
        });

        if self.unreachable.contains(endpoint.address()) {
            return Err(TransportError::Unreachable {
                url,
                message: "connection refused".into(),
            }
            .into());
        }

        self.replies
            .get(&format!("{method} {url}"))
            .cloned()
            .unwrap_or_else(|| Err(TransportError::Status { url, status: 404 }.into()))
    }
}

#[cfg(test)]
impl Transport for FakeTransport {
    async fn get(&self, endpoint: &Endpoint, path: &str) -> Result<ApiResponse, ClientError> {
        self.reply("GET", endpoint, path, None)
    }

    async fn post(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: &Value,
    ) -> Result<ApiResponse, ClientError> {
        self.reply("POST", endpoint, path, Some(body))
    }
}
