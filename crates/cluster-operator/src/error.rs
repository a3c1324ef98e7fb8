//! Error types for the cluster-operator crate.

use std::time::Duration;

use thiserror::Error;

use crate::dispatcher::ArgumentNamespace;
use crate::schema::RequiredParameter;
use crate::value::ParamType;

/// A textual argument could not be converted to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The text is not a valid literal of the expected type.
    #[error("invalid {expected} value '{value}': {reason}")]
    InvalidValue {
        /// The rejected input.
        value: String,
        /// The type the input was converted to.
        expected: ParamType,
        /// Parser diagnostic.
        reason: String,
    },

    /// The schema declares a type the converter does not know.
    ///
    /// This points at a broken schema rather than bad user input.
    #[error("unsupported parameter type: {0}")]
    UnsupportedType(String),
}

/// Supplied arguments do not satisfy a parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required parameter without default was not supplied.
    #[error("required parameter '{name}' is missing")]
    MissingRequired {
        /// Parameter name.
        name: String,
    },

    /// A supplied parameter is not declared by the schema.
    #[error("unknown parameter '{name}'")]
    UnknownParameter {
        /// Parameter name.
        name: String,
    },

    /// A supplied value failed conversion to the declared type.
    #[error("parameter '{name}': {source}")]
    ParameterType {
        /// Parameter name.
        name: String,
        /// Underlying conversion failure.
        source: ConversionError,
    },
}

/// Network level failures talking to cluster nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The cluster has no node addresses to talk to.
    #[error("no node addresses configured for the cluster")]
    NoNodes,

    /// The HTTP client could not be constructed.
    #[error("failed to set up HTTP client: {0}")]
    Setup(String),

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The node could not be reached.
    #[error("failed to reach {url}: {message}")]
    Unreachable {
        /// Requested URL.
        url: String,
        /// Client diagnostic.
        message: String,
    },

    /// The node answered with an error status and no API response body.
    #[error("{url} answered with HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Every node was tried and none answered.
    #[error("all {attempts} node request(s) failed, last error: {last}")]
    Exhausted {
        /// Number of requests made.
        attempts: usize,
        /// The final failure.
        last: Box<TransportError>,
    },
}

/// Errors returned by the remote client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The node answered with something that is not an API response.
    #[error("malformed response from {url}: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder diagnostic.
        message: String,
    },
}

/// Errors interpreting the `data` of an API response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// The server reported `success=false`.
    #[error("server reported failure: {0}")]
    Failed(String),

    /// `data` does not have the shape the endpoint promises.
    #[error("unexpected response data: {0}")]
    Decode(String),
}

/// Errors from schema discovery and operation dispatch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperatorError {
    /// Network failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server sent data that does not match the protocol.
    #[error("malformed {what}: {message}")]
    Decode {
        /// What was being decoded.
        what: String,
        /// Decoder diagnostic.
        message: String,
    },

    /// The request payload could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// The operator name cannot be used as a URL path segment.
    #[error("invalid operator name '{0}': may only contain letters, digits, '-', '_' and '.'")]
    InvalidName(String),

    /// The server does not know the operator.
    #[error("operator '{operator}' not found: {message}")]
    UnknownOperator {
        /// Requested operator.
        operator: String,
        /// Server message.
        message: String,
        /// Operators the server does know, when they could be listed.
        available: Vec<String>,
    },

    /// The operator has no such operation.
    #[error("operation '{operation}' not found for operator '{operator}'")]
    UnknownOperation {
        /// Operator name.
        operator: String,
        /// Requested operation.
        operation: String,
        /// Every operation the operator declares.
        available: Vec<String>,
    },

    /// Arguments of one namespace failed validation.
    #[error("{namespace} validation error: {source}")]
    InvalidArguments {
        /// The namespace that failed.
        namespace: ArgumentNamespace,
        /// The validation failure.
        source: ValidationError,
        /// Required parameters of that namespace.
        required: Vec<RequiredParameter>,
    },

    /// The operator executed the request and reported a failure.
    #[error("operator '{operator}' rejected the request: {message}")]
    Rejected {
        /// Operator name.
        operator: String,
        /// Server message.
        message: String,
    },

    /// A read endpoint reported `success=false`.
    #[error("server reported failure: {0}")]
    ServerFailure(String),
}

impl From<ClientError> for OperatorError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(e) => Self::Transport(e),
            ClientError::Decode { url, message } => Self::Decode {
                what: format!("response from {url}"),
                message,
            },
        }
    }
}

impl From<ResponseError> for OperatorError {
    fn from(err: ResponseError) -> Self {
        match err {
            ResponseError::Failed(message) => Self::ServerFailure(message),
            ResponseError::Decode(message) => Self::Decode {
                what: "response data".into(),
                message,
            },
        }
    }
}
